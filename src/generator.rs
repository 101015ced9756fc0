pub mod llm;
pub mod payload;
pub mod prompts;
pub mod service;
pub mod validators;

pub use llm::{CompletionClient, LlmConfig, LlmError, OpenAiClient};
pub use payload::{build_payload, LlmPayload, NegativeCases, PayloadMode, ERROR_STATUS_CODES};
pub use service::{BulkItem, BulkKind, BulkResult, GeneratedTest, TestGenerator};
pub use validators::{
    validate_e2e_test, validate_manual_test, validate_pytest_api, ApiTestValidation,
    E2eTestValidation, ManualTestValidation, Validation,
};
