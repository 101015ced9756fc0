use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use super::llm::{CompletionClient, Result};
use super::payload::LlmPayload;
use super::prompts;
use super::validators::{validate_e2e_test, validate_manual_test, validate_pytest_api, Validation};

/// Generated code together with its structural checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub code: String,
    pub validation: Validation,
}

/// Outcome of one item in a bulk run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkItem {
    Generated {
        test_number: usize,
        code: String,
        validation: Validation,
    },
    Failed {
        test_number: usize,
        error: String,
    },
}

impl BulkItem {
    pub fn test_number(&self) -> usize {
        match self {
            BulkItem::Generated { test_number, .. } | BulkItem::Failed { test_number, .. } => {
                *test_number
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    pub generated_tests: usize,
    pub results: Vec<BulkItem>,
}

/// Which generator a bulk run repeats.
#[derive(Debug, Clone, Copy)]
pub enum BulkKind<'a> {
    Manual(&'a str),
    ApiTest(&'a LlmPayload),
}

/// Turns prompts into checked test code through a [`CompletionClient`].
#[derive(Clone)]
pub struct TestGenerator {
    client: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for TestGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestGenerator").finish_non_exhaustive()
    }
}

impl TestGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let code = self.client.complete(prompt).await?;
        Ok(code.trim().to_string())
    }

    #[tracing::instrument(skip_all)]
    pub async fn manual_test(&self, requirements: &str) -> Result<GeneratedTest> {
        let code = self.complete(&prompts::manual_test_prompt(requirements)).await?;
        let validation = Validation::Manual(validate_manual_test(&code));
        Ok(GeneratedTest { code, validation })
    }

    #[tracing::instrument(skip_all)]
    pub async fn ui_e2e_test(&self, requirements: &str) -> Result<GeneratedTest> {
        let code = self.complete(&prompts::ui_e2e_test_prompt(requirements)).await?;
        let validation = Validation::E2e(validate_e2e_test(&code));
        Ok(GeneratedTest { code, validation })
    }

    #[tracing::instrument(skip_all, fields(path = %payload.path, method = %payload.method))]
    pub async fn api_test(&self, payload: &LlmPayload) -> Result<GeneratedTest> {
        let code = self.complete(&prompts::api_test_prompt(payload)).await?;
        let validation = Validation::Api(validate_pytest_api(&code));
        Ok(GeneratedTest { code, validation })
    }

    #[tracing::instrument(skip_all, fields(path = %payload.path, method = %payload.method))]
    pub async fn api_manual_test(&self, payload: &LlmPayload) -> Result<GeneratedTest> {
        let code = self.complete(&prompts::api_manual_test_prompt(payload)).await?;
        let validation = Validation::Manual(validate_manual_test(&code));
        Ok(GeneratedTest { code, validation })
    }

    /// Generate `count` tests one after another. A failed item is recorded in
    /// its slot and the run continues with the next one.
    pub async fn bulk(&self, kind: BulkKind<'_>, count: usize) -> BulkResult {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("bulk", %batch_id, count);

        async move {
            let mut results = Vec::with_capacity(count);

            for test_number in 1..=count {
                let outcome = match kind {
                    BulkKind::Manual(requirements) => self.manual_test(requirements).await,
                    BulkKind::ApiTest(payload) => self.api_test(payload).await,
                };

                let item = match outcome {
                    Ok(GeneratedTest { code, validation }) => BulkItem::Generated {
                        test_number,
                        code,
                        validation,
                    },
                    Err(err) => {
                        tracing::warn!(test_number, error = %err, "bulk item failed");
                        BulkItem::Failed {
                            test_number,
                            error: err.to_string(),
                        }
                    }
                };
                results.push(item);
            }

            tracing::info!(generated = results.len(), "bulk run finished");
            BulkResult {
                generated_tests: results.len(),
                results,
            }
        }
        .instrument(span)
        .await
    }
}
