pub mod cli;
pub mod generator;
pub mod parser;
pub mod server;

// Re-export frequently used items for easier access
pub use generator::{build_payload, LlmPayload, PayloadMode, TestGenerator};
pub use parser::{list_endpoints, Endpoint, OpenApiDocument};
pub use server::{app_router, AppState};

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Build the router from command-line configuration and serve it until shutdown.
pub async fn run(args: cli::Args) -> Result<()> {
    if !(args.llm_base_url.starts_with("http://") || args.llm_base_url.starts_with("https://")) {
        return Err(AppError::ConfigError(format!(
            "LLM base URL must be an http(s) URL, got {:?}",
            args.llm_base_url
        )));
    }

    let client = generator::OpenAiClient::new(args.llm_config());
    tracing::info!(
        model = %client.config().model,
        base_url = %client.config().base_url,
        "completion client configured"
    );

    let state = AppState::new(TestGenerator::new(Arc::new(client)));
    let app = app_router(state).layer(server::cors_layer(&args.cors_origins));

    server::serve(args.socket_addr(), app).await?;
    Ok(())
}
