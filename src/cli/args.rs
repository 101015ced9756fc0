use clap::Parser;
use std::net::{IpAddr, SocketAddr};

use crate::generator::LlmConfig;

#[derive(Debug, Parser)]
#[clap(
    name = "llm-test-generator",
    about = "Serve LLM-backed generation of manual, UI e2e and API tests",
    version
)]
pub struct Args {
    /// Address to listen on
    #[clap(long, env = "HOST", value_name = "ADDR", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[clap(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// API key for the completion service
    #[clap(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: String,

    /// Base URL of the OpenAI-compatible completion service
    #[clap(long, env = "LLM_BASE_URL", value_name = "URL")]
    pub llm_base_url: String,

    /// Model name sent with every completion request
    #[clap(long, env = "LLM_MODEL")]
    pub llm_model: String,

    /// Allowed CORS origin (repeatable); any origin when omitted
    #[clap(long = "cors-origin", env = "CORS_ORIGINS", value_name = "ORIGIN", use_value_delimiter = true)]
    pub cors_origins: Vec<String>,
}

impl Args {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.llm_api_key.clone(),
            base_url: self.llm_base_url.clone(),
            model: self.llm_model.clone(),
        }
    }
}
