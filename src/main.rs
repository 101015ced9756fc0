// Entry point: parse configuration, set up logging and run the HTTP service.

use std::process;

use clap::Parser;
use llm_test_generator::cli::Args;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if let Err(err) = llm_test_generator::run(args).await {
        tracing::error!(error = %err, "server exited with an error");
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
