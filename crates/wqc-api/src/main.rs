//! Binary entrypoint for the WQC API server.
use tracing_subscriber::EnvFilter;
use wqc_api::run;
use wqc_client::ConsoleConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // WQC_CONFIG, WQC_BACKEND_URL and WQC_ADDR override the defaults
    let config = match ConsoleConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
