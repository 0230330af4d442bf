use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use advisor_core::AdvisorConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config_path = std::env::var("ADVISOR_CONFIG").ok().map(PathBuf::from);
    let config = AdvisorConfig::load(config_path.as_deref())?;
    advisor_bot::serve(config).await
}
