use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use study_analytics::config::LogFormat;
use study_analytics::{Dependencies, ServiceError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Plain => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn run() -> Result<(), ServiceError> {
    let deps = Dependencies::from_env()?;

    if deps.analytics.ensure_index().await? {
        info!("Answer index created");
    }

    let average = deps.analytics.average_score().await?;
    match average.value() {
        Some(score) => info!(average_score = score, "Current average score"),
        None => info!("No scored answers recorded yet"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    info!("Starting study analytics");

    if let Err(e) = run().await {
        error!(error = %e, "Study analytics failed");
        std::process::exit(1);
    }
}
