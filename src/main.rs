use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine: the process environment may already carry everything.
    let dotenv = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tutor=info,med_rag=info,api=info"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| {
                    !meta.target().starts_with(telemetry::TARGET_PREFIX)
                })),
        )
        .with(telemetry::layer())
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) => warn!(error = %e, "no .env loaded; using process environment"),
    }

    api::start().await?;

    Ok(())
}
