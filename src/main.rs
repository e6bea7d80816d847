use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use tripai::config::{LoggingConfig, TripAiConfig};
use tripai::pipeline::PlannerService;
use tripai::transport::HttpModelTransport;
use tripai::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripAiConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let transport = HttpModelTransport::new(&config.gemini)
        .context("Failed to construct model transport")?;
    let service = Arc::new(PlannerService::new(
        transport,
        config.gemini.max_attempts,
        config.gemini.backoff(),
        config.cache.ttl(),
    ));

    web::run(service, config.server.port).await
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.init();
    }
}
