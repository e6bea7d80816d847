use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::pipeline::PlannerService;
use crate::transport::ModelTransport;

pub async fn run<T: ModelTransport + 'static>(
    service: Arc<PlannerService<T>>,
    port: u16,
) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new().nest("/api", api::router(service)).layer(cors);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://localhost:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}
