//! HTTP surface of the acquisition pipeline.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};

use crate::error::PlanError;
use crate::models::TripRequest;
use crate::pipeline::PlannerService;
use crate::transport::ModelTransport;

pub fn router<T: ModelTransport + 'static>(service: Arc<PlannerService<T>>) -> Router {
    Router::new()
        .route("/question", post(ask_question::<T>))
        .with_state(service)
}

/// `POST /question`: ask the model for a travel plan.
async fn ask_question<T: ModelTransport + 'static>(
    State(service): State<Arc<PlannerService<T>>>,
    Json(request): Json<TripRequest>,
) -> Response {
    match service.ask_question(&request).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Maps the pipeline taxonomy onto transport status codes. Upstream
/// dependency trouble is a client-facing 400, an unanticipated envelope or
/// unparseable output is a 500, and a plan that stays incomplete after
/// escalation is a 404 rather than a hard failure.
fn error_response(error: &PlanError) -> Response {
    let status = match error {
        PlanError::InvalidRequest { .. }
        | PlanError::Transport { .. }
        | PlanError::RetriesExhausted { .. } => StatusCode::BAD_REQUEST,
        PlanError::Incomplete { .. } => StatusCode::NOT_FOUND,
        PlanError::Extraction { .. }
        | PlanError::MalformedPlan { .. }
        | PlanError::EmptyModelOutput => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(error = %error, "request failed");
    } else {
        tracing::warn!(error = %error, "request rejected");
    }

    (status, error.user_message()).into_response()
}
