//! End-to-end scenarios over the HTTP surface with scripted model replies.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration as ChronoDuration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tripai::pipeline::PlannerService;
use tripai::transport::{ModelReply, ModelTransport, TransportError};
use tripai::{TripPlan, api};

/// Replays scripted replies in order, repeating the last one.
struct ScriptedModel {
    replies: Vec<ModelReply>,
    calls: Arc<AtomicU32>,
}

impl ScriptedModel {
    fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl ModelTransport for ScriptedModel {
    async fn send(&self, _prompt: &str) -> Result<ModelReply, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        Ok(self.replies[call.min(self.replies.len() - 1)].clone())
    }

    fn endpoint(&self) -> &str {
        "scripted://model"
    }
}

fn app(replies: Vec<ModelReply>) -> (Router, Arc<AtomicU32>) {
    let transport = ScriptedModel::new(replies);
    let calls = transport.calls.clone();
    let service = Arc::new(PlannerService::new(
        transport,
        3,
        Duration::from_millis(1),
        Duration::from_secs(10),
    ));
    (api::router(service), calls)
}

fn reply(status: u16, body: &str) -> ModelReply {
    ModelReply {
        status,
        body: body.to_string(),
    }
}

fn envelope_with(text: &str) -> String {
    serde_json::json!({
        "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
    })
    .to_string()
}

fn single_day_plan_text() -> String {
    serde_json::json!({
        "Title": "A to B",
        "Description": "A one day trip",
        "Region": "Somewhere",
        "Currency": "EUR",
        "Plan": [
            {
                "day": 1,
                "destination": "B",
                "distance": "42 km",
                "duration": "1 hour",
                "Activities": ["Drive", "Lunch"]
            }
        ]
    })
    .to_string()
}

fn question_body(start: &str, finish: &str, departure_offset_days: i64) -> String {
    serde_json::json!({
        "startLocation": start,
        "finishLocation": finish,
        "departureDate": (Utc::now() + ChronoDuration::days(departure_offset_days)).to_rfc3339(),
        "duration": 1
    })
    .to_string()
}

async fn post_question(app: Router, body: String) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/question")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_well_formed_single_day_plan_returns_200() {
    let fenced = format!("```json\n{}\n```", single_day_plan_text());
    let (app, calls) = app(vec![reply(200, &envelope_with(&fenced))]);

    let (status, body) = post_question(app, question_body("A", "B", 1)).await;

    assert_eq!(status, StatusCode::OK);
    let plan: TripPlan = serde_json::from_str(&body).unwrap();
    assert!(plan.is_complete());
    assert_eq!(plan.days.len(), 1);
    assert_eq!(plan.days[0].day_number, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_response_on_both_cycles_returns_500() {
    let (app, calls) = app(vec![reply(200, &envelope_with("this is not json"))]);

    let (status, body) = post_question(app, question_body("A", "B", 1)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("JSON parsing error"));
    // Primary cycle plus exactly one escalation.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_persistently_incomplete_plan_returns_404() {
    let incomplete = serde_json::json!({
        "Title": "A to B",
        "Description": "",
        "Region": "Somewhere",
        "Currency": "EUR",
        "Plan": []
    })
    .to_string();
    let (app, calls) = app(vec![reply(200, &envelope_with(&incomplete))]);

    let (status, body) = post_question(app, question_body("A", "B", 1)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("complete travel plan"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_past_departure_date_returns_400() {
    let (app, calls) = app(vec![reply(200, &envelope_with(&single_day_plan_text()))]);

    let (status, body) = post_question(app, question_body("A", "B", -1)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("DepartureDate must be in the future."));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_locations_return_400() {
    let (app, _) = app(vec![reply(200, &envelope_with(&single_day_plan_text()))]);

    let (status, body) = post_question(app, question_body("", "B", 1)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("StartLocation and FinishLocation cannot be null or empty."));
}

#[tokio::test]
async fn test_non_retryable_upstream_status_returns_400() {
    let (app, calls) = app(vec![reply(403, "forbidden")]);

    let (status, body) = post_question(app, question_body("A", "B", 1)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("HTTP request error"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unexpected_envelope_shape_returns_500() {
    let (app, _) = app(vec![reply(200, "{\"candidates\": []}")]);

    let (status, body) = post_question(app, question_body("A", "B", 1)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("No valid response from the AI model."));
}

#[tokio::test]
async fn test_escalation_recovers_mid_request() {
    let incomplete = serde_json::json!({
        "Title": "A to B",
        "Description": "A one day trip",
        "Region": "Somewhere",
        "Currency": "EUR",
        "Plan": [ { "day": 1, "destination": "B", "Activities": ["Drive"] } ]
    })
    .to_string();
    let (app, calls) = app(vec![
        reply(200, &envelope_with(&incomplete)),
        reply(200, &envelope_with(&single_day_plan_text())),
    ]);

    let (status, body) = post_question(app, question_body("A", "B", 1)).await;

    assert_eq!(status, StatusCode::OK);
    let plan: TripPlan = serde_json::from_str(&body).unwrap();
    assert!(plan.is_complete());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
