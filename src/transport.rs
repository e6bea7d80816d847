//! Transport to the model endpoint with bounded retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::error::PlanError;

/// Connection-level failure (connect, timeout, body read). Distinct from a
/// non-success HTTP status, which arrives as a [`ModelReply`].
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

/// Status and raw body of one exchange with the model endpoint.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub status: u16,
    pub body: String,
}

impl ModelReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the retry loop and the wire, so tests can script replies.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<ModelReply, TransportError>;

    /// Endpoint identity for diagnostics.
    fn endpoint(&self) -> &str;
}

/// Production transport: one HTTP POST per call, API key from configuration
/// attached as a query parameter.
pub struct HttpModelTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpModelTransport {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Gemini API key is not configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent("TripAI/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelTransport for HttpModelTransport {
    async fn send(&self, prompt: &str) -> Result<ModelReply, TransportError> {
        let payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [ { "text": prompt } ]
                }
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError {
            message: format!("failed to read response body: {e}"),
        })?;

        Ok(ModelReply { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Single bounded-retry primitive, used by the primary and the escalation
/// cycle with independent budgets.
///
/// 2xx returns the body immediately. HTTP 500 and connection-level errors
/// retry after a fixed backoff while attempts remain. Any other status fails
/// without retry. A spent budget is reported as the distinct
/// `RetriesExhausted` outcome.
pub async fn send_with_retry(
    transport: &dyn ModelTransport,
    prompt: &str,
    max_attempts: u32,
    backoff: Duration,
) -> Result<String, PlanError> {
    for attempt in 1..=max_attempts {
        match transport.send(prompt).await {
            Ok(reply) if reply.is_success() => {
                tracing::info!(
                    endpoint = transport.endpoint(),
                    attempt,
                    "model endpoint replied"
                );
                tracing::debug!(body = %reply.body, "raw model response");
                return Ok(reply.body);
            }
            Ok(reply) if reply.status == 500 => {
                tracing::warn!(
                    endpoint = transport.endpoint(),
                    attempt,
                    "received HTTP 500 from model endpoint"
                );
                if attempt == max_attempts {
                    break;
                }
                tokio::time::sleep(backoff).await;
            }
            Ok(reply) => {
                tracing::error!(
                    endpoint = transport.endpoint(),
                    attempt,
                    status = reply.status,
                    "model endpoint request failed"
                );
                return Err(PlanError::transport(reply.status.to_string()));
            }
            Err(e) => {
                tracing::error!(
                    endpoint = transport.endpoint(),
                    attempt,
                    error = %e,
                    "transport error while contacting model endpoint"
                );
                if attempt == max_attempts {
                    break;
                }
                tokio::time::sleep(backoff).await;
            }
        }
    }

    Err(PlanError::RetriesExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Scripted transport: replays a fixed outcome and counts attempts.
    struct ScriptedTransport {
        outcomes: Vec<Result<ModelReply, String>>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<ModelReply, String>>) -> Self {
            Self {
                outcomes,
                calls: AtomicU32::new(0),
            }
        }

        fn always(status: u16, body: &str) -> Self {
            Self::new(vec![Ok(ModelReply {
                status,
                body: body.to_string(),
            })])
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelTransport for ScriptedTransport {
        async fn send(&self, _prompt: &str) -> Result<ModelReply, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let outcome = self
                .outcomes
                .get(call.min(self.outcomes.len() - 1))
                .unwrap();
            match outcome {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => Err(TransportError {
                    message: message.clone(),
                }),
            }
        }

        fn endpoint(&self) -> &str {
            "scripted://model"
        }
    }

    #[tokio::test]
    async fn test_success_returns_body_after_one_attempt() {
        let transport = ScriptedTransport::always(200, "{\"candidates\":[]}");
        let body = send_with_retry(&transport, "prompt", 3, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(body, "{\"candidates\":[]}");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_500_spends_exact_budget() {
        let transport = ScriptedTransport::always(500, "server error");
        let started = Instant::now();
        let err = send_with_retry(&transport, "prompt", 3, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::RetriesExhausted { attempts: 3 }));
        assert_eq!(transport.calls(), 3);
        // Two backoffs between three attempts, none after the last.
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_non_500_status_fails_without_retry() {
        let transport = ScriptedTransport::always(403, "forbidden");
        let err = send_with_retry(&transport, "prompt", 3, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::Transport { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_errors_retry_then_exhaust() {
        let transport = ScriptedTransport::new(vec![Err("connection refused".to_string())]);
        let err = send_with_retry(&transport, "prompt", 2, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PlanError::RetriesExhausted { attempts: 2 }));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_500() {
        let transport = ScriptedTransport::new(vec![
            Ok(ModelReply {
                status: 500,
                body: "server error".to_string(),
            }),
            Ok(ModelReply {
                status: 200,
                body: "ok".to_string(),
            }),
        ]);

        let body = send_with_retry(&transport, "prompt", 3, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(body, "ok");
        assert_eq!(transport.calls(), 2);
    }
}
