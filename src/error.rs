//! Error types for the plan acquisition pipeline.

use thiserror::Error;

use crate::models::TripPlan;

/// Boundary error taxonomy. Every lower-level failure is translated into
/// exactly one of these before it leaves the pipeline.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Caller-supplied data failed structural checks
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Model endpoint returned a non-retryable HTTP status
    #[error("HTTP request error: {message}")]
    Transport { message: String },

    /// Retry budget spent without a successful response
    #[error("Failed to get a successful response after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Response envelope did not have the expected shape
    #[error("Envelope error: {message}")]
    Extraction { message: String },

    /// Extracted model output could not be parsed as a plan
    #[error("JSON parsing error: {message}")]
    MalformedPlan { message: String },

    /// Model output deserialized to the null representation
    #[error("Model returned an empty response")]
    EmptyModelOutput,

    /// Plan stayed structurally incomplete after escalation. The partial
    /// plan is carried along rather than discarded.
    #[error("Model produced no complete plan after escalation")]
    Incomplete { plan: Box<TripPlan> },
}

impl PlanError {
    /// Create a new invalid-request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create a new malformed-plan error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedPlan {
            message: message.into(),
        }
    }

    /// Failures that buy one more full acquisition cycle. Fatal transport
    /// statuses and bad requests do not.
    #[must_use]
    pub fn warrants_escalation(&self) -> bool {
        matches!(
            self,
            PlanError::RetriesExhausted { .. }
                | PlanError::Extraction { .. }
                | PlanError::MalformedPlan { .. }
                | PlanError::EmptyModelOutput
        )
    }

    /// Get a user-friendly error message for the HTTP response body
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlanError::InvalidRequest { message } => {
                format!("Invalid request. {message}")
            }
            PlanError::Transport { message } => {
                format!("HTTP request error: {message}")
            }
            PlanError::RetriesExhausted { .. } => {
                "Failed to get a successful response after multiple retries.".to_string()
            }
            PlanError::Extraction { .. } | PlanError::EmptyModelOutput => {
                "No valid response from the AI model.".to_string()
            }
            PlanError::MalformedPlan { message } => {
                format!("JSON parsing error: {message}")
            }
            PlanError::Incomplete { .. } => {
                "The AI model did not produce a complete travel plan.".to_string()
            }
        }
    }
}
