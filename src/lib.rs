//! `TripAI` - AI-assisted travel planning
//!
//! This library acquires structured travel plans from a generative-language
//! model: prompt construction, bounded-retry transport, envelope extraction,
//! structural validation with a single escalation cycle, and a short-lived
//! response cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod transport;
pub mod web;

// Re-export core types for public API
pub use cache::PlanCache;
pub use config::TripAiConfig;
pub use error::PlanError;
pub use models::{DayPlan, TripPlan, TripRequest};
pub use pipeline::{PlannerService, Validated};
pub use transport::{HttpModelTransport, ModelReply, ModelTransport, TransportError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlanError>;
