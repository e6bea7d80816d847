//! The plan acquisition pipeline: cache lookup, prompt construction,
//! retrying transport, envelope extraction, validation, and a single
//! escalation cycle.

use std::time::Duration;

use crate::cache::PlanCache;
use crate::envelope;
use crate::error::PlanError;
use crate::models::{TripPlan, TripRequest};
use crate::prompt;
use crate::transport::{self, ModelTransport};

/// Validation outcome. An incomplete plan is handed back to the caller, not
/// discarded, so escalation policy stays a caller decision.
#[derive(Debug)]
pub enum Validated {
    Complete(TripPlan),
    Incomplete(TripPlan),
}

/// Deserializes extracted model text into a plan and tags its completeness.
///
/// The plan-length-equals-duration instruction given to the model is not
/// enforced here; a complete plan with the wrong number of days passes.
pub fn validate_plan(plan_text: &str) -> Result<Validated, PlanError> {
    let value: serde_json::Value = serde_json::from_str(plan_text)
        .map_err(|e| PlanError::malformed(e.to_string()))?;

    if value.is_null() {
        return Err(PlanError::EmptyModelOutput);
    }

    let plan: TripPlan =
        serde_json::from_value(value).map_err(|e| PlanError::malformed(e.to_string()))?;

    if plan.is_complete() {
        Ok(Validated::Complete(plan))
    } else {
        Ok(Validated::Incomplete(plan))
    }
}

/// Orchestrates plan acquisition against one model transport.
pub struct PlannerService<T> {
    transport: T,
    cache: PlanCache,
    max_attempts: u32,
    backoff: Duration,
    cache_ttl: Duration,
}

impl<T: ModelTransport> PlannerService<T> {
    pub fn new(transport: T, max_attempts: u32, backoff: Duration, cache_ttl: Duration) -> Self {
        Self {
            transport,
            cache: PlanCache::new(),
            max_attempts,
            backoff,
            cache_ttl,
        }
    }

    /// Answers a travel-planning question.
    ///
    /// A cache hit short-circuits the whole pipeline. Otherwise one full
    /// acquisition cycle runs; if it ends incomplete or with a recoverable
    /// failure, exactly one escalation cycle with a fresh retry budget
    /// follows. Only complete plans are cached.
    #[tracing::instrument(
        skip(self, request),
        fields(start = %request.start_location, finish = %request.finish_location)
    )]
    pub async fn ask_question(&self, request: &TripRequest) -> Result<TripPlan, PlanError> {
        request.validate()?;

        let key = request.fingerprint();
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("serving plan from cache");
            return Ok(cached);
        }

        let prompt = prompt::build_prompt(request);
        tracing::debug!(prompt = %prompt, "request content being sent to the model");

        let plan = match self.run_cycle(&prompt).await {
            Ok(Validated::Complete(plan)) => plan,
            Ok(Validated::Incomplete(_)) => {
                tracing::warn!("model returned a structurally incomplete plan, escalating once");
                self.escalate(&prompt).await?
            }
            Err(e) if e.warrants_escalation() => {
                tracing::warn!(error = %e, "primary acquisition cycle failed, escalating once");
                self.escalate(&prompt).await?
            }
            Err(e) => return Err(e),
        };

        self.cache.put(&key, plan.clone(), self.cache_ttl).await;
        Ok(plan)
    }

    /// One full prompt → transport → extraction → validation cycle.
    async fn run_cycle(&self, prompt: &str) -> Result<Validated, PlanError> {
        let raw_body =
            transport::send_with_retry(&self.transport, prompt, self.max_attempts, self.backoff)
                .await?;
        let plan_text = envelope::extract_plan_text(&raw_body)?;
        validate_plan(&plan_text)
    }

    /// The single escalation cycle. A second incomplete result terminates
    /// the pipeline; there is no tertiary attempt.
    async fn escalate(&self, prompt: &str) -> Result<TripPlan, PlanError> {
        match self.run_cycle(prompt).await? {
            Validated::Complete(plan) => Ok(plan),
            Validated::Incomplete(plan) => Err(PlanError::Incomplete {
                plan: Box::new(plan),
            }),
        }
    }
}
