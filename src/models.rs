//! Request and plan data model for the acquisition pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// A travel-planning question submitted by the caller.
///
/// Immutable once constructed; lives for one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub start_location: String,
    pub finish_location: String,
    /// Intermediate stops, in visiting order. Not part of the cache key.
    #[serde(default)]
    pub continuation_points: Option<Vec<String>>,
    pub departure_date: DateTime<Utc>,
    pub duration: u32,
}

impl TripRequest {
    /// Structural checks on caller-supplied data. Failures map to a client
    /// error at the HTTP boundary.
    pub fn validate(&self) -> Result<(), PlanError> {
        self.validate_at(Utc::now())
    }

    pub(crate) fn validate_at(&self, now: DateTime<Utc>) -> Result<(), PlanError> {
        if self.start_location.is_empty() || self.finish_location.is_empty() {
            return Err(PlanError::invalid_request(
                "StartLocation and FinishLocation cannot be null or empty.",
            ));
        }
        if self.departure_date <= now {
            return Err(PlanError::invalid_request(
                "DepartureDate must be in the future.",
            ));
        }
        if self.duration == 0 {
            return Err(PlanError::invalid_request(
                "The integer value must be greater than zero.",
            ));
        }
        Ok(())
    }

    /// Deterministic cache key. Continuation points are deliberately left
    /// out, so requests differing only in stops share an entry.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "Response_{}_{}_{}_{}",
            self.start_location,
            self.finish_location,
            self.departure_date.format("%Y%m%d%H%M%S"),
            self.duration
        )
    }
}

/// A structured travel plan as produced by the model.
///
/// Deserialization accepts the field spellings the model is instructed to
/// emit (`Title`, …, `Plan`); serialization uses the client-facing names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    #[serde(rename = "title", alias = "Title", default)]
    pub title: String,
    #[serde(rename = "description", alias = "Description", default)]
    pub description: String,
    #[serde(rename = "region", alias = "Region", default)]
    pub region: String,
    #[serde(rename = "currency", alias = "Currency", default)]
    pub currency: String,
    #[serde(rename = "days", alias = "Plan", alias = "plan", default)]
    pub days: Vec<DayPlan>,
}

impl TripPlan {
    /// Recursive structural completeness: every scalar non-empty, at least
    /// one day, and every day complete in turn.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty()
            && !self.description.is_empty()
            && !self.region.is_empty()
            && !self.currency.is_empty()
            && !self.days.is_empty()
            && self.days.iter().all(DayPlan::is_complete)
    }
}

/// One day of a [`TripPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(rename = "dayNumber", alias = "day", alias = "Day", default)]
    pub day_number: u32,
    #[serde(rename = "destination", alias = "Destination", default)]
    pub destination: String,
    #[serde(rename = "distance", alias = "Distance", default)]
    pub distance: String,
    #[serde(rename = "durationLabel", alias = "duration", alias = "Duration", default)]
    pub duration_label: String,
    #[serde(rename = "activities", alias = "Activities", default)]
    pub activities: Vec<String>,
}

impl DayPlan {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.day_number > 0
            && !self.destination.is_empty()
            && !self.distance.is_empty()
            && !self.duration_label.is_empty()
            && !self.activities.is_empty()
            && self.activities.iter().all(|a| !a.is_empty())
    }
}
