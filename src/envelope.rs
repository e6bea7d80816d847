//! Extraction of the model's generated text from the response envelope.

use serde::Deserialize;

use crate::error::PlanError;

/// Raw response envelope returned by the model endpoint. Transient, exists
/// only during extraction.
#[derive(Debug, Deserialize)]
pub struct ModelEnvelope {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

/// Locates the generated text inside the envelope and strips code fences.
///
/// Only the first candidate and its first part are inspected. Whether later
/// candidates could serve as a quality fallback is an open question upstream;
/// until that is settled this stays a single-element read.
pub fn extract_plan_text(raw_body: &str) -> Result<String, PlanError> {
    let envelope: ModelEnvelope = serde_json::from_str(raw_body)
        .map_err(|e| PlanError::extraction(format!("envelope is not valid JSON: {e}")))?;

    let candidate = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PlanError::extraction("envelope contains no candidates"))?;

    let content = candidate
        .content
        .ok_or_else(|| PlanError::extraction("first candidate has no content"))?;

    let part = content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| PlanError::extraction("candidate content has no parts"))?;

    let text = part
        .text
        .ok_or_else(|| PlanError::extraction("first content part has no text"))?;

    Ok(strip_code_fences(&text))
}

/// Models frequently wrap the requested raw JSON in Markdown fences anyway.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
