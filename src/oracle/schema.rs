//! Validation boundary for oracle output.
//!
//! A response is accepted only when it is a JSON object whose fields have the
//! expected types and whose ideas cover the requested batch exactly once per
//! date. Anything else is an [`OracleError`] and triggers a retry.

use crate::error::OracleError;
use crate::types::{Batch, BatchOutput, ContentIdea, ContentPillar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarPayload {
    content_pillars: Vec<ContentPillar>,
    content_ideas: Vec<IdeaPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdeaPayload {
    date: String,
    platform: String,
    pillar: String,
    content_type: String,
    summary: String,
    question: String,
    content_idea: String,
}

/// Some models wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_idea_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.split_once('T').map(|(d, _)| d).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse and validate the completion text returned for `batch`.
pub fn parse_batch_output(raw: &str, batch: &Batch) -> Result<BatchOutput, OracleError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| OracleError::MalformedBody(e.to_string()))?;

    if !value.is_object() {
        return Err(OracleError::SchemaViolation(
            "top-level value must be an object".to_string(),
        ));
    }

    let payload: CalendarPayload = serde_json::from_value(value)
        .map_err(|e| OracleError::SchemaViolation(e.to_string()))?;

    if payload.content_ideas.len() != batch.len() {
        return Err(OracleError::CountMismatch {
            expected: batch.len(),
            actual: payload.content_ideas.len(),
        });
    }

    let requested: HashSet<NaiveDate> = batch.dates.iter().map(|d| d.date()).collect();
    let mut seen = HashSet::with_capacity(requested.len());
    let mut ideas = Vec::with_capacity(payload.content_ideas.len());

    for idea in payload.content_ideas {
        let date = parse_idea_date(&idea.date)
            .filter(|d| requested.contains(d))
            .ok_or_else(|| OracleError::UnexpectedDate(idea.date.clone()))?;
        if !seen.insert(date) {
            return Err(OracleError::DuplicateDate(date));
        }
        ideas.push(ContentIdea {
            date,
            platform: idea.platform,
            pillar: idea.pillar,
            content_type: idea.content_type,
            summary: idea.summary,
            question: idea.question,
            content_idea: idea.content_idea,
        });
    }

    Ok(BatchOutput {
        pillars: payload.content_pillars,
        ideas,
    })
}
