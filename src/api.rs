//! Caller-facing surface
//!
//! Turns a raw generation request into a validated [`CalendarRequest`], runs
//! the pipeline, and maps the outcome to a status/body pair: 200 with the
//! calendar, 400 for malformed requests, 500 with a generic message for
//! everything else.

use crate::config::CalendarConfig;
use crate::error::ApiError;
use crate::oracle::{ContentOracle, LlmOracle};
use crate::pipeline::{CalendarPipeline, CalendarRequest};
use crate::schedule::{parse_iso_date, DistributionPattern};
use crate::types::{BusinessContext, ContentCalendar, Platform};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Posts per week used when the request names neither days nor a frequency.
pub const DEFAULT_FREQUENCY: u8 = 3;

/// Message returned for every non-client failure, however far the run got.
pub const GENERIC_FAILURE: &str = "Failed to generate content";

/// Platforms as a checkbox map (`{"instagram": true}`) or a plain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformSelection {
    Flags(BTreeMap<String, bool>),
    List(Vec<String>),
}

impl PlatformSelection {
    /// Selected platforms, de-duplicated and sorted.
    pub fn resolve(&self) -> Result<Vec<Platform>, ApiError> {
        let names: Vec<&str> = match self {
            PlatformSelection::Flags(flags) => flags
                .iter()
                .filter(|(_, on)| **on)
                .map(|(name, _)| name.as_str())
                .collect(),
            PlatformSelection::List(list) => list.iter().map(String::as_str).collect(),
        };
        let mut platforms = Vec::with_capacity(names.len());
        for name in names {
            let platform: Platform = name.parse()?;
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }
        platforms.sort();
        Ok(platforms)
    }
}

/// Raw generation request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCalendarRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub platforms: Option<PlatformSelection>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Explicit weekday names; wins over `frequency`.
    #[serde(default)]
    pub distribution_pattern: Option<Vec<String>>,
    /// Posts per week preset (1, 2, 3, 5, 7).
    #[serde(default)]
    pub frequency: Option<u8>,
}

/// Explicit weekday names win over a frequency preset; with neither, the
/// default frequency applies. An explicit empty list is an empty pattern.
pub fn resolve_pattern(
    names: Option<&[String]>,
    frequency: Option<u8>,
) -> Result<DistributionPattern, ApiError> {
    match (names, frequency) {
        (Some(names), _) => DistributionPattern::from_names(names),
        (None, Some(freq)) => DistributionPattern::for_frequency(freq),
        (None, None) => DistributionPattern::for_frequency(DEFAULT_FREQUENCY),
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest(format!("Missing required field: {}", field)))
}

impl GenerateCalendarRequest {
    /// Check required fields and parse dates, platforms and pattern.
    pub fn validate(&self) -> Result<CalendarRequest, ApiError> {
        let description = required(&self.description, "description")?;
        let start_date = parse_iso_date(required(&self.start_date, "startDate")?)?;
        let end_date = parse_iso_date(required(&self.end_date, "endDate")?)?;
        if end_date < start_date {
            return Err(ApiError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }

        let platforms = self
            .platforms
            .as_ref()
            .map(PlatformSelection::resolve)
            .transpose()?
            .unwrap_or_default();
        if platforms.is_empty() {
            return Err(ApiError::InvalidRequest(
                "Missing required field: platforms (select at least one)".to_string(),
            ));
        }

        let pattern = resolve_pattern(self.distribution_pattern.as_deref(), self.frequency)?;

        Ok(CalendarRequest {
            start_date,
            end_date,
            pattern,
            business: BusinessContext {
                description: description.to_string(),
                platforms,
            },
        })
    }
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn from_result(result: Result<ContentCalendar, ApiError>) -> Self {
        match result {
            Ok(calendar) => match serde_json::to_value(&calendar) {
                Ok(body) => Self { status: 200, body },
                Err(e) => {
                    error!(error = %e, "Failed to serialize calendar");
                    Self::failure()
                }
            },
            Err(e) if e.is_client_error() => {
                warn!(error = %e, "Rejected generation request");
                Self {
                    status: 400,
                    body: json!({ "error": e.to_string() }),
                }
            }
            Err(e) => {
                error!(error = %e, "Calendar generation failed");
                Self::failure()
            }
        }
    }

    fn failure() -> Self {
        Self {
            status: 500,
            body: json!({ "error": GENERIC_FAILURE }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Entry point wiring request validation to the pipeline.
pub struct CalendarService {
    pipeline: CalendarPipeline,
}

impl CalendarService {
    pub fn new(pipeline: CalendarPipeline) -> Self {
        Self { pipeline }
    }

    /// Build the LLM-backed service described by `config`.
    pub fn from_config(config: &CalendarConfig, workspace_root: &Path) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        let audit = config.audit.open(workspace_root);
        let oracle = LlmOracle::from_config(&config.provider, audit)?;
        info!(
            provider = oracle.provider_name(),
            model = oracle.model_name(),
            "Oracle client ready"
        );
        let oracle: Arc<dyn ContentOracle> = Arc::new(oracle);
        Ok(Self::new(CalendarPipeline::new(oracle, config.chunking)?))
    }

    pub fn pipeline(&self) -> &CalendarPipeline {
        &self.pipeline
    }

    pub async fn generate(
        &self,
        request: &GenerateCalendarRequest,
    ) -> Result<ContentCalendar, ApiError> {
        let request = request.validate()?;
        self.pipeline.run(&request).await
    }

    /// Handle a JSON request body end to end.
    pub async fn handle(&self, body: &str) -> ApiResponse {
        let request: GenerateCalendarRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                return ApiResponse::from_result(Err(ApiError::InvalidRequest(format!(
                    "Malformed request body: {}",
                    e
                ))))
            }
        };
        ApiResponse::from_result(self.generate(&request).await)
    }
}
