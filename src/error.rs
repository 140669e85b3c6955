//! Error types for the content calendar pipeline.

use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single oracle attempt.
///
/// Every variant is recoverable by the retry controller: the batch is halved
/// and resent until the minimum chunk size is reached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle authentication failed: {0}")]
    AuthFailed(String),

    #[error("Oracle rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Oracle response is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Oracle response violates the calendar schema: {0}")]
    SchemaViolation(String),

    #[error("Oracle returned {actual} ideas for a batch of {expected} dates")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Oracle returned an idea for unrequested date {0}")]
    UnexpectedDate(String),

    #[error("Oracle returned more than one idea for {0}")]
    DuplicateDate(NaiveDate),
}

/// Audit log write failure. Always swallowed by the caller.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller-facing errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid date range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid distribution pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(
        "Generation exhausted at {start_date} with {batch_size} dates after {succeeded_batches} successful batches: {last_error}"
    )]
    PipelineExhausted {
        start_date: NaiveDate,
        batch_size: usize,
        succeeded_batches: usize,
        last_error: OracleError,
    },

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    OutputError(String),
}

impl ApiError {
    /// True for errors caused by the request itself rather than the oracle.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidRange { .. } | ApiError::InvalidPattern(_) | ApiError::InvalidRequest(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
