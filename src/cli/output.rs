//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::api::GENERIC_FAILURE;
use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
/// Request problems are shown verbatim; an exhausted run gets the same
/// generic message however many batches succeeded before it.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::PipelineExhausted { .. } => GENERIC_FAILURE.to_string(),
        other => other.to_string(),
    }
}
