//! Adaptive chunked generation pipeline.
//!
//! Enumerates posting dates, then drives the [`ChunkPlanner`] state machine:
//! every `Send` action becomes one oracle call, every outcome is fed back as
//! an event. Batches run strictly one after another. A run either covers all
//! dates and returns the merged calendar, or fails as a whole.

use crate::error::{ApiError, OracleError};
use crate::oracle::{ContentOracle, GenerationContext};
use crate::schedule::{enumerate_posting_dates, DistributionPattern, PostingDate};
use crate::types::{Batch, BatchOutput, BusinessContext, ContentCalendar};
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub mod accumulator;
pub mod planner;

pub use accumulator::ResultAccumulator;
pub use planner::{
    BatchWindow, ChunkPlanner, ChunkPolicy, PlannerAction, PlannerEvent, PlannerState,
};

/// Already-validated input of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pattern: DistributionPattern,
    pub business: BusinessContext,
}

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_run_id() -> String {
    let seq = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("run-{}-{}", Utc::now().timestamp_millis(), seq)
}

pub struct CalendarPipeline {
    oracle: Arc<dyn ContentOracle>,
    policy: ChunkPolicy,
}

impl CalendarPipeline {
    pub fn new(oracle: Arc<dyn ContentOracle>, policy: ChunkPolicy) -> Result<Self, ApiError> {
        policy
            .validate()
            .map_err(|e| ApiError::ConfigError(format!("Invalid chunking policy: {}", e)))?;
        Ok(Self { oracle, policy })
    }

    pub async fn run(&self, request: &CalendarRequest) -> Result<ContentCalendar, ApiError> {
        let dates = enumerate_posting_dates(request.start_date, request.end_date, &request.pattern)?;
        self.run_dates(&dates, &request.business).await
    }

    /// Generate ideas for an ordered, duplicate-free date sequence.
    pub async fn run_dates(
        &self,
        dates: &[PostingDate],
        business: &BusinessContext,
    ) -> Result<ContentCalendar, ApiError> {
        let context = GenerationContext {
            run_id: next_run_id(),
            business: business.clone(),
        };
        let planner = ChunkPlanner::new(self.policy, dates.len());
        let mut accumulator = ResultAccumulator::new();
        let started = Instant::now();

        info!(
            run_id = %context.run_id,
            total_dates = dates.len(),
            initial_size = self.policy.initial_size,
            "Calendar generation started"
        );

        let mut state = planner.initial_state();
        let mut event = PlannerEvent::Proceed;
        let mut pending: Option<BatchOutput> = None;
        let mut last_error: Option<OracleError> = None;
        let mut attempts = 0usize;

        loop {
            let (next, action) = planner.transition(state, event);
            state = next;
            event = match action {
                PlannerAction::Send(window) => {
                    attempts += 1;
                    let batch = Batch::new(
                        dates[window.start..window.end()].to_vec(),
                        window.requested,
                    );
                    match self.oracle.generate(&batch, &context).await {
                        Ok(output) => {
                            pending = Some(output);
                            PlannerEvent::BatchSucceeded
                        }
                        Err(e) => {
                            last_error = Some(e);
                            PlannerEvent::BatchFailed
                        }
                    }
                }
                PlannerAction::Accept {
                    window,
                    next_initial,
                } => {
                    if let Some(output) = pending.take() {
                        accumulator.merge(output);
                    }
                    info!(
                        run_id = %context.run_id,
                        start = window.start,
                        batch_size = window.len,
                        covered = window.end(),
                        total_dates = dates.len(),
                        next_initial,
                        "Batch accepted"
                    );
                    PlannerEvent::Proceed
                }
                PlannerAction::Shrink { failed, next_size } => {
                    warn!(
                        run_id = %context.run_id,
                        start = failed.start,
                        failed_size = failed.len,
                        next_size,
                        "Batch failed, retrying with smaller batch"
                    );
                    PlannerEvent::Proceed
                }
                PlannerAction::Abort(window) => {
                    let last_error = last_error
                        .take()
                        .unwrap_or_else(|| OracleError::Transport("unknown failure".to_string()));
                    error!(
                        run_id = %context.run_id,
                        start = window.start,
                        batch_size = window.len,
                        succeeded_batches = accumulator.batch_count(),
                        discarded_ideas = accumulator.idea_count(),
                        attempts,
                        error = %last_error,
                        "Batch failed at minimum size, discarding run"
                    );
                    return Err(ApiError::PipelineExhausted {
                        start_date: dates[window.start].date(),
                        batch_size: window.len,
                        succeeded_batches: accumulator.batch_count(),
                        last_error,
                    });
                }
                PlannerAction::Finish => break,
                PlannerAction::Ignore => {
                    error!(run_id = %context.run_id, ?event, ?state, "Planner ignored event");
                    return Err(ApiError::ConfigError(format!(
                        "Planner ignored {:?} in state {:?}",
                        event, state
                    )));
                }
            };
        }

        info!(
            run_id = %context.run_id,
            batches = accumulator.batch_count(),
            attempts,
            ideas = accumulator.idea_count(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Calendar generation completed"
        );
        Ok(accumulator.finish())
    }
}
