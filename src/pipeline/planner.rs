//! Chunk planner and retry controller.
//!
//! A pure state machine over indices into the posting-date sequence. The
//! executor feeds it oracle outcomes and carries out the returned actions; no
//! I/O happens here, so the sizing policy is testable on its own.

use serde::{Deserialize, Serialize};

/// Batch sizing policy, also the `[chunking]` configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPolicy {
    /// Size of the very first attempt of a run.
    #[serde(default = "default_initial_size")]
    pub initial_size: usize,

    /// Floor for halving; a failure at or below this size ends the run.
    #[serde(default = "default_min_size")]
    pub min_size: usize,

    /// Ceiling for post-success growth.
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Added to the successful attempt size to get the next initial size.
    #[serde(default = "default_growth_step")]
    pub growth_step: usize,
}

fn default_initial_size() -> usize {
    30
}

fn default_min_size() -> usize {
    7
}

fn default_max_size() -> usize {
    60
}

fn default_growth_step() -> usize {
    5
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            initial_size: default_initial_size(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            growth_step: default_growth_step(),
        }
    }
}

impl ChunkPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_size == 0 {
            return Err("min_size must be at least 1".to_string());
        }
        if self.min_size > self.max_size {
            return Err(format!(
                "min_size ({}) cannot exceed max_size ({})",
                self.min_size, self.max_size
            ));
        }
        if self.initial_size < self.min_size || self.initial_size > self.max_size {
            return Err(format!(
                "initial_size ({}) must lie within [{}, {}]",
                self.initial_size, self.min_size, self.max_size
            ));
        }
        Ok(())
    }

    /// Size of the retry after an attempt that sent `sent` dates failed.
    pub fn halve(&self, sent: usize) -> usize {
        (sent / 2).max(self.min_size)
    }

    /// Initial size of the next batch after an attempt of `size` succeeded.
    pub fn grow(&self, size: usize) -> usize {
        size.saturating_add(self.growth_step).min(self.max_size)
    }
}

/// Index range of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    pub start: usize,
    /// Dates actually sent; shorter than `requested` only at the tail.
    pub len: usize,
    pub requested: usize,
}

impl BatchWindow {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    Planning { start: usize, next_initial: usize },
    Attempting { start: usize, size: usize },
    Succeeded { next_start: usize, next_initial: usize },
    Halving { start: usize, size: usize },
    Exhausted { window: BatchWindow },
    Complete,
}

impl PlannerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlannerState::Exhausted { .. } | PlannerState::Complete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerEvent {
    /// Move on from a planning, succeeded or halving state.
    Proceed,
    BatchSucceeded,
    BatchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerAction {
    /// Call the oracle with this window.
    Send(BatchWindow),
    /// Merge the output of this window.
    Accept {
        window: BatchWindow,
        next_initial: usize,
    },
    /// The window failed; the next attempt uses `next_size`.
    Shrink {
        failed: BatchWindow,
        next_size: usize,
    },
    /// The window failed at the floor; discard everything.
    Abort(BatchWindow),
    /// Every date is covered.
    Finish,
    /// The event does not apply to the current state.
    Ignore,
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkPlanner {
    policy: ChunkPolicy,
    total: usize,
}

impl ChunkPlanner {
    pub fn new(policy: ChunkPolicy, total: usize) -> Self {
        Self { policy, total }
    }

    pub fn initial_state(&self) -> PlannerState {
        PlannerState::Planning {
            start: 0,
            next_initial: self.policy.initial_size,
        }
    }

    pub fn window(&self, start: usize, size: usize) -> BatchWindow {
        BatchWindow {
            start,
            len: size.min(self.total.saturating_sub(start)),
            requested: size,
        }
    }

    fn plan_next(&self, start: usize, next_initial: usize) -> (PlannerState, PlannerAction) {
        if start >= self.total {
            return (PlannerState::Complete, PlannerAction::Finish);
        }
        (
            PlannerState::Attempting {
                start,
                size: next_initial,
            },
            PlannerAction::Send(self.window(start, next_initial)),
        )
    }

    pub fn transition(
        &self,
        state: PlannerState,
        event: PlannerEvent,
    ) -> (PlannerState, PlannerAction) {
        use PlannerEvent::*;
        use PlannerState::*;

        match (state, event) {
            (Planning { start, next_initial }, Proceed) => self.plan_next(start, next_initial),
            (
                Succeeded {
                    next_start,
                    next_initial,
                },
                Proceed,
            ) => self.plan_next(next_start, next_initial),
            (Halving { start, size }, Proceed) => (
                Attempting { start, size },
                PlannerAction::Send(self.window(start, size)),
            ),
            (Attempting { start, size }, BatchSucceeded) => {
                let window = self.window(start, size);
                let next_initial = self.policy.grow(size);
                (
                    Succeeded {
                        next_start: window.end(),
                        next_initial,
                    },
                    PlannerAction::Accept {
                        window,
                        next_initial,
                    },
                )
            }
            (Attempting { start, size }, BatchFailed) => {
                let window = self.window(start, size);
                if window.len <= self.policy.min_size {
                    (Exhausted { window }, PlannerAction::Abort(window))
                } else {
                    let next_size = self.policy.halve(window.len);
                    (
                        Halving {
                            start,
                            size: next_size,
                        },
                        PlannerAction::Shrink {
                            failed: window,
                            next_size,
                        },
                    )
                }
            }
            (state, _) => (state, PlannerAction::Ignore),
        }
    }

    /// Windows the planner would send if every attempt succeeded.
    pub fn dry_run(&self) -> Vec<BatchWindow> {
        let mut windows = Vec::new();
        let mut state = self.initial_state();
        let mut event = PlannerEvent::Proceed;
        loop {
            let (next, action) = self.transition(state, event);
            state = next;
            match action {
                PlannerAction::Send(window) => {
                    windows.push(window);
                    event = PlannerEvent::BatchSucceeded;
                }
                PlannerAction::Accept { .. } => event = PlannerEvent::Proceed,
                _ => break,
            }
        }
        windows
    }
}
