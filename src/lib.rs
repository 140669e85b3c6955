//! contentcal: Adaptive Content Calendar Generation
//!
//! Turns a date range and a weekday posting pattern into a calendar of content
//! ideas produced by an LLM. Dates are sent in adaptively sized batches; a
//! failed batch is halved and retried, and successful batches are merged into
//! one date-ordered calendar.

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod oracle;
pub mod pipeline;
pub mod provider;
pub mod schedule;
pub mod types;
