//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, ScheduleArgs};
pub use presentation::{format_calendar_json, format_calendar_text, format_dates, format_plan};
pub use route::RunContext;
