//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::pipeline::{BatchWindow, ChunkPolicy};
use crate::schedule::{weekday_name, DistributionPattern, PostingDate};
use crate::types::ContentCalendar;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::OutputError(format!("Failed to serialize output: {}", e)))
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

pub fn format_calendar_json(calendar: &ContentCalendar) -> Result<String, ApiError> {
    to_json(calendar)
}

pub fn format_calendar_text(calendar: &ContentCalendar) -> String {
    let mut out = String::new();

    out.push_str(&heading("Content pillars"));
    out.push('\n');
    if calendar.content_pillars.is_empty() {
        out.push_str("  (none)\n");
    }
    for pillar in &calendar.content_pillars {
        out.push_str(&format!("  - {}\n", pillar.name()));
    }
    out.push('\n');

    out.push_str(&heading(&format!(
        "Content ideas ({})",
        calendar.content_ideas.len()
    )));
    out.push('\n');
    if calendar.content_ideas.is_empty() {
        out.push_str("No posting dates in range.");
        return out;
    }

    let mut ideas = table(vec!["Date", "Day", "Platform", "Pillar", "Type", "Summary"]);
    for idea in &calendar.content_ideas {
        ideas.add_row(vec![
            idea.date.format("%Y-%m-%d").to_string(),
            idea.date.format("%a").to_string(),
            idea.platform.clone(),
            idea.pillar.clone(),
            idea.content_type.clone(),
            idea.summary.clone(),
        ]);
    }
    out.push_str(&ideas.to_string());
    out
}

pub fn format_dates(
    dates: &[PostingDate],
    pattern: &DistributionPattern,
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(&json!({
            "distributionPattern": pattern,
            "count": dates.len(),
            "dates": dates,
        }));
    }

    let mut out = format!(
        "{}\n",
        heading(&format!("{} posting dates ({})", dates.len(), pattern))
    );
    if dates.is_empty() {
        out.push_str("No posting dates in range.");
        return Ok(out);
    }
    let mut rows = table(vec!["#", "Date", "Weekday"]);
    for (i, date) in dates.iter().enumerate() {
        rows.add_row(vec![
            (i + 1).to_string(),
            date.iso(),
            weekday_name(date.weekday()).to_string(),
        ]);
    }
    out.push_str(&rows.to_string());
    Ok(out)
}

pub fn format_plan(
    windows: &[BatchWindow],
    dates: &[PostingDate],
    policy: &ChunkPolicy,
    format: &str,
) -> Result<String, ApiError> {
    let span = |w: &BatchWindow| -> (String, String) {
        let first = dates.get(w.start).map(PostingDate::iso).unwrap_or_default();
        let last = dates
            .get(w.end().saturating_sub(1))
            .map(PostingDate::iso)
            .unwrap_or_default();
        (first, last)
    };

    if format == "json" {
        let batches: Vec<serde_json::Value> = windows
            .iter()
            .map(|w| {
                let (first, last) = span(w);
                json!({
                    "start": w.start,
                    "requested": w.requested,
                    "len": w.len,
                    "firstDate": first,
                    "lastDate": last,
                })
            })
            .collect();
        return to_json(&json!({
            "policy": policy,
            "totalDates": dates.len(),
            "batches": batches,
        }));
    }

    let mut out = format!(
        "{}\n",
        heading(&format!(
            "{} dates in {} batches (initial {}, min {}, max {}, growth {})",
            dates.len(),
            windows.len(),
            policy.initial_size,
            policy.min_size,
            policy.max_size,
            policy.growth_step
        ))
    );
    if windows.is_empty() {
        out.push_str("Nothing to generate.");
        return Ok(out);
    }
    let mut rows = table(vec!["Batch", "Requested", "Sent", "First date", "Last date"]);
    for (i, w) in windows.iter().enumerate() {
        let (first, last) = span(w);
        rows.add_row(vec![
            (i + 1).to_string(),
            w.requested.to_string(),
            w.len.to_string(),
            first,
            last,
        ]);
    }
    out.push_str(&rows.to_string());
    Ok(out)
}
