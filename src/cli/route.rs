//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::api::{resolve_pattern, CalendarService, GenerateCalendarRequest, PlatformSelection};
use crate::config::{CalendarConfig, ConfigLoader};
use crate::error::ApiError;
use crate::pipeline::ChunkPlanner;
use crate::schedule::{enumerate_posting_dates, parse_iso_date, DistributionPattern, PostingDate};
use crate::types::ContentCalendar;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::parse::{Commands, ConfigCommands, ScheduleArgs};
use crate::cli::presentation::{
    format_calendar_json, format_calendar_text, format_dates, format_plan,
};

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: CalendarConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: CalendarConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                schedule,
                platforms,
                description,
                description_file,
                output,
            } => self.handle_generate(
                schedule,
                platforms,
                description.as_deref(),
                description_file.as_deref(),
                output.as_deref(),
            ),
            Commands::Dates { schedule } => {
                let (dates, pattern) = resolve_schedule(schedule)?;
                format_dates(&dates, &pattern, &schedule.format)
            }
            Commands::Plan { schedule } => {
                let (dates, _) = resolve_schedule(schedule)?;
                let policy = self.config.chunking;
                policy.validate().map_err(|e| {
                    ApiError::ConfigError(format!("Invalid chunking policy: {}", e))
                })?;
                let windows = ChunkPlanner::new(policy, dates.len()).dry_run();
                format_plan(&windows, &dates, &policy, &schedule.format)
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show { format } => self.handle_config_show(format),
            },
        }
    }

    fn handle_generate(
        &self,
        schedule: &ScheduleArgs,
        platforms: &[String],
        description: Option<&str>,
        description_file: Option<&Path>,
        output: Option<&Path>,
    ) -> Result<String, ApiError> {
        let description = match (description, description_file) {
            (Some(text), _) => text.to_string(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                ApiError::InvalidRequest(format!(
                    "Failed to read description file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            (None, None) => String::new(),
        };

        let request = GenerateCalendarRequest {
            description: Some(description),
            platforms: Some(PlatformSelection::List(platforms.to_vec())),
            start_date: Some(schedule.start.clone()),
            end_date: Some(schedule.end.clone()),
            distribution_pattern: schedule.days.clone(),
            frequency: schedule.frequency,
        };
        // Reject bad input before touching the provider.
        request.validate()?;

        let service = CalendarService::from_config(&self.config, &self.workspace_root)?;
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ProviderError(format!("Failed to create runtime: {}", e)))?;
        let calendar = rt.block_on(service.generate(&request))?;

        if let Some(path) = output {
            write_calendar_file(path, &calendar)?;
        }

        if schedule.format == "json" {
            format_calendar_json(&calendar)
        } else {
            Ok(format_calendar_text(&calendar))
        }
    }

    fn handle_config_show(&self, format: &str) -> Result<String, ApiError> {
        let mut shown = self.config.clone();
        if shown.provider.api_key.is_some() {
            shown.provider.api_key = Some("********".to_string());
        }
        match format {
            "json" => serde_json::to_string_pretty(&shown)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
            _ => shown.to_toml(),
        }
    }
}

fn write_calendar_file(path: &Path, calendar: &ContentCalendar) -> Result<(), ApiError> {
    let json = format_calendar_json(calendar)?;
    std::fs::write(path, json).map_err(|e| {
        ApiError::OutputError(format!("Failed to write {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), "Calendar written");
    Ok(())
}

fn resolve_schedule(
    schedule: &ScheduleArgs,
) -> Result<(Vec<PostingDate>, DistributionPattern), ApiError> {
    let start = parse_iso_date(&schedule.start)?;
    let end = parse_iso_date(&schedule.end)?;
    let pattern = resolve_pattern(schedule.days.as_deref(), schedule.frequency)?;
    let dates = enumerate_posting_dates(start, end, &pattern)?;
    Ok((dates, pattern))
}
