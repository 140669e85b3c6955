//! CLI parse: clap types for contentcal. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// contentcal CLI - social media content calendars from an LLM
#[derive(Parser)]
#[command(name = "contentcal")]
#[command(about = "Generate dated social media content calendars with an LLM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ and the audit log live here)
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Date range and cadence shared by every calendar command.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// First day of the calendar (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last day of the calendar, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Weekdays to post on, comma separated (e.g. mon,wed,fri)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub days: Option<Vec<String>>,

    /// Posts per week preset (1, 2, 3, 5, 7); ignored when --days is given
    #[arg(long)]
    pub frequency: Option<u8>,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a content calendar through the configured model provider
    Generate {
        #[command(flatten)]
        schedule: ScheduleArgs,

        /// Platforms to plan for, comma separated (instagram, facebook, twitter, linkedin)
        #[arg(long, value_delimiter = ',', required = true)]
        platforms: Vec<String>,

        /// Business description
        #[arg(long, required_unless_present = "description_file")]
        description: Option<String>,

        /// Read the business description from a plain text file
        #[arg(long, conflicts_with = "description")]
        description_file: Option<PathBuf>,

        /// Also write the calendar as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the posting dates a calendar would cover
    Dates {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Show the batch layout used when every oracle call succeeds
    Plan {
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}
