//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, the
//! workspace `config/` directory, then `CONTENTCAL__SECTION__KEY` environment
//! overrides. Validation runs after load and reports every problem at once.

use crate::audit::AuditConfig;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::pipeline::ChunkPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::provider::{ProviderConfig, ProviderType};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod environment;
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::environment::ENV_PREFIX;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::ENV_NAME_VAR;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Model provider used by the oracle
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Batch sizing policy
    #[serde(default)]
    pub chunking: ChunkPolicy,

    /// Prompt/response audit log
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Chunking(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "provider: {}", msg),
            ValidationError::Chunking(msg) => write!(f, "chunking: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CalendarConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.chunking.validate() {
            errors.push(ValidationError::Chunking(e));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "Invalid format '{}'",
                self.logging.format
            )));
        }
        if !matches!(
            self.logging.output.as_str(),
            "stdout" | "stderr" | "file" | "file+stderr" | "both"
        ) {
            errors.push(ValidationError::Logging(format!(
                "Invalid output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Render as TOML, the same shape the loader reads.
    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

/// Loads [`CalendarConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace
    /// `config/config.toml`, `config/{CONTENTCAL_ENV}.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<CalendarConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);

        let config: CalendarConfig = builder.build()?.try_deserialize()?;
        tracing::debug!(
            workspace = %workspace_root.display(),
            provider = ?config.provider.provider_type,
            model = %config.provider.model,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<CalendarConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()).required(true));
        let builder = sources::environment::add_to_builder(builder);

        Ok(builder.build()?.try_deserialize()?)
    }
}
