//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.type", "openai")?
        .set_default("provider.model", "gpt-3.5-turbo")?
        .set_default("chunking.initial_size", 30)?
        .set_default("chunking.min_size", 7)?
        .set_default("chunking.max_size", 60)?
        .set_default("chunking.growth_step", 5)?
        .set_default("audit.enabled", true)?
        .set_default("audit.path", "contentcal_audit.log")
}
