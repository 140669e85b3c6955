//! Layered configuration loading against real files.

use super::test_utils::with_isolated_env;
use contentcal::config::{ConfigLoader, ProviderType};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_global_then_workspace_then_env_file_then_env_vars() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_isolated_env(&test_dir, || {
        let global_dir = test_dir.path().join("xdg").join("contentcal");
        fs::create_dir_all(&global_dir).unwrap();
        fs::write(
            global_dir.join("config.toml"),
            r#"
[provider]
type = "ollama"
model = "llama3"

[chunking]
initial_size = 20
growth_step = 10

[logging]
level = "warn"
"#,
        )
        .unwrap();

        let ws_config = workspace.path().join("config");
        fs::create_dir_all(&ws_config).unwrap();
        fs::write(ws_config.join("config.toml"), "[chunking]\ninitial_size = 25\n").unwrap();
        fs::write(ws_config.join("production.toml"), "[audit]\nenabled = false\n").unwrap();

        std::env::set_var("CONTENTCAL_ENV", "production");
        std::env::set_var("CONTENTCAL__PROVIDER__MODEL", "mistral");

        let config = ConfigLoader::load(workspace.path()).unwrap();

        assert_eq!(config.provider.provider_type, ProviderType::Ollama);
        assert_eq!(config.provider.model, "mistral");
        assert_eq!(config.chunking.initial_size, 25);
        assert_eq!(config.chunking.growth_step, 10);
        assert_eq!(config.chunking.min_size, 7);
        assert!(!config.audit.enabled);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    });
}

#[test]
fn test_development_env_file_is_the_default() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    with_isolated_env(&test_dir, || {
        let ws_config = workspace.path().join("config");
        fs::create_dir_all(&ws_config).unwrap();
        fs::write(ws_config.join("development.toml"), "[chunking]\nmax_size = 45\n").unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.chunking.max_size, 45);
    });
}

#[test]
fn test_invalid_policy_loads_but_fails_validation() {
    let test_dir = TempDir::new().unwrap();

    with_isolated_env(&test_dir, || {
        let path = test_dir.path().join("bad.toml");
        fs::write(&path, "[chunking]\nmin_size = 50\nmax_size = 40\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("chunking:"));
    });
}

#[test]
fn test_wrong_type_is_a_config_error() {
    let test_dir = TempDir::new().unwrap();

    with_isolated_env(&test_dir, || {
        let path = test_dir.path().join("typo.toml");
        fs::write(&path, "[chunking]\ninitial_size = \"thirty\"\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, contentcal::error::ApiError::ConfigError(_)));
    });
}
