//! Integration tests for layered configuration loading

use crate::integration::test_utils::with_isolated_env;
use planwright::config::{global_config_path, ConfigLoader, ProviderType};
use planwright::generation::{RetryPolicy, StrategyKind};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_without_any_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(&test_dir, &[], || ConfigLoader::load(workspace.path())).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.provider.provider_type, ProviderType::OpenAI);
    assert_eq!(config.pipeline.strategies, StrategyKind::DEFAULT_ORDER.to_vec());
    assert_eq!(config.pipeline.call_timeout(), Duration::from_secs(30));
    assert_eq!(config.pipeline.retry, RetryPolicy::default());
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_layers_apply_in_precedence_order() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(
        &test_dir,
        &[
            ("PLANWRIGHT_ENV", "ci"),
            ("PLANWRIGHT__PIPELINE__CIRCUIT_TTL_SECS", "60"),
        ],
        || {
            let global = global_config_path().unwrap();
            assert!(global.starts_with(test_dir.path().join("config")));
            write(
                &global,
                r#"
[provider]
provider_type = "anthropic"
model = "global-model"

[pipeline]
call_timeout_ms = 1000
circuit_ttl_secs = 10
"#,
            );
            write(
                &workspace.path().join("config/config.toml"),
                r#"
[provider]
model = "workspace-model"

[pipeline]
call_timeout_ms = 2000
"#,
            );
            write(
                &workspace.path().join("config/ci.toml"),
                r#"
[pipeline]
call_timeout_ms = 3000
strategies = ["simplified_format"]
"#,
            );
            ConfigLoader::load(workspace.path())
        },
    )
    .unwrap();

    assert_eq!(config.provider.provider_type, ProviderType::Anthropic);
    assert_eq!(config.provider.model, "workspace-model");
    assert_eq!(config.pipeline.call_timeout_ms, 3000);
    assert_eq!(config.pipeline.strategies, vec![StrategyKind::SimplifiedFormat]);
    assert_eq!(config.pipeline.circuit_ttl_secs, 60);
}

#[test]
fn test_environment_can_reorder_strategies() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(
        &test_dir,
        &[(
            "PLANWRIGHT__PIPELINE__STRATEGIES",
            "structured_prompt,decomposed_per_unit",
        )],
        || ConfigLoader::load(workspace.path()),
    )
    .unwrap();

    assert_eq!(
        config.pipeline.strategies,
        vec![StrategyKind::StructuredPrompt, StrategyKind::DecomposedPerUnit]
    );
}

#[test]
fn test_invalid_values_are_reported_together() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("planwright.toml");
    write(
        &config_file,
        r#"
[provider]
provider_type = "local"
model = "tiny"

[pipeline]
strategies = ["function_call", "function_call"]

[logging]
format = "xml"
"#,
    );

    let config = with_isolated_env(&test_dir, &[], || ConfigLoader::load_from_file(&config_file))
        .unwrap();
    let errors = config.validate().unwrap_err();

    assert_eq!(errors.len(), 3);
    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(rendered[0].starts_with("Provider:"));
    assert!(rendered[1].contains("more than once"));
    assert!(rendered[2].starts_with("Logging:"));
}

#[test]
fn test_unknown_strategy_fails_to_load() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("planwright.toml");
    write(&config_file, "[pipeline]\nstrategies = [\"telepathy\"]\n");

    let result = with_isolated_env(&test_dir, &[], || ConfigLoader::load_from_file(&config_file));
    assert!(result.is_err());
}
