//! Integration tests for Configuration System

use super::test_utils::with_isolated_env;
use draftline::binder::bind;
use draftline::config::{global_config_path, ConfigLoader, DraftlineConfig};
use draftline::engine::EngineBuilder;
use draftline::error::ApiError;
use draftline::types::{DocumentCategory, GenerationRequest};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults_without_any_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = with_isolated_env(&temp_dir, || ConfigLoader::load(temp_dir.path()).unwrap());

    assert_eq!(config.delivery.interval_ms, 5);
    assert_eq!(config.delivery.chars_per_tick, 1);
    assert_eq!(config.delivery.settings().interval, Duration::from_millis(5));
    assert!(config.templates.is_empty());
    assert_eq!(config.logging.output, "stderr");
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_file_with_inline_template() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("draftline.toml");
    std::fs::write(
        &config_file,
        r#"
[delivery]
interval_ms = 20
chars_per_tick = 4

[templates.email]
body = "Hi {{client_name}}, re: {{project_details}}"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, || ConfigLoader::load_from_file(&config_file).unwrap());
    assert_eq!(config.delivery.interval_ms, 20);
    assert_eq!(config.delivery.chars_per_tick, 4);

    let registry = EngineBuilder::new(config).build_registry().unwrap();
    let request = GenerationRequest::new(DocumentCategory::Email, None, "Launch plan");
    assert_eq!(
        bind(registry.lookup(DocumentCategory::Email), &request),
        "Hi Client, re: Launch plan"
    );
    // Categories without overrides keep the built-in body.
    assert!(registry
        .lookup(DocumentCategory::Proposal)
        .body()
        .starts_with("# Project Proposal"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}

#[test]
fn test_workspace_config_and_template_path() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::create_dir_all(workspace.join("templates")).unwrap();
    std::fs::write(
        workspace.join("templates/estimate.md"),
        "Estimate{{#client_name}} for {{client_name}}{{/client_name}}: {{project_details}}",
    )
    .unwrap();
    std::fs::write(
        workspace.join("config/config.toml"),
        r#"
[delivery]
chars_per_tick = 2

[templates.estimate]
path = "templates/estimate.md"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.delivery.chars_per_tick, 2);

    let registry = EngineBuilder::new(config)
        .with_template_base(ConfigLoader::template_base(&workspace, None))
        .build_registry()
        .unwrap();
    let template = registry.lookup(DocumentCategory::Estimate);

    let named = GenerationRequest::new(DocumentCategory::Estimate, Some("Acme".into()), "API");
    let anonymous = GenerationRequest::new(DocumentCategory::Estimate, None, "API");
    assert_eq!(bind(template, &named), "Estimate for Acme: API");
    assert_eq!(bind(template, &anonymous), "Estimate: API");
}

#[test]
fn test_environment_overrides_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::write(
        workspace.join("config/config.toml"),
        "[delivery]\ninterval_ms = 50\n",
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, || {
        std::env::set_var("DRAFTLINE__DELIVERY__INTERVAL_MS", "7");
        ConfigLoader::load(&workspace).unwrap()
    });
    assert_eq!(config.delivery.interval_ms, 7);
}

#[test]
fn test_global_config_is_layered_under_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::write(
        workspace.join("config/config.toml"),
        "[delivery]\nchars_per_tick = 3\n",
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, || {
        let global = global_config_path().unwrap();
        std::fs::create_dir_all(global.parent().unwrap()).unwrap();
        std::fs::write(&global, "[delivery]\ninterval_ms = 40\nchars_per_tick = 9\n").unwrap();
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.delivery.interval_ms, 40);
    assert_eq!(config.delivery.chars_per_tick, 3);
}

#[test]
fn test_unknown_template_key_is_rejected() {
    let mut config = DraftlineConfig::default();
    config.templates.insert(
        "memo".to_string(),
        draftline::template::TemplateSource {
            body: Some("{{project_details}}".to_string()),
            path: None,
        },
    );

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        EngineBuilder::new(config).build_registry(),
        Err(ApiError::UnknownCategory(_))
    ));
}

#[tokio::test]
async fn test_invalid_delivery_config_blocks_engine() {
    let mut config = DraftlineConfig::default();
    config.delivery.chars_per_tick = 0;

    let result = EngineBuilder::new(config).build();
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}
