//! Layer precedence and default value tests.

use ortho_config::OrthoConfig;
use rstest::rstest;
use serde_json::{Value, json};

use super::helpers::build_config_from_layers;
use crate::PrismConfig;

#[rstest]
#[case::file_overrides_defaults(
    vec![("defaults", json!({"author": "default"})), ("file", json!({"author": "file"}))],
    "file",
    "file should override default"
)]
#[case::environment_overrides_file(
    vec![("file", json!({"author": "file"})), ("environment", json!({"author": "env"}))],
    "env",
    "environment should override file"
)]
#[case::cli_overrides_environment(
    vec![("environment", json!({"author": "env"})), ("cli", json!({"author": "cli"}))],
    "cli",
    "CLI should override environment"
)]
fn author_follows_layer_precedence(
    #[case] layers: Vec<(&str, Value)>,
    #[case] expected: &str,
    #[case] message: &str,
) {
    let config = build_config_from_layers(&layers);
    assert_eq!(config.author.as_deref(), Some(expected), "{message}");
}

#[rstest]
fn full_precedence_chain_keeps_lower_layers_for_unset_fields() {
    let config = build_config_from_layers(&[
        ("defaults", json!({"page_size": 10, "data_dir": "defaults"})),
        ("file", json!({"page_size": 20, "data_dir": "from-file"})),
        ("environment", json!({"page_size": 30})),
        ("cli", json!({"page_size": 40})),
    ]);

    assert_eq!(config.page_size, 40, "CLI should win for page_size");
    assert_eq!(
        config.data_dir, "from-file",
        "file value should survive when higher layers omit data_dir"
    );
}

#[rstest]
fn defaults_match_documented_values() {
    let config = PrismConfig::default();

    assert_eq!(config.api_base, "https://api.github.com");
    assert_eq!(config.state, "merged");
    assert_eq!(config.max_pages, 20);
    assert_eq!(config.page_size, 50);
    assert_eq!(config.data_dir, "data");
    assert_eq!(config.llm_timeout_seconds, 120);
    assert!(!config.telemetry, "telemetry should be off by default");
}

#[rstest]
fn cli_flags_override_environment() {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();

    let _guard = env_lock::lock_env([
        ("PRISM_AUTHOR", Some("env-author")),
        ("PRISM_MAX_PAGES", Some("7")),
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ]);

    let config = PrismConfig::load_from_iter(["prism", "--author", "cli-author"])
        .expect("config should load");

    assert_eq!(config.author.as_deref(), Some("cli-author"));
    assert_eq!(config.max_pages, 7, "environment should set max_pages");
}
