//! Config file loading and override precedence.

use std::fs;
use std::path::PathBuf;

use pqa_cli::config::{AppConfig, ConfigError, ConfigOverrides};
use pqa_model::QueryParams;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn explicit_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
api_endpoint = "http://haystack:8000"
default_number_of_answers = 5
disable_file_upload = true
"#,
    );

    let config = AppConfig::load(Some(&path)).unwrap();

    assert_eq!(config.api_endpoint, "http://haystack:8000");
    assert_eq!(config.default_number_of_answers, 5);
    assert!(config.disable_file_upload);
    assert_eq!(config.default_docs_from_retriever, 10);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn invalid_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "default_number_of_answers = \"three\"");
    let err = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn overrides_win_over_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "default_question = \"From file\"\ndataset_path = \"file.csv\"");

    let config = AppConfig::load(Some(&path))
        .unwrap()
        .with_overrides(ConfigOverrides {
            default_question: Some("From env".to_string()),
            default_docs_from_retriever: Some(4),
            ..ConfigOverrides::default()
        });

    assert_eq!(config.default_question, "From env");
    assert_eq!(config.dataset_path, PathBuf::from("file.csv"));
    assert_eq!(config.default_docs_from_retriever, 4);
}

#[test]
fn session_defaults_follow_the_config() {
    let config = AppConfig {
        default_question: "Do you use cookies?".to_string(),
        default_answer: "Cookies".to_string(),
        default_number_of_answers: 2,
        default_docs_from_retriever: 7,
        ..AppConfig::default()
    };

    let defaults = config.session_defaults();

    assert_eq!(defaults.question, "Do you use cookies?");
    assert_eq!(defaults.answer.as_deref(), Some("Cookies"));
    assert_eq!(defaults.params, QueryParams::new(2, 7));
}
