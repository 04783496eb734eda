//! Application configuration.
//!
//! Values are layered: built-in defaults, then the TOML config file, then
//! environment variables and command-line flags.
//!
//! Without `--config`, the file is looked up in the platform config folder:
//! - Linux: ~/.config/policy-qa/config.toml
//! - macOS: ~/Library/Application Support/policy-qa/config.toml
//! - Windows: %APPDATA%/policy-qa/config/config.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use pqa_client::{DEFAULT_API_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};
use pqa_model::{
    DEFAULT_ANSWER_AT_STARTUP, DEFAULT_DOCS_FROM_RETRIEVER, DEFAULT_NUMBER_OF_ANSWERS,
    DEFAULT_QUESTION_AT_STARTUP, QueryParams, SessionDefaults,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_NAME: &str = "policy-qa";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Question shown when a session starts.
    pub default_question: String,
    /// Answer label paired with the default question.
    pub default_answer: String,
    /// Initial retriever slider value.
    pub default_docs_from_retriever: u32,
    /// Initial reader slider value.
    pub default_number_of_answers: u32,
    /// Hide and refuse document upload.
    pub disable_file_upload: bool,
    /// Base URL of the search backend.
    pub api_endpoint: String,
    /// Semicolon-separated example question file.
    pub dataset_path: PathBuf,
    /// Policy corpus indexed at startup.
    pub corpus_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_question: DEFAULT_QUESTION_AT_STARTUP.to_string(),
            default_answer: DEFAULT_ANSWER_AT_STARTUP.to_string(),
            default_docs_from_retriever: DEFAULT_DOCS_FROM_RETRIEVER,
            default_number_of_answers: DEFAULT_NUMBER_OF_ANSWERS,
            disable_file_upload: false,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            dataset_path: PathBuf::from("random_questions.csv"),
            corpus_path: PathBuf::from("appdata/corpus.json"),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub default_question: Option<String>,
    pub default_answer: Option<String>,
    pub default_docs_from_retriever: Option<u32>,
    pub default_number_of_answers: Option<u32>,
    pub disable_file_upload: Option<bool>,
    pub api_endpoint: Option<String>,
    pub dataset_path: Option<PathBuf>,
    pub corpus_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Loads the configuration file.
    ///
    /// An explicit `path` must exist and parse. Without one, the platform
    /// config file is used when present; an unreadable or invalid file there
    /// falls back to defaults with a warning.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let Some(path) = config_path() else {
            tracing::warn!("could not determine config path, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        match Self::from_file(&path) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("{err}, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides {
            default_question,
            default_answer,
            default_docs_from_retriever,
            default_number_of_answers,
            disable_file_upload,
            api_endpoint,
            dataset_path,
            corpus_path,
            request_timeout_secs,
        } = overrides;
        if let Some(value) = default_question {
            self.default_question = value;
        }
        if let Some(value) = default_answer {
            self.default_answer = value;
        }
        if let Some(value) = default_docs_from_retriever {
            self.default_docs_from_retriever = value;
        }
        if let Some(value) = default_number_of_answers {
            self.default_number_of_answers = value;
        }
        if let Some(value) = disable_file_upload {
            self.disable_file_upload = value;
        }
        if let Some(value) = api_endpoint {
            self.api_endpoint = value;
        }
        if let Some(value) = dataset_path {
            self.dataset_path = value;
        }
        if let Some(value) = corpus_path {
            self.corpus_path = value;
        }
        if let Some(value) = request_timeout_secs {
            self.request_timeout_secs = value;
        }
        self
    }

    /// Values every new session starts from. Slider values are clamped later
    /// against the indexed corpus.
    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            question: self.default_question.clone(),
            answer: Some(self.default_answer.clone()).filter(|answer| !answer.is_empty()),
            params: QueryParams::new(
                self.default_number_of_answers,
                self.default_docs_from_retriever,
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Platform config file location, if the home directory can be determined.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
