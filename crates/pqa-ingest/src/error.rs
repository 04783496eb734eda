//! Error types for dataset and corpus loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the example question dataset.
///
/// Every variant is fatal at startup: the front end cannot offer random
/// questions without the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// File missing or unreadable.
    #[error("failed to read dataset {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited content.
    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Required column not present in the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Header present but no usable question rows.
    #[error("dataset is empty: {path}")]
    Empty { path: PathBuf },
}

impl DatasetError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::FileRead { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingColumn { path, .. }
            | Self::Empty { path } => path,
        }
    }

    /// Diagnostic printed before the process exits.
    pub fn diagnostic(&self) -> String {
        format!(
            "The example question file was not found or is invalid under `{}` ({self}). \
             Provide a ';'-separated file with 'Question Text' and 'Answer' columns \
             via --dataset or EVAL_FILE.",
            self.path().display()
        )
    }
}

/// Errors raised while loading the policy corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse corpus {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = DatasetError> = std::result::Result<T, E>;
