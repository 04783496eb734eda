//! Startup sequence and the pieces a front end session needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pqa_client::{BackendClient, BackendError, version_or_unknown};
use pqa_core::{CycleOutcome, Interaction, Phase, QueryController, RandomSampler, SessionStore};
use pqa_ingest::{Corpus, DatasetError, load_corpus, load_dataset};
use pqa_model::{DatasetRow, QueryLimits, SessionId};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::logging::redact_value;
use crate::render::Page;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("file upload is disabled")]
    UploadDisabled,
}

impl AppError {
    /// Text printed to stderr before exiting.
    pub fn user_message(&self) -> String {
        match self {
            Self::Dataset(err) => err.diagnostic(),
            Self::UploadDisabled => {
                "File upload is disabled (DISABLE_FILE_UPLOAD / disable_file_upload).".to_string()
            }
        }
    }
}

/// Outcome of uploading one file.
#[derive(Debug)]
pub struct UploadReport {
    pub path: PathBuf,
    pub result: Result<Value, BackendError>,
}

/// Everything loaded at startup, ready to run interaction cycles.
pub struct Frontend<B> {
    controller: QueryController<B>,
    page: Page,
    dataset_rows: usize,
}

/// Reads the example question dataset; any failure is fatal.
pub fn load_questions(config: &AppConfig) -> Result<Vec<DatasetRow>, AppError> {
    Ok(load_dataset(&config.dataset_path)?)
}

/// Reads the corpus, degrading to an empty one when it is unavailable.
///
/// The flag is true when the page should ask the user to reload.
pub fn load_corpus_or_empty(path: &Path) -> (Corpus, bool) {
    match load_corpus(path) {
        Ok(corpus) => (corpus, false),
        Err(err) => {
            warn!("{err}; continuing with an empty corpus");
            (Corpus::default(), true)
        }
    }
}

/// Clears the document store and indexes the corpus. Failures are logged;
/// queries will then report them.
pub fn prepare_store(backend: &dyn BackendClient, corpus: &Corpus) {
    match backend.reset_store() {
        Ok(true) => info!("cleared document store"),
        Ok(false) => warn!("document store reported failure deleting documents"),
        Err(err) => warn!("failed to clear document store: {err}"),
    }
    if corpus.is_empty() {
        return;
    }
    match backend.index_store(&corpus.segments) {
        Ok(()) => info!(segments = corpus.document_count(), "indexed policy corpus"),
        Err(err) => warn!("failed to index policy corpus: {err}"),
    }
}

/// Uploads each file, refusing when upload is disabled.
pub fn upload_documents(
    backend: &dyn BackendClient,
    enabled: bool,
    paths: &[PathBuf],
) -> Result<Vec<UploadReport>, AppError> {
    if !enabled {
        return Err(AppError::UploadDisabled);
    }
    Ok(paths
        .iter()
        .map(|path| {
            let result = backend.upload(path);
            match &result {
                Ok(_) => info!(path = %path.display(), "uploaded document"),
                Err(err) => warn!(path = %path.display(), "upload failed: {err}"),
            }
            UploadReport {
                path: path.clone(),
                result,
            }
        })
        .collect())
}

impl<B: BackendClient> Frontend<B> {
    /// Runs the startup sequence: store reset, corpus indexing, version lookup.
    pub fn start(
        backend: B,
        config: &AppConfig,
        questions: Vec<DatasetRow>,
        corpus: Corpus,
        reload_notice: bool,
    ) -> Result<Self, AppError> {
        let dataset_rows = questions.len();
        let sampler = RandomSampler::new(questions).map_err(|_| {
            AppError::Dataset(DatasetError::Empty {
                path: config.dataset_path.clone(),
            })
        })?;

        prepare_store(&backend, &corpus);
        let backend_version = version_or_unknown(&backend);
        let limits = QueryLimits::from_document_count(corpus.document_count());
        let page = Page {
            site: corpus.site,
            reload_notice,
            upload_enabled: !config.disable_file_upload,
            limits,
            backend_version,
        };
        let controller = QueryController::new(backend, sampler, Arc::new(SessionStore::new()))
            .with_limits(limits)
            .with_defaults(config.session_defaults());
        Ok(Self {
            controller,
            page,
            dataset_rows,
        })
    }

    pub fn controller(&self) -> &QueryController<B> {
        &self.controller
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn dataset_rows(&self) -> usize {
        self.dataset_rows
    }

    /// Runs one cycle, calling `on_running` when a query goes out.
    pub fn interact(
        &self,
        session: &SessionId,
        interaction: &Interaction,
        mut on_running: impl FnMut(),
    ) -> CycleOutcome {
        tracing::debug!(
            session = %session,
            question = redact_value(&interaction.question),
            run = interaction.run,
            random = interaction.random,
            "interaction"
        );
        self.controller
            .handle_observed(session, interaction, |phase| {
                if phase == Phase::Running {
                    on_running();
                }
            })
    }

    /// Uploads documents to the backend, one report per file.
    pub fn upload(&self, paths: &[PathBuf]) -> Result<Vec<UploadReport>, AppError> {
        upload_documents(self.controller.backend(), self.page.upload_enabled, paths)
    }

    /// Ends a session and drops its state.
    pub fn end_session(&self, session: &SessionId) {
        if self.controller.store().remove(session).is_some() {
            tracing::debug!(session = %session, "session ended");
        }
    }
}
