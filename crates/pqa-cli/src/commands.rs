use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use pqa_cli::app::{Frontend, UploadReport, load_corpus_or_empty, load_questions, upload_documents};
use pqa_cli::config::AppConfig;
use pqa_cli::logging::redact_value;
use pqa_client::{BackendClient, HttpBackend, version_or_unknown};
use pqa_core::Interaction;
use pqa_ingest::{load_corpus, load_dataset};
use pqa_model::{QueryParams, SessionId};
use tracing::info;

use crate::cli::{QueryArgs, SettingsArgs, UploadArgs};
use crate::repl;

pub const SEARCH_MESSAGE: &str = "Performing neural search on the privacy policy document...";
pub const STARTUP_MESSAGE: &str = "Powering up...";

pub fn load_config(settings: &SettingsArgs) -> Result<AppConfig> {
    let config = AppConfig::load(settings.config.as_deref())?;
    Ok(config.with_overrides(settings.overrides()))
}

fn connect(config: &AppConfig) -> Result<HttpBackend> {
    HttpBackend::new(config.api_endpoint.clone(), config.request_timeout())
        .with_context(|| format!("failed to create client for {}", config.api_endpoint))
}

/// Dataset first (fatal), then corpus, store reset and indexing.
fn start_frontend(config: &AppConfig) -> Result<Frontend<HttpBackend>> {
    let questions = load_questions(config)?;
    let (corpus, reload_notice) = load_corpus_or_empty(&config.corpus_path);
    let backend = connect(config)?;
    let spinner = spinner(STARTUP_MESSAGE);
    let frontend = Frontend::start(backend, config, questions, corpus, reload_notice);
    spinner.finish_and_clear();
    let frontend = frontend?;
    info!(
        questions = frontend.dataset_rows(),
        documents = frontend.page().limits.max_documents,
        version = %frontend.page().backend_version,
        "front end ready"
    );
    Ok(frontend)
}

pub fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn run_ask(config: &AppConfig) -> Result<i32> {
    let frontend = start_frontend(config)?;
    repl::run(&frontend)?;
    Ok(0)
}

pub fn run_query(config: &AppConfig, args: &QueryArgs) -> Result<i32> {
    let frontend = start_frontend(config)?;
    let session = SessionId::generate();
    let defaults = frontend.controller().defaults().params;
    let params = QueryParams::new(
        args.answers.unwrap_or(defaults.top_k_reader),
        args.documents.unwrap_or(defaults.top_k_retriever),
    );
    info!(question = redact_value(&args.question), "running single query");

    let spinner = spinner(STARTUP_MESSAGE);
    let outcome = frontend.interact(
        &session,
        &Interaction::new(args.question.clone(), params).with_run(),
        || spinner.set_message(SEARCH_MESSAGE),
    );
    spinner.finish_and_clear();
    frontend.end_session(&session);

    println!("{}", frontend.page().render(&outcome, &args.question, args.raw));
    Ok(if outcome.failure().is_some() { 1 } else { 0 })
}

pub fn run_status(config: &AppConfig) -> Result<i32> {
    let backend = connect(config)?;
    let ready = backend.ready();
    let version = version_or_unknown(&backend);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![header_cell("Check"), header_cell("Status")]);
    table.add_row(vec![Cell::new("Backend"), Cell::new(backend.base_url())]);
    table.add_row(vec![
        Cell::new("Ready"),
        match &ready {
            Ok(true) => Cell::new("yes").fg(Color::Green),
            Ok(false) => Cell::new("no").fg(Color::Red),
            Err(err) => Cell::new(err).fg(Color::Red),
        },
    ]);
    table.add_row(vec![Cell::new("Version"), Cell::new(&version)]);
    table.add_row(vec![
        Cell::new("Questions"),
        match load_dataset(&config.dataset_path) {
            Ok(rows) => Cell::new(rows.len()),
            Err(err) => Cell::new(err).fg(Color::Red),
        },
    ]);
    table.add_row(vec![
        Cell::new("Policy segments"),
        match load_corpus(&config.corpus_path) {
            Ok(corpus) => Cell::new(corpus.document_count()),
            Err(err) => Cell::new(err).fg(Color::Yellow),
        },
    ]);
    table.add_row(vec![
        Cell::new("File upload"),
        Cell::new(if config.disable_file_upload { "disabled" } else { "enabled" }),
    ]);
    println!("{table}");
    Ok(if matches!(ready, Ok(true)) { 0 } else { 1 })
}

pub fn run_upload(config: &AppConfig, args: &UploadArgs) -> Result<i32> {
    let backend = connect(config)?;
    let reports = upload_documents(&backend, !config.disable_file_upload, &args.files)?;
    print_upload_reports(&reports);
    Ok(if reports.iter().all(|report| report.result.is_ok()) { 0 } else { 1 })
}

pub fn print_upload_reports(reports: &[UploadReport]) {
    for report in reports {
        match &report.result {
            Ok(_) => println!("{}  uploaded", report.path.display()),
            Err(err) => eprintln!("{}  failed: {err}", report.path.display()),
        }
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
