//! Command-line arguments for `policy-qa`.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use pqa_cli::config::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "policy-qa",
    version,
    about = "Ask questions about a privacy policy",
    long_about = "Ask questions about a privacy policy.\n\n\
                  Questions are answered by a semantic-search backend that indexes\n\
                  the policy at startup. Answers are shown in their context with\n\
                  the answer span marked and the source document cited."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow question text in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Configuration sources layered over the config file.
#[derive(Args)]
pub struct SettingsArgs {
    /// Config file (default: the platform config folder's policy-qa/config.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the search backend.
    #[arg(long = "api-endpoint", env = "API_ENDPOINT", value_name = "URL", global = true)]
    pub api_endpoint: Option<String>,

    /// Semicolon-separated file with 'Question Text' and 'Answer' columns.
    #[arg(long = "dataset", env = "EVAL_FILE", value_name = "PATH", global = true)]
    pub dataset: Option<PathBuf>,

    /// Policy corpus JSON indexed at startup.
    #[arg(long = "corpus", env = "CORPUS_FILE", value_name = "PATH", global = true)]
    pub corpus: Option<PathBuf>,

    /// Question shown when the session starts.
    #[arg(long = "default-question", env = "DEFAULT_QUESTION_AT_STARTUP", global = true)]
    pub default_question: Option<String>,

    /// Answer label paired with the default question.
    #[arg(long = "default-answer", env = "DEFAULT_ANSWER_AT_STARTUP", global = true)]
    pub default_answer: Option<String>,

    /// Initial max. number of documents from the retriever.
    #[arg(long = "docs-from-retriever", env = "DEFAULT_DOCS_FROM_RETRIEVER", global = true)]
    pub docs_from_retriever: Option<u32>,

    /// Initial max. number of answers.
    #[arg(long = "number-of-answers", env = "DEFAULT_NUMBER_OF_ANSWERS", global = true)]
    pub number_of_answers: Option<u32>,

    /// Hide and refuse document upload (any non-falsey env value enables it).
    #[arg(
        long = "disable-file-upload",
        env = "DISABLE_FILE_UPLOAD",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        global = true
    )]
    pub disable_file_upload: bool,

    /// Backend request timeout in seconds.
    #[arg(long = "request-timeout", value_name = "SECONDS", global = true)]
    pub request_timeout: Option<u64>,
}

impl SettingsArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            default_question: self.default_question.clone(),
            default_answer: self.default_answer.clone(),
            default_docs_from_retriever: self.docs_from_retriever,
            default_number_of_answers: self.number_of_answers,
            disable_file_upload: self.disable_file_upload.then_some(true),
            api_endpoint: self.api_endpoint.clone(),
            dataset_path: self.dataset.clone(),
            corpus_path: self.corpus.clone(),
            request_timeout_secs: self.request_timeout,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the interactive front end.
    Ask,

    /// Ask a single question and print the results.
    Query(QueryArgs),

    /// Show backend readiness, version and loaded data.
    Status,

    /// Upload documents to the backend store.
    Upload(UploadArgs),
}

#[derive(Args)]
pub struct QueryArgs {
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Max. number of answers (1-10).
    #[arg(long = "answers")]
    pub answers: Option<u32>,

    /// Max. number of documents from the retriever.
    #[arg(long = "documents")]
    pub documents: Option<u32>,

    /// Also print the raw backend response.
    #[arg(long = "raw")]
    pub raw: bool,
}

#[derive(Args)]
pub struct UploadArgs {
    /// Files to upload (pdf, txt, docx).
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
