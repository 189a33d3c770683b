use crate::telemetry::LogFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use transeval_core::report::StoreSource;

#[derive(Parser)]
#[command(
    name = "transeval",
    version,
    about = "Batch Thai-to-English translation and evaluation over JSON record stores"
)]
pub struct Cli {
    /// Log line format (stderr)
    #[arg(long, global = true, value_enum, default_value_t, env = "TRANSEVAL_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Translate every record of a store with one backend
    Translate(TranslateArgs),
    /// Score every record of a translated store in place
    Evaluate(EvaluateArgs),
    /// Compare completed stores in one table
    Stats(StatsArgs),
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Hosted chat-completions API (OPENAI_API_KEY)
    Openai,
    /// Local chat-completions server (llama.cpp, LM Studio)
    Local,
    /// Gemini generateContent API (GOOGLE_API_KEY)
    Gemini,
    /// Offline: prediction is "ECHO:" + source
    Echo,
}

impl Backend {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Openai => "gpt-4o",
            Self::Local => "gemma-3-4b-it",
            Self::Gemini => "gemini-2.5-pro",
            Self::Echo => "echo",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JudgeProvider {
    #[default]
    Gemini,
    Openai,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StatsFormat {
    #[default]
    Markdown,
    Json,
}

/// Provider connection settings shared by commands that call a service.
#[derive(clap::Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Retries for transient provider failures (default: none)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Per-request timeout in seconds (default: none)
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,
}

/// Batch runner settings shared by translate and evaluate.
#[derive(clap::Args, Debug, Clone)]
pub struct RunnerArgs {
    /// Records processed concurrently (1 = sequential)
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Save the store every N completed records (0 = only at the end)
    #[arg(long, default_value_t = 0)]
    pub checkpoint_every: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct TranslateArgs {
    /// Input record store (JSON array)
    #[arg(long, default_value = "dataset/evaluation.json")]
    pub input: PathBuf,

    /// Output store (default: dataset/<model>.json, '/' in the model name replaced by '_')
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub backend: Backend,

    /// Model name sent to the backend (default depends on backend)
    #[arg(long)]
    pub model: Option<String>,

    /// Override the backend base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// JSON object of fixed Thai -> English terms added to the system prompt
    #[arg(long)]
    pub glossary: Option<PathBuf>,

    /// Sampling temperature (chat-completions backends default to 0.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Response token limit (chat-completions backends default to 1000)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Seconds to sleep after each record
    #[arg(long, default_value_t = 0.0)]
    pub pause: f64,

    #[command(flatten)]
    pub runner: RunnerArgs,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Translated record store, updated in place
    #[arg(long = "file-path", alias = "file_path")]
    pub file_path: PathBuf,

    /// Judge provider
    #[arg(long, value_enum, default_value_t)]
    pub provider: JudgeProvider,

    #[arg(long, default_value = "gpt-4o")]
    pub openai_model: String,

    #[arg(long, default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Seconds to sleep after each record (rate limiting)
    #[arg(long, default_value_t = 1.0)]
    pub sleep: f64,

    #[command(flatten)]
    pub runner: RunnerArgs,

    #[command(flatten)]
    pub provider_args: ProviderArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    /// Named store, NAME=PATH (repeatable)
    #[arg(long = "store", value_name = "NAME=PATH")]
    pub stores: Vec<StoreSource>,

    /// Store paths named after their file stem
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: StatsFormat,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}
