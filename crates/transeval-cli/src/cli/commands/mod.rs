use super::args::*;
use crate::exit_codes::SUCCESS;
use std::time::Duration;
use transeval_core::ProviderConfig;

pub mod evaluate;
pub mod stats;
pub mod translate;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Translate(args) => translate::run(args).await,
        Command::Evaluate(args) => evaluate::run(args).await,
        Command::Stats(args) => stats::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Environment configuration with command-line overrides applied.
pub(crate) fn provider_config(args: &ProviderArgs) -> ProviderConfig {
    let mut cfg = ProviderConfig::from_env();
    if let Some(retries) = args.max_retries {
        cfg = cfg.with_max_retries(retries);
    }
    if let Some(secs) = args.timeout_secs {
        cfg = cfg.with_timeout_secs(secs);
    }
    cfg
}

pub(crate) fn seconds(flag: &str, secs: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| anyhow::anyhow!("--{} must be a non-negative number of seconds, got {}", flag, secs))
}
