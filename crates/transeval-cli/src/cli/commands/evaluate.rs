use super::super::args::{EvaluateArgs, JudgeProvider};
use super::{provider_config, seconds};
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use std::sync::Arc;
use transeval_core::engine::{BatchRunner, RunnerConfig};
use transeval_core::judge::JudgeScorer;
use transeval_core::metrics_api::Scorer;
use transeval_core::providers::{build_client, ProviderKind};
use transeval_core::report::console::{default_progress_sink, print_pass_summary};
use transeval_core::RecordStore;

pub async fn run(args: EvaluateArgs) -> anyhow::Result<i32> {
    let pause = seconds("sleep", args.sleep)?;
    let mut store = RecordStore::load(&args.file_path)
        .with_context(|| format!("cannot load store {}", args.file_path.display()))?;

    let (kind, model) = match args.provider {
        JudgeProvider::Gemini => (ProviderKind::Gemini, args.gemini_model.as_str()),
        JudgeProvider::Openai => (ProviderKind::OpenAi, args.openai_model.as_str()),
    };
    let client = build_client(kind, model, &provider_config(&args.provider_args))?;

    let mut scorers: Vec<Arc<dyn Scorer>> = vec![Arc::new(JudgeScorer::new(client))];
    scorers.extend(transeval_metrics::default_scorers());

    tracing::info!(
        store = %args.file_path.display(),
        judge = %kind,
        model,
        records = store.len(),
        "evaluate"
    );

    let runner = BatchRunner::new(RunnerConfig {
        pause,
        concurrency: args.runner.concurrency,
        checkpoint_every: args.runner.checkpoint_every,
    })
    .with_checkpoint(&args.file_path)
    .with_progress(default_progress_sink("Evaluating", store.len()));

    let report = runner.evaluate(&mut store, &scorers).await?;
    print_pass_summary("evaluate", &report);
    eprintln!("Evaluation saved to: {}", args.file_path.display());
    Ok(SUCCESS)
}
