use super::super::args::{Backend, TranslateArgs};
use super::{provider_config, seconds};
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use transeval_core::engine::{BatchRunner, RunnerConfig};
use transeval_core::providers::{build_client, ProviderKind};
use transeval_core::report::console::{default_progress_sink, print_pass_summary};
use transeval_core::translate::{EchoTranslator, Glossary, LlmTranslator, TranslationPrompt, Translator};
use transeval_core::RecordStore;

/// Default output location for a model's predictions.
pub(crate) fn default_output_path(model: &str) -> PathBuf {
    PathBuf::from("dataset").join(format!("{}.json", model.replace('/', "_")))
}

fn build_translator(args: &TranslateArgs, model: &str) -> anyhow::Result<Arc<dyn Translator>> {
    let kind = match args.backend {
        Backend::Echo => return Ok(Arc::new(EchoTranslator)),
        Backend::Openai => ProviderKind::OpenAi,
        Backend::Local => ProviderKind::Local,
        Backend::Gemini => ProviderKind::Gemini,
    };

    let mut cfg = provider_config(&args.provider);
    if let Some(url) = &args.base_url {
        cfg = match kind {
            ProviderKind::OpenAi => cfg.with_openai_base_url(url),
            ProviderKind::Local => cfg.with_local_base_url(url),
            ProviderKind::Gemini => cfg.with_gemini_base_url(url),
        };
    }
    let client = build_client(kind, model, &cfg)?;

    let glossary = match &args.glossary {
        Some(path) => Glossary::load(path)?,
        None => Glossary::default(),
    };

    // Chat-completions backends run deterministic with a bounded reply.
    let (temperature, max_tokens) = match kind {
        ProviderKind::Gemini => (args.temperature, args.max_tokens),
        ProviderKind::OpenAi | ProviderKind::Local => (
            Some(args.temperature.unwrap_or(0.0)),
            Some(args.max_tokens.unwrap_or(1000)),
        ),
    };

    Ok(Arc::new(
        LlmTranslator::new(model, client, TranslationPrompt::new(glossary))
            .with_temperature(temperature)
            .with_max_tokens(max_tokens),
    ))
}

pub async fn run(args: TranslateArgs) -> anyhow::Result<i32> {
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| args.backend.default_model().to_string());
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&model));
    let pause = seconds("pause", args.pause)?;

    let mut store = RecordStore::load(&args.input)
        .with_context(|| format!("cannot load input store {}", args.input.display()))?;
    let translator = build_translator(&args, &model)?;

    tracing::info!(
        input = %args.input.display(),
        output = %output.display(),
        model = %model,
        records = store.len(),
        "translate"
    );

    let runner = BatchRunner::new(RunnerConfig {
        pause,
        concurrency: args.runner.concurrency,
        checkpoint_every: args.runner.checkpoint_every,
    })
    .with_checkpoint(&output)
    .with_progress(default_progress_sink("Translating", store.len()));

    let report = runner.translate(&mut store, translator).await?;
    print_pass_summary("translate", &report);
    eprintln!("Results saved to: {}", output.display());
    Ok(SUCCESS)
}
