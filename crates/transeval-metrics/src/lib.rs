use std::sync::Arc;

use transeval_core::metrics_api::Scorer;

pub mod bleu;

pub use bleu::{sentence_bleu, tokenize_13a, BleuScorer, BLEU_SCORER_NAME};

/// Scorers that need no external service.
pub fn default_scorers() -> Vec<Arc<dyn Scorer>> {
    vec![Arc::new(BleuScorer)]
}
