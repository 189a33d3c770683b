//! Sentence-level BLEU, compatible with sacreBLEU's default settings:
//! `13a` tokenization, orders 1 to 4, `exp` smoothing and effective order.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use transeval_core::metrics_api::Scorer;
use transeval_core::model::{Record, ScoreEntry};

pub const BLEU_SCORER_NAME: &str = "BLEU";

const MAX_NGRAM_ORDER: usize = 4;

struct Rules13a {
    symbols: Regex,
    period_comma_after: Regex,
    period_comma_before: Regex,
    dash_after_digit: Regex,
}

fn rules() -> &'static Rules13a {
    static RULES: OnceLock<Rules13a> = OnceLock::new();
    RULES.get_or_init(|| Rules13a {
        symbols: Regex::new(r"([\{-~\[-` -&\(-\+:-@/])").expect("valid 13a symbol pattern"),
        period_comma_after: Regex::new(r"([^0-9])([\.,])").expect("valid 13a pattern"),
        period_comma_before: Regex::new(r"([\.,])([^0-9])").expect("valid 13a pattern"),
        dash_after_digit: Regex::new(r"([0-9])(-)").expect("valid 13a pattern"),
    })
}

/// mteval-v13a tokenization.
pub fn tokenize_13a(line: &str) -> String {
    let mut line = line.replace("<skipped>", "").replace("-\n", "").replace('\n', " ");
    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let r = rules();
    let line = format!(" {} ", line);
    let line = r.symbols.replace_all(&line, " ${1} ");
    let line = r.period_comma_after.replace_all(&line, "${1} ${2} ");
    let line = r.period_comma_before.replace_all(&line, " ${1} ${2}");
    let line = r.dash_after_digit.replace_all(&line, "${1} ${2} ");
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ngram_counts<'a>(tokens: &'a [&'a str], n: usize) -> HashMap<&'a [&'a str], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// BLEU of `hypothesis` against a single `reference`, on the 0–100 scale.
pub fn sentence_bleu_raw(hypothesis: &str, reference: &str) -> f64 {
    let hyp_line = tokenize_13a(hypothesis);
    let ref_line = tokenize_13a(reference);
    let hyp: Vec<&str> = hyp_line.split(' ').filter(|t| !t.is_empty()).collect();
    let reference: Vec<&str> = ref_line.split(' ').filter(|t| !t.is_empty()).collect();

    if hyp.is_empty() {
        return if reference.is_empty() { 100.0 } else { 0.0 };
    }

    let mut precisions = [0.0f64; MAX_NGRAM_ORDER];
    let mut effective_order = 0;
    let mut smooth = 1.0;

    for n in 1..=MAX_NGRAM_ORDER {
        let hyp_counts = ngram_counts(&hyp, n);
        let total: usize = hyp_counts.values().sum();
        if total == 0 {
            break;
        }
        let ref_counts = ngram_counts(&reference, n);
        let correct: usize = hyp_counts
            .iter()
            .map(|(gram, count)| (*count).min(ref_counts.get(gram).copied().unwrap_or(0)))
            .sum();

        effective_order = n;
        precisions[n - 1] = if correct == 0 {
            smooth *= 2.0;
            100.0 / (smooth * total as f64)
        } else {
            100.0 * correct as f64 / total as f64
        };
    }

    let log_mean = precisions[..effective_order]
        .iter()
        .map(|p| p.ln())
        .sum::<f64>()
        / effective_order as f64;

    let (sys_len, ref_len) = (hyp.len() as f64, reference.len() as f64);
    let brevity_penalty = if sys_len < ref_len {
        (1.0 - ref_len / sys_len).exp()
    } else {
        1.0
    };

    brevity_penalty * log_mean.exp()
}

/// BLEU in `[0, 1]`.
pub fn sentence_bleu(hypothesis: &str, reference: &str) -> f64 {
    (sentence_bleu_raw(hypothesis, reference) / 100.0).clamp(0.0, 1.0)
}

/// Lexical overlap between prediction and reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct BleuScorer;

#[async_trait]
impl Scorer for BleuScorer {
    fn name(&self) -> &'static str {
        BLEU_SCORER_NAME
    }

    async fn score(&self, record: &Record) -> ScoreEntry {
        match record.predicted_text.as_deref() {
            Some(pred) => ScoreEntry::value(sentence_bleu(pred, record.reference_text())),
            None => ScoreEntry::failed("record has no prediction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_splits_punctuation_but_keeps_numbers() {
        assert_eq!(tokenize_13a("Hello, world."), "Hello , world .");
        assert_eq!(tokenize_13a("3.5-4 km"), "3.5 - 4 km");
        assert_eq!(tokenize_13a("&quot;durian&quot; (Monthong)"), "\" durian \" ( Monthong )");
        assert_eq!(tokenize_13a("1,000 trees"), "1,000 trees");
    }

    #[test]
    fn identical_strings_score_one() {
        for s in [
            "Durian",
            "When does the durian flower?",
            "How should I treat sooty mold on durian leaves?",
        ] {
            assert!((sentence_bleu(s, s) - 1.0).abs() < 1e-12, "{s}");
        }
    }

    #[test]
    fn partial_overlap_matches_reference_value() {
        let score = sentence_bleu("the cat sat on the mat", "the cat sat on a mat");
        assert!((score - 0.537_285).abs() < 1e-5, "got {score}");
    }

    #[test]
    fn no_overlap_is_smoothed_and_penalized() {
        let score = sentence_bleu("cats sleep", "the quick brown fox");
        assert!((score - 0.091_970).abs() < 1e-5, "got {score}");
    }

    #[test]
    fn empty_hypothesis() {
        assert_eq!(sentence_bleu("", "reference text"), 0.0);
        assert_eq!(sentence_bleu("  ", ""), 1.0);
    }

    #[test]
    fn always_in_unit_range() {
        let pairs = [
            ("a a a a a a", "a"),
            ("[ERROR] network error: timeout", "Durian flowering stage"),
            ("x", ""),
        ];
        for (h, r) in pairs {
            let s = sentence_bleu(h, r);
            assert!((0.0..=1.0).contains(&s), "{h} / {r} -> {s}");
        }
    }

    #[tokio::test]
    async fn scorer_writes_score_only_entry() {
        let mut rec = Record::new("ทุเรียน", "durian");
        rec.set_prediction("durian".into(), 0.1);
        let entry = BleuScorer.score(&rec).await;
        assert_eq!(entry, ScoreEntry::value(1.0));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"score": 1.0})
        );
    }

    #[tokio::test]
    async fn missing_prediction_is_null() {
        let entry = BleuScorer.score(&Record::new("a", "b")).await;
        assert!(entry.is_failed());
    }
}
