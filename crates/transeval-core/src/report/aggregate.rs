//! Cross-store comparison: one summary row per completed record store.

use crate::errors::StoreError;
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// A named store to aggregate, usually one per translation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSource {
    pub name: String,
    pub path: PathBuf,
}

impl StoreSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Name the store after its file stem (`dataset/gemini-2.5-pro.json` → `gemini-2.5-pro`).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

impl FromStr for StoreSource {
    type Err = String;

    /// Parse `NAME=PATH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH, got '{}'", s))?;
        if name.trim().is_empty() || path.trim().is_empty() {
            return Err(format!("expected NAME=PATH, got '{}'", s));
        }
        Ok(Self::new(name.trim(), path.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub samples: usize,
    pub avg_elapsed_seconds: f64,
    /// Mean score per scorer name; null and missing scores count as 0.
    pub avg_scores: BTreeMap<String, f64>,
}

fn summarize(name: &str, store: &RecordStore) -> SummaryRow {
    let samples = store.len();
    let mut total_time = 0.0;
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for rec in store.records() {
        total_time += rec.elapsed_seconds.unwrap_or(0.0);
        for (scorer, entry) in &rec.scores {
            *totals.entry(scorer.clone()).or_insert(0.0) += entry.score.unwrap_or(0.0);
        }
    }

    let mean = |total: f64| if samples == 0 { 0.0 } else { total / samples as f64 };
    SummaryRow {
        name: name.to_string(),
        samples,
        avg_elapsed_seconds: mean(total_time),
        avg_scores: totals.into_iter().map(|(k, v)| (k, mean(v))).collect(),
    }
}

/// Summarize each source in order. Missing files are skipped; a file that
/// exists but does not hold a record store is an error.
pub fn aggregate(sources: &[StoreSource]) -> Result<Vec<SummaryRow>, StoreError> {
    let mut rows = Vec::new();
    for src in sources {
        let store = match RecordStore::load(&src.path) {
            Ok(s) => s,
            Err(e) if e.is_not_found() => {
                info!(store = %src.name, path = %src.path.display(), "store not found, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };
        rows.push(summarize(&src.name, &store));
    }

    // Every row reports every scorer seen in any store.
    let columns: BTreeSet<String> = rows
        .iter()
        .flat_map(|r| r.avg_scores.keys().cloned())
        .collect();
    for row in &mut rows {
        for col in &columns {
            row.avg_scores.entry(col.clone()).or_insert(0.0);
        }
    }
    Ok(rows)
}

/// Scorer column names shared by `rows`, sorted.
pub fn scorer_columns(rows: &[SummaryRow]) -> Vec<String> {
    rows.first()
        .map(|r| r.avg_scores.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Record, ScoreEntry};
    use std::path::Path;
    use tempfile::tempdir;

    fn write_store(path: &Path, records: Vec<Record>) {
        RecordStore::new(records).save(path).unwrap();
    }

    fn scored(score: Option<f64>, secs: f64) -> Record {
        let mut r = Record::new("th", "en");
        r.set_prediction("p".into(), secs);
        let entry = match score {
            Some(s) => ScoreEntry::value(s),
            None => ScoreEntry::failed("timeout"),
        };
        r.upsert_score("LLM-as-a-judge", entry);
        r
    }

    #[test]
    fn null_scores_count_as_zero_over_all_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.json");
        write_store(
            &path,
            vec![scored(Some(0.2), 1.0), scored(Some(0.4), 2.0), scored(None, 3.0)],
        );

        let rows = aggregate(&[StoreSource::from_path(&path)]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "m");
        assert_eq!(rows[0].samples, 3);
        assert!((rows[0].avg_scores["LLM-as-a-judge"] - 0.2).abs() < 1e-9);
        assert!((rows[0].avg_elapsed_seconds - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_store_is_skipped() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("a.json");
        write_store(&present, vec![scored(Some(1.0), 0.5)]);

        let rows = aggregate(&[
            StoreSource::new("a", &present),
            StoreSource::new("b", dir.path().join("absent.json")),
        ])
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "a");
    }

    #[test]
    fn malformed_store_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        assert!(aggregate(&[StoreSource::from_path(&path)]).is_err());
    }

    #[test]
    fn empty_store_and_missing_scorers_report_zero() {
        let dir = tempdir().unwrap();
        let scored_path = dir.path().join("scored.json");
        let empty_path = dir.path().join("empty.json");
        write_store(&scored_path, vec![scored(Some(0.5), 1.0)]);
        write_store(&empty_path, vec![]);

        let rows = aggregate(&[
            StoreSource::from_path(&scored_path),
            StoreSource::from_path(&empty_path),
        ])
        .unwrap();
        assert_eq!(rows[1].samples, 0);
        assert_eq!(rows[1].avg_elapsed_seconds, 0.0);
        assert_eq!(rows[1].avg_scores["LLM-as-a-judge"], 0.0);
        assert_eq!(scorer_columns(&rows), vec!["LLM-as-a-judge".to_string()]);
    }

    #[test]
    fn parses_named_source() {
        let s: StoreSource = "gemma=dataset/gemma.json".parse().unwrap();
        assert_eq!(s, StoreSource::new("gemma", "dataset/gemma.json"));
        assert!("no-equals".parse::<StoreSource>().is_err());
    }
}
