use crate::metrics_api::Scorer;
use crate::model::{Record, ScoreEntry};
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::store::RecordStore;
use crate::translate::{is_error_prediction, Translator};
use anyhow::Context;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Sleep after each record, holding its concurrency slot.
    pub pause: Duration,
    /// Records in flight at once; 1 is strictly sequential.
    pub concurrency: usize,
    /// Save the store after this many completed records. 0 saves only at the end.
    pub checkpoint_every: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pause: Duration::ZERO,
            concurrency: 1,
            checkpoint_every: 0,
        }
    }
}

/// Outcome of one pass over a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    pub processed: usize,
    /// Records with an error-marker prediction or at least one null score.
    pub failed: usize,
    pub duration: Duration,
}

pub struct BatchRunner {
    config: RunnerConfig,
    checkpoint: Option<PathBuf>,
    progress: Option<ProgressSink>,
}

impl BatchRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            checkpoint: None,
            progress: None,
        }
    }

    /// Persist the store at `path` during and after each pass.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Translate every record, overwriting its prediction and elapsed time.
    pub async fn translate(
        &self,
        store: &mut RecordStore,
        translator: Arc<dyn Translator>,
    ) -> anyhow::Result<PassReport> {
        info!(backend = translator.name(), records = store.len(), "translation pass started");
        let report = self
            .run_pass(
                store,
                |_, record| {
                    let translator = translator.clone();
                    let source = record.source_text().to_string();
                    async move {
                        let started = Instant::now();
                        let text = translator.translate(&source).await;
                        (text, started.elapsed().as_secs_f64())
                    }
                },
                |idx, record, (text, elapsed)| {
                    let failed = is_error_prediction(&text);
                    if failed {
                        warn!(record = idx, prediction = %text, "translation failed");
                    } else {
                        debug!(record = idx, elapsed_seconds = elapsed, "translated");
                    }
                    record.set_prediction(text, elapsed);
                    failed
                },
            )
            .await?;
        info!(
            processed = report.processed,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "translation pass finished"
        );
        Ok(report)
    }

    /// Run every scorer on every record and upsert the entries by scorer name.
    pub async fn evaluate(
        &self,
        store: &mut RecordStore,
        scorers: &[Arc<dyn Scorer>],
    ) -> anyhow::Result<PassReport> {
        let names: Vec<&str> = scorers.iter().map(|s| s.name()).collect();
        info!(scorers = ?names, records = store.len(), "evaluation pass started");
        let report = self
            .run_pass(
                store,
                |_, record| {
                    let scorers = scorers.to_vec();
                    let record = record.clone();
                    async move {
                        let mut entries: Vec<(&'static str, ScoreEntry)> = Vec::new();
                        for scorer in &scorers {
                            entries.push((scorer.name(), scorer.score(&record).await));
                        }
                        entries
                    }
                },
                |idx, record, entries| {
                    let mut failed = false;
                    for (name, entry) in entries {
                        if entry.is_failed() {
                            failed = true;
                            warn!(
                                record = idx,
                                scorer = name,
                                reason = entry.explanation.as_deref().unwrap_or(""),
                                "scorer failed"
                            );
                        } else {
                            debug!(record = idx, scorer = name, score = entry.score, "scored");
                        }
                        record.upsert_score(name, entry);
                    }
                    failed
                },
            )
            .await?;
        info!(
            processed = report.processed,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "evaluation pass finished"
        );
        Ok(report)
    }

    /// Spawn one task per record (bounded by the semaphore), merge results
    /// back by index as they complete, and checkpoint along the way.
    async fn run_pass<T, F, Fut, A>(
        &self,
        store: &mut RecordStore,
        mut make_task: F,
        mut apply: A,
    ) -> anyhow::Result<PassReport>
    where
        T: Send + 'static,
        F: FnMut(usize, &Record) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        A: FnMut(usize, &mut Record, T) -> bool,
    {
        let started = Instant::now();
        let total = store.len();
        let pause = self.config.pause;
        let sem = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut join_set: JoinSet<(usize, T)> = JoinSet::new();

        let mut next = 0;
        let mut done = 0;
        let mut failed = 0;

        loop {
            tokio::select! {
                biased;

                Some(res) = join_set.join_next(), if !join_set.is_empty() => {
                    done += 1;
                    match res {
                        Ok((idx, out)) => {
                            if apply(idx, &mut store.records_mut()[idx], out) {
                                failed += 1;
                            }
                        }
                        Err(e) => {
                            failed += 1;
                            error!(error = %e, "record task did not complete");
                        }
                    }
                    if let Some(sink) = &self.progress {
                        sink(ProgressEvent { done, total });
                    }
                    if self.config.checkpoint_every > 0
                        && done % self.config.checkpoint_every == 0
                        && done < total
                    {
                        self.save_checkpoint(store)?;
                    }
                }

                permit = sem.clone().acquire_owned(), if next < total => {
                    let permit = permit.context("runner semaphore closed")?;
                    let idx = next;
                    next += 1;
                    let fut = make_task(idx, &store.records()[idx]);
                    join_set.spawn(async move {
                        let _permit = permit;
                        let out = fut.await;
                        if !pause.is_zero() {
                            tokio::time::sleep(pause).await;
                        }
                        (idx, out)
                    });
                }

                else => break,
            }
        }

        self.save_checkpoint(store)?;

        Ok(PassReport {
            processed: done,
            failed,
            duration: started.elapsed(),
        })
    }

    fn save_checkpoint(&self, store: &RecordStore) -> anyhow::Result<()> {
        if let Some(path) = &self.checkpoint {
            store
                .save(path)
                .with_context(|| format!("failed to save records to {}", path.display()))?;
            debug!(path = %path.display(), "records saved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{EchoTranslator, ERROR_MARKER};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn store(sources: &[&str]) -> RecordStore {
        RecordStore::new(sources.iter().map(|s| Record::new(*s, "ref")).collect())
    }

    /// Later records finish first.
    struct SlowFirst;

    #[async_trait]
    impl Translator for SlowFirst {
        fn name(&self) -> &str {
            "slow-first"
        }
        async fn translate(&self, source_text: &str) -> String {
            let delay = 40u64.saturating_sub(source_text.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            source_text.to_uppercase()
        }
    }

    struct FailOn(&'static str);

    #[async_trait]
    impl Translator for FailOn {
        fn name(&self) -> &str {
            "fail-on"
        }
        async fn translate(&self, source_text: &str) -> String {
            if source_text == self.0 {
                format!("{} backend unavailable", ERROR_MARKER)
            } else {
                source_text.to_string()
            }
        }
    }

    /// Records how many saved predictions the checkpoint held when each record started.
    struct CheckpointProbe {
        path: PathBuf,
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Translator for CheckpointProbe {
        fn name(&self) -> &str {
            "probe"
        }
        async fn translate(&self, source_text: &str) -> String {
            let saved = RecordStore::load(&self.path)
                .map(|s| {
                    s.records()
                        .iter()
                        .filter(|r| r.predicted_text.is_some())
                        .count()
                })
                .unwrap_or(0);
            self.seen.lock().unwrap().push(saved);
            source_text.to_string()
        }
    }

    struct FixedScorer {
        name: &'static str,
        score: Option<f64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Scorer for FixedScorer {
        fn name(&self) -> &'static str {
            self.name
        }
        async fn score(&self, _record: &Record) -> ScoreEntry {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.score {
                Some(s) => ScoreEntry::value(s),
                None => ScoreEntry::failed("no verdict"),
            }
        }
    }

    #[tokio::test]
    async fn echo_pass_fills_every_record_in_order() {
        let mut s = store(&["หนึ่ง", "สอง", "สาม"]);
        let report = BatchRunner::new(RunnerConfig::default())
            .translate(&mut s, Arc::new(EchoTranslator))
            .await
            .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 0);
        let preds: Vec<_> = s
            .records()
            .iter()
            .map(|r| r.predicted_text.clone().unwrap())
            .collect();
        assert_eq!(preds, vec!["ECHO:หนึ่ง", "ECHO:สอง", "ECHO:สาม"]);
        assert!(s.records().iter().all(|r| r.elapsed_seconds.unwrap() >= 0.0));
    }

    #[tokio::test]
    async fn concurrent_pass_merges_by_index() {
        let mut s = store(&["a", "bb", "ccc", "dddd"]);
        let cfg = RunnerConfig {
            concurrency: 4,
            ..RunnerConfig::default()
        };
        BatchRunner::new(cfg)
            .translate(&mut s, Arc::new(SlowFirst))
            .await
            .unwrap();

        let preds: Vec<_> = s
            .records()
            .iter()
            .map(|r| r.predicted_text.clone().unwrap())
            .collect();
        assert_eq!(preds, vec!["A", "BB", "CCC", "DDDD"]);
    }

    #[tokio::test]
    async fn failed_records_are_counted_and_kept() {
        let mut s = store(&["ok", "bad", "fine"]);
        let report = BatchRunner::new(RunnerConfig::default())
            .translate(&mut s, Arc::new(FailOn("bad")))
            .await
            .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 1);
        assert!(s.records()[1]
            .predicted_text
            .as_deref()
            .unwrap()
            .starts_with(ERROR_MARKER));
        assert_eq!(s.records()[2].predicted_text.as_deref(), Some("fine"));
    }

    #[tokio::test]
    async fn checkpoints_during_pass_and_saves_at_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let probe = Arc::new(CheckpointProbe {
            path: path.clone(),
            seen: Mutex::new(Vec::new()),
        });
        let mut s = store(&["a", "b", "c", "d", "e"]);
        let cfg = RunnerConfig {
            checkpoint_every: 2,
            ..RunnerConfig::default()
        };

        BatchRunner::new(cfg)
            .with_checkpoint(&path)
            .translate(&mut s, probe.clone())
            .await
            .unwrap();

        assert_eq!(*probe.seen.lock().unwrap(), vec![0, 0, 2, 2, 4]);
        let saved = RecordStore::load(&path).unwrap();
        assert!(saved.records().iter().all(|r| r.predicted_text.is_some()));
    }

    #[tokio::test]
    async fn end_only_persistence_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let probe = Arc::new(CheckpointProbe {
            path: path.clone(),
            seen: Mutex::new(Vec::new()),
        });
        let mut s = store(&["a", "b", "c"]);

        BatchRunner::new(RunnerConfig::default())
            .with_checkpoint(&path)
            .translate(&mut s, probe.clone())
            .await
            .unwrap();

        assert_eq!(*probe.seen.lock().unwrap(), vec![0, 0, 0]);
        assert_eq!(RecordStore::load(&path).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn evaluate_upserts_each_scorer_and_counts_null_scores() {
        let mut s = store(&["a", "b"]);
        s.records_mut()[0].upsert_score("Existing", ScoreEntry::value(0.9));
        let good = Arc::new(FixedScorer {
            name: "BLEU",
            score: Some(0.5),
            calls: AtomicUsize::new(0),
        });
        let bad = Arc::new(FixedScorer {
            name: "LLM-as-a-judge",
            score: None,
            calls: AtomicUsize::new(0),
        });
        let scorers: Vec<Arc<dyn Scorer>> = vec![good.clone(), bad];

        let report = BatchRunner::new(RunnerConfig::default())
            .evaluate(&mut s, &scorers)
            .await
            .unwrap();

        assert_eq!(good.calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.failed, 2);
        let first = &s.records()[0];
        assert_eq!(first.score("BLEU"), Some(0.5));
        assert!(first.scores["LLM-as-a-judge"].is_failed());
        assert_eq!(first.score("Existing"), Some(0.9));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_follows_each_record() {
        let mut s = store(&["a", "b", "c"]);
        let cfg = RunnerConfig {
            pause: Duration::from_secs(1),
            ..RunnerConfig::default()
        };
        let report = BatchRunner::new(cfg)
            .translate(&mut s, Arc::new(EchoTranslator))
            .await
            .unwrap();

        assert!(report.duration >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn progress_reports_each_completion() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = events.clone();
        let sink: ProgressSink = Arc::new(move |ev: ProgressEvent| sink_events.lock().unwrap().push(ev));
        let mut s = store(&["a", "b"]);

        BatchRunner::new(RunnerConfig::default())
            .with_progress(Some(sink))
            .translate(&mut s, Arc::new(EchoTranslator))
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ProgressEvent { done: 2, total: 2 });
    }
}
