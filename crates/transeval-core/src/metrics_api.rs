use crate::model::{Record, ScoreEntry};
use async_trait::async_trait;

/// A quality scorer for one record.
///
/// Scoring never fails: a scorer that cannot produce a number returns
/// [`ScoreEntry::failed`] with the reason.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Key under which the entry is stored in the record's `metric` map.
    fn name(&self) -> &'static str;
    async fn score(&self, record: &Record) -> ScoreEntry;
}
