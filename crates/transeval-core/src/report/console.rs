use crate::engine::PassReport;
use crate::report::progress::{ProgressEvent, ProgressSink};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Format a single progress line for display.
#[must_use]
pub fn format_progress_line(label: &str, done: usize, total: usize) -> String {
    format!("{} {}/{}...", label, done, total)
}

/// Minimum interval between progress updates to avoid log spam.
const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

/// For large stores, emit at most every this many records (10% step).
pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 10 {
        1
    } else {
        std::cmp::max(1, total / 10)
    }
}

/// Progress sink that throttles updates and prints to stderr.
/// Returns `None` for a single record. Always emits on `done == total`.
pub fn default_progress_sink(label: &str, total: usize) -> Option<ProgressSink> {
    if total <= 1 {
        return None;
    }
    let label = label.to_string();
    let step = progress_step(total);
    let last_emit: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
    Some(Arc::new(move |ev: ProgressEvent| {
        if ev.total == 0 {
            return;
        }
        let now = Instant::now();
        let should_emit = {
            let Ok(mut last) = last_emit.lock() else {
                return;
            };
            let emit_final = ev.done == ev.total;
            let emit_step = ev.done % step == 0 || ev.done == 1;
            let interval_ok = last
                .map(|t| {
                    now.saturating_duration_since(t)
                        >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
                })
                .unwrap_or(true);
            let ok = emit_final || (emit_step && interval_ok);
            if ok {
                *last = Some(now);
            }
            ok
        };
        if should_emit {
            eprintln!("{}", format_progress_line(&label, ev.done, ev.total));
        }
    }))
}

/// One-line summary printed to stderr at the end of a pass.
#[must_use]
pub fn format_pass_summary(label: &str, report: &PassReport) -> String {
    let mut line = format!(
        "{}: {} records in {:.1}s",
        label,
        report.processed,
        report.duration.as_secs_f64()
    );
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    line
}

pub fn print_pass_summary(label: &str, report: &PassReport) {
    eprintln!("{}", format_pass_summary(label, report));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_format() {
        assert_eq!(format_progress_line("Translating", 3, 10), "Translating 3/10...");
    }

    #[test]
    fn step_is_ten_percent_for_large_totals() {
        assert_eq!(progress_step(5), 1);
        assert_eq!(progress_step(200), 20);
    }

    #[test]
    fn single_record_has_no_sink() {
        assert!(default_progress_sink("Evaluating", 1).is_none());
        assert!(default_progress_sink("Evaluating", 2).is_some());
    }

    #[test]
    fn summary_mentions_failures_only_when_present() {
        let ok = PassReport {
            processed: 4,
            failed: 0,
            duration: Duration::from_millis(1500),
        };
        assert_eq!(format_pass_summary("translate", &ok), "translate: 4 records in 1.5s");

        let bad = PassReport { failed: 2, ..ok };
        assert!(format_pass_summary("translate", &bad).ends_with(", 2 failed"));
    }
}
