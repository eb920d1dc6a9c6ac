//! Time-bounded regex matching.
//!
//! Pack-supplied patterns are untrusted input to the match loop, and regex
//! evaluation is not cancellable mid-match. Each attempt therefore runs on
//! a dedicated worker thread; if the result does not arrive within the
//! budget the worker is abandoned (its channels dropped, a replacement
//! spawned) and the attempt counts as no match. The batch never stalls.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use pulse_core::types::SignalId;
use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::warn;

struct Job {
    regex: Arc<Regex>,
    text: String,
}

struct Worker {
    jobs: Sender<Job>,
    results: Receiver<bool>,
}

impl Worker {
    fn spawn() -> Self {
        let (jobs, job_rx) = unbounded::<Job>();
        let (result_tx, results) = unbounded::<bool>();
        thread::Builder::new()
            .name("pulse-matcher".into())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let matched = job.regex.is_match(&job.text);
                    if result_tx.send(matched).is_err() {
                        // Matcher abandoned us after a timeout.
                        break;
                    }
                }
            })
            .expect("failed to spawn matcher thread");
        Self { jobs, results }
    }
}

/// Regex matcher with a hard per-attempt timeout.
pub struct BoundedMatcher {
    timeout: Duration,
    worker: Option<Worker>,
    /// Patterns that already logged a timeout; one log line per pattern,
    /// not one per fact.
    timed_out: FxHashSet<SignalId>,
}

impl BoundedMatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            worker: None,
            timed_out: FxHashSet::default(),
        }
    }

    /// Attempt a match within the budget. Timeout means "no match".
    pub fn is_match(&mut self, signal: &SignalId, regex: &Arc<Regex>, text: &str) -> bool {
        let worker = self.worker.get_or_insert_with(Worker::spawn);

        if worker
            .jobs
            .send(Job {
                regex: Arc::clone(regex),
                text: text.to_string(),
            })
            .is_err()
        {
            // Worker thread died; replace it and skip this attempt.
            self.worker = Some(Worker::spawn());
            return false;
        }

        match worker.results.recv_timeout(self.timeout) {
            Ok(matched) => matched,
            Err(RecvTimeoutError::Timeout) => {
                // Abandon the stuck worker; its send will fail and it will
                // exit whenever the match finally finishes.
                self.worker = None;
                if self.timed_out.insert(signal.clone()) {
                    warn!(
                        signal = %signal,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "pattern match timed out; treating as no match"
                    );
                }
                false
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.worker = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex(pattern: &str) -> Arc<Regex> {
        Arc::new(Regex::new(pattern).unwrap())
    }

    #[test]
    fn test_match_within_budget() {
        let mut matcher = BoundedMatcher::new(Duration::from_millis(100));
        let signal = SignalId::new("momentum.funding_round");
        assert!(matcher.is_match(&signal, &regex("series [a-e]"), "raised series b"));
        assert!(!matcher.is_match(&signal, &regex("series [a-e]"), "nothing here"));
    }

    #[test]
    fn test_worker_survives_many_attempts() {
        let mut matcher = BoundedMatcher::new(Duration::from_millis(100));
        let signal = SignalId::new("momentum.funding_round");
        let re = regex("x");
        for i in 0..100 {
            let text = if i % 2 == 0 { "x" } else { "y" };
            assert_eq!(matcher.is_match(&signal, &re, text), i % 2 == 0);
        }
    }

    #[test]
    fn test_timeout_counts_as_no_match_and_recovers() {
        // A zero timeout forces the timeout path deterministically without
        // needing a pathological pattern.
        let mut matcher = BoundedMatcher::new(Duration::from_nanos(1));
        let signal = SignalId::new("momentum.funding_round");
        let big_text = "x".repeat(1 << 20);
        assert!(!matcher.is_match(&signal, &regex("y"), &big_text));

        // A fresh budget on the replaced worker still matches.
        matcher.timeout = Duration::from_millis(500);
        assert!(matcher.is_match(&signal, &regex("x"), "x"));
    }
}
