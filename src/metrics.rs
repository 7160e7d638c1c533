//! Metrics describing the evolution of the training process.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reason a training run terminated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// The merge budget derived from the target vocabulary size was used up,
    /// including the case where the budget was zero to begin with.
    TargetVocabReached,
    /// The configured maximum merge iterations was reached.
    MaxIterationsReached,
    /// No word had two adjacent symbols left.
    NoPairsRemaining,
    /// The most frequent pair occurred fewer than `min_frequency` times.
    BelowMinFrequency,
}

/// Metrics captured for each merge iteration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationMetrics {
    /// Sequential iteration number (1-indexed).
    pub iteration: usize,
    /// The merged pair as `(first, second)` symbols.
    pub pair: (String, String),
    /// Occurrence count of the merged pair.
    pub frequency: usize,
    /// Number of replacements performed across the corpus.
    pub merges_applied: usize,
    /// Count of distinct pairs seen while selecting this merge.
    pub distinct_pairs: usize,
    /// Execution time for the iteration.
    pub elapsed_iteration: Duration,
    /// Total time elapsed since training started.
    pub elapsed_total: Duration,
    /// Resident set size sample captured from `/proc/self/status` on Linux.
    pub rss_kb: Option<usize>,
}

/// Aggregate metrics produced by a training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Number of corpus texts that survived filtering.
    pub words: usize,
    /// Number of corpus texts dropped because nothing trainable remained.
    pub discarded_texts: usize,
    /// Per-iteration snapshots accrued during training.
    pub iterations: Vec<IterationMetrics>,
    /// Total duration of the training session.
    pub total_duration: Duration,
    /// Reason training terminated.
    pub stop_reason: StopReason,
}

impl TrainingMetrics {
    /// Creates an empty metrics container with pre-allocated capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: 0,
            discarded_texts: 0,
            iterations: Vec::with_capacity(capacity),
            total_duration: Duration::ZERO,
            stop_reason: StopReason::TargetVocabReached,
        }
    }

    /// Number of merges recorded by the run.
    #[must_use]
    pub fn merges(&self) -> usize {
        self.iterations.len()
    }
}

#[cfg(target_os = "linux")]
fn current_rss_kb() -> Option<usize> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open("/proc/self/status").ok()?;
    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .find_map(|line| {
            line.strip_prefix("VmRSS:")?
                .split_whitespace()
                .find_map(|part| part.parse::<usize>().ok())
        })
}

#[cfg(not(target_os = "linux"))]
fn current_rss_kb() -> Option<usize> {
    None
}

/// Samples the current resident set size (RSS) on supported platforms.
pub fn sample_rss_kb() -> Option<usize> {
    current_rss_kb()
}
