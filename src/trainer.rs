//! Core training loop producing a [`BpeModel`] from Odia text.

use std::collections::BTreeSet;
use std::time::Instant;
use std::{fmt, path::Path};

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::alphabet::{base_alphabet, is_trainable};
use crate::config::{IngestConfig, TrainerBuilder, TrainerConfig};
use crate::corpus::load_text_corpus;
use crate::error::Result;
use crate::metrics::{sample_rss_kb, IterationMetrics, StopReason, TrainingMetrics};
use crate::model::{BpeModel, MergeRule};
use crate::special_tokens::SpecialTokens;
use crate::vocab::Vocabulary;

pub(crate) mod word;

use word::{SymbolId, SymbolPair, Word};

/// High-level façade configuring and executing BPE training runs.
#[derive(Debug, Clone)]
pub struct Trainer {
    cfg: TrainerConfig,
}

/// Artifacts returned after a training session completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// Trained BPE model.
    pub model: BpeModel,
    /// Detailed metrics captured during training.
    pub metrics: TrainingMetrics,
}

impl Trainer {
    /// Creates a new trainer for the supplied configuration.
    #[must_use]
    pub fn new(cfg: TrainerConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`TrainerBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.cfg
    }

    /// Number of merges the target vocabulary size leaves room for.
    #[must_use]
    pub fn merge_budget(&self) -> usize {
        let budget = self
            .cfg
            .target_vocab_size
            .saturating_sub(SpecialTokens::COUNT + base_alphabet().len());
        match self.cfg.max_merge_iterations {
            Some(limit) => budget.min(limit),
            None => budget,
        }
    }

    /// Trains a model by loading text files from disk according to [`IngestConfig`].
    pub fn train_from_paths<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        ingest: &IngestConfig,
    ) -> Result<TrainerArtifacts> {
        let texts = load_text_corpus(inputs, ingest)?;
        self.train(&texts)
    }

    /// Trains a model from in-memory texts.
    ///
    /// Each text becomes one word of its trainable characters; texts with
    /// nothing trainable are skipped. An empty corpus yields a model holding
    /// only the base alphabet and the special tokens.
    pub fn train<S: AsRef<str>>(&self, corpus: &[S]) -> Result<TrainerArtifacts> {
        let target_merges = self
            .cfg
            .target_vocab_size
            .saturating_sub(SpecialTokens::COUNT + base_alphabet().len());
        let max_new_tokens = self.merge_budget();

        let mut symbols = SymbolTable::default();
        let mut words = Vec::with_capacity(corpus.len());
        // The budget can reach u32::MAX.
        let reserve = max_new_tokens.min(16_384);
        let mut metrics = TrainingMetrics::new(reserve);
        for text in corpus {
            let word: Vec<SymbolId> = text
                .as_ref()
                .chars()
                .filter(|&ch| is_trainable(ch))
                .map(|ch| symbols.intern_char(ch))
                .collect();
            if word.is_empty() {
                metrics.discarded_texts += 1;
            } else {
                words.push(Word::from_symbols(word));
            }
        }
        metrics.words = words.len();
        debug!(
            "prepared {} words ({} texts discarded), merge budget {}",
            words.len(),
            metrics.discarded_texts,
            max_new_tokens
        );

        let mut merges: Vec<MergeRule> = Vec::with_capacity(reserve);
        let mut recorded: FxHashSet<SymbolPair> = FxHashSet::default();
        let mut iteration = 0usize;
        let training_start = Instant::now();

        while iteration < max_new_tokens {
            let iteration_start = Instant::now();
            let counts = PairCounts::from_words(&words);
            let Some((best_pair, frequency)) = counts.most_frequent() else {
                metrics.stop_reason = StopReason::NoPairsRemaining;
                break;
            };
            if frequency < self.cfg.min_frequency {
                metrics.stop_reason = StopReason::BelowMinFrequency;
                break;
            }
            iteration += 1;

            let new_symbol = symbols.intern_merge(best_pair);
            let merges_applied: usize = words
                .iter_mut()
                .map(|word| word.merge(best_pair, new_symbol))
                .sum();

            let first = symbols.resolve(best_pair.0).to_string();
            let second = symbols.resolve(best_pair.1).to_string();
            if self.cfg.show_progress {
                info!(
                    "iter {:>6} freq {:>8} merges {:>8} distinct_pairs {:>8} merged {:?}",
                    iteration,
                    frequency,
                    merges_applied,
                    counts.len(),
                    symbols.resolve(new_symbol)
                );
            }
            // A pair can resurface when another merge rebuilds one of its symbols;
            // the table keeps its first position.
            if recorded.insert(best_pair) {
                merges.push(MergeRule::new(first.clone(), second.clone()));
            } else {
                debug!("pair ({first:?}, {second:?}) already recorded; table unchanged");
            }

            metrics.iterations.push(IterationMetrics {
                iteration,
                pair: (first, second),
                frequency,
                merges_applied,
                distinct_pairs: counts.len(),
                elapsed_iteration: iteration_start.elapsed(),
                elapsed_total: training_start.elapsed(),
                rss_kb: sample_rss_kb(),
            });
        }

        if iteration == max_new_tokens {
            metrics.stop_reason = if max_new_tokens < target_merges {
                StopReason::MaxIterationsReached
            } else {
                StopReason::TargetVocabReached
            };
        }
        metrics.total_duration = training_start.elapsed();

        let special_tokens = SpecialTokens::default();
        let mut vocab_symbols: BTreeSet<String> =
            base_alphabet().iter().map(String::from).collect();
        vocab_symbols.extend(merges.iter().map(|rule| rule.merged().to_string()));
        let vocab = Vocabulary::from_symbols(&special_tokens, vocab_symbols)?;

        if self.cfg.show_progress {
            info!(
                "completed {} merges in {:.2?}; vocab size {} (target {})",
                merges.len(),
                metrics.total_duration,
                vocab.len(),
                self.cfg.target_vocab_size
            );
        }

        let model = BpeModel::new(vocab, merges, special_tokens, self.cfg.target_vocab_size)?;
        Ok(TrainerArtifacts { model, metrics })
    }
}

/// Interns symbol strings for one training run.
///
/// Two different pairs can concatenate to the same text; both then resolve to
/// one ID so later rounds count them as the same symbol.
#[derive(Default)]
struct SymbolTable {
    strings: Vec<String>,
    ids: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    fn intern(&mut self, symbol: String) -> SymbolId {
        if let Some(&id) = self.ids.get(&symbol) {
            return id;
        }
        let id = self.strings.len() as SymbolId;
        self.strings.push(symbol.clone());
        self.ids.insert(symbol, id);
        id
    }

    fn intern_char(&mut self, ch: char) -> SymbolId {
        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        self.intern(text.to_string())
    }

    fn intern_merge(&mut self, (left, right): SymbolPair) -> SymbolId {
        let merged = format!("{}{}", self.resolve(left), self.resolve(right));
        self.intern(merged)
    }

    fn resolve(&self, id: SymbolId) -> &str {
        &self.strings[id as usize]
    }
}

/// Adjacent-pair counts that remember the order pairs were first seen in.
struct PairCounts {
    index: FxHashMap<SymbolPair, usize>,
    entries: Vec<(SymbolPair, usize)>,
}

impl PairCounts {
    fn from_words(words: &[Word]) -> Self {
        let mut counts = Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        };
        for word in words.iter().filter(|word| word.has_pairs()) {
            word.for_each_pair(|pair| counts.add(pair));
        }
        counts
    }

    fn add(&mut self, pair: SymbolPair) {
        match self.index.get(&pair) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(pair, self.entries.len());
                self.entries.push((pair, 1));
            }
        }
    }

    /// Highest count; ties go to the pair discovered first.
    fn most_frequent(&self) -> Option<(SymbolPair, usize)> {
        let mut best: Option<(SymbolPair, usize)> = None;
        for &(pair, count) in &self.entries {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((pair, count));
            }
        }
        best
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for TrainerArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BPE model with {} symbols ({} merges, target {})",
            self.model.len(),
            self.model.merges().len(),
            self.model.vocab_size()
        )?;
        writeln!(f, "Stop reason: {:?}", self.metrics.stop_reason)?;
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}
