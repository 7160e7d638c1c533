//! Model types and the encode/decode operations of a trained tokenizer.

use std::fmt;
use std::path::Path;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::error::{OdiaBpeError, Result};
use crate::serialization;
use crate::special_tokens::SpecialTokens;
use crate::trainer::word::merge_pair;
use crate::vocab::Vocabulary;

/// Token identifier used throughout the crate.
pub type TokenId = u32;

/// Text emitted by [`BpeModel::decode`] for IDs the vocabulary does not contain.
pub const UNKNOWN_PLACEHOLDER: &str = "<UNK>";

/// One learned merge: `first` followed by `second` becomes `merged`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeRule {
    first: String,
    second: String,
    merged: String,
}

impl MergeRule {
    /// Creates the rule merging `first` and `second` into their concatenation.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        let first = first.into();
        let second = second.into();
        let mut merged = String::with_capacity(first.len() + second.len());
        merged.push_str(&first);
        merged.push_str(&second);
        Self {
            first,
            second,
            merged,
        }
    }

    /// Left-hand symbol of the pair.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Right-hand symbol of the pair.
    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Symbol produced by the merge.
    #[must_use]
    pub fn merged(&self) -> &str {
        &self.merged
    }

    /// Returns the rule as a `(first, second)` pair.
    #[must_use]
    pub fn pair(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?}) -> {:?}", self.first, self.second, self.merged)
    }
}

/// Trained BPE model containing the vocabulary and the ordered merge table.
///
/// A model is immutable once built, so one instance can serve concurrent
/// `encode`/`decode` calls.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpeModel {
    vocab: Vocabulary,
    merges: Vec<MergeRule>,
    special_tokens: SpecialTokens,
    vocab_size: usize,
}

impl BpeModel {
    /// Assembles a model, checking the invariants that tie vocabulary, merges
    /// and special tokens together.
    pub fn new(
        vocab: Vocabulary,
        merges: Vec<MergeRule>,
        special_tokens: SpecialTokens,
        vocab_size: usize,
    ) -> Result<Self> {
        if !special_tokens.is_canonical() {
            return Err(OdiaBpeError::InvalidModel(format!(
                "special tokens must use the reserved ids 0..{}, found {special_tokens:?}",
                SpecialTokens::COUNT
            )));
        }
        for (name, id) in special_tokens.entries() {
            if vocab.id(name) != Some(id) {
                return Err(OdiaBpeError::InvalidModel(format!(
                    "vocabulary must map {name} to id {id}"
                )));
            }
        }
        let mut seen = FxHashSet::default();
        for rule in &merges {
            if !seen.insert(rule.pair()) {
                return Err(OdiaBpeError::InvalidModel(format!(
                    "merge pair {:?} appears more than once",
                    rule.pair()
                )));
            }
            if !vocab.contains(rule.merged()) {
                return Err(OdiaBpeError::InvalidModel(format!(
                    "merged symbol {:?} is missing from the vocabulary",
                    rule.merged()
                )));
            }
        }
        Ok(Self {
            vocab,
            merges,
            special_tokens,
            vocab_size,
        })
    }

    /// The empty model a caller may fall back to when no trained model is
    /// available: special tokens only, no merges. Every character encodes to
    /// the `<UNK>` ID.
    pub fn untrained(vocab_size: usize) -> Self {
        let special_tokens = SpecialTokens::default();
        Self {
            vocab: Vocabulary::reserved(&special_tokens),
            merges: Vec::new(),
            special_tokens,
            vocab_size,
        }
    }

    /// Returns the symbol ↔ ID mapping.
    #[must_use]
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Returns the merge table in discovery order.
    #[must_use]
    pub fn merges(&self) -> &[MergeRule] {
        &self.merges
    }

    /// Returns the reserved token assignment.
    #[must_use]
    pub fn special_tokens(&self) -> &SpecialTokens {
        &self.special_tokens
    }

    /// Returns the target vocabulary size the model was trained for.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Returns the number of vocabulary entries actually present.
    ///
    /// This can be below [`BpeModel::vocab_size`] when training stopped early
    /// or when two different merges produced the same symbol.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Returns true when the vocabulary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Looks up the ID of a symbol.
    #[must_use]
    pub fn token_to_id(&self, symbol: &str) -> Option<TokenId> {
        self.vocab.id(symbol)
    }

    /// Looks up the symbol of an ID.
    #[must_use]
    pub fn id_to_token(&self, id: TokenId) -> Option<&str> {
        self.vocab.symbol(id)
    }

    /// Splits `text` into the symbols that [`BpeModel::encode`] maps to IDs.
    ///
    /// The whole text starts as one sequence of single characters; every merge
    /// is then replayed in recorded order, each as a full left-to-right pass.
    #[must_use]
    pub fn encode_symbols(&self, text: &str) -> Vec<String> {
        let mut symbols: Vec<String> = text.chars().map(String::from).collect();
        for rule in &self.merges {
            if symbols.len() < 2 {
                break;
            }
            merge_pair(&mut symbols, &rule.first, &rule.second, || {
                rule.merged.clone()
            });
        }
        symbols
    }

    /// Encodes `text` into token IDs, substituting `<UNK>` for unknown symbols.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        self.encode_symbols(text)
            .iter()
            .map(|symbol| self.vocab.id(symbol).unwrap_or(self.special_tokens.unk))
            .collect()
    }

    /// Encodes several texts in parallel against the same model.
    #[must_use]
    pub fn encode_batch<S>(&self, texts: &[S]) -> Vec<Vec<TokenId>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Decodes token IDs back into text.
    ///
    /// IDs missing from the vocabulary become [`UNKNOWN_PLACEHOLDER`]; symbols
    /// are concatenated without separators.
    #[must_use]
    pub fn decode(&self, ids: &[TokenId]) -> String {
        ids.iter()
            .map(|&id| self.vocab.symbol(id).unwrap_or(UNKNOWN_PLACEHOLDER))
            .collect()
    }

    /// Characters of `text` per emitted token; `0.0` when nothing is emitted.
    #[must_use]
    pub fn compression_ratio(&self, text: &str) -> f64 {
        let encoded = self.encode(text);
        if encoded.is_empty() {
            return 0.0;
        }
        text.chars().count() as f64 / encoded.len() as f64
    }

    /// Persists the model as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save_model(self, path)
    }

    /// Loads a model previously written by [`BpeModel::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        serialization::load_model(path)
    }
}
