//! Bijective symbol ↔ ID mapping shared by training, encoding and persistence.

use std::collections::BTreeSet;
use std::convert::TryFrom;

use rustc_hash::FxHashMap;

use crate::error::{OdiaBpeError, Result};
use crate::model::TokenId;
use crate::special_tokens::SpecialTokens;

/// Symbol → ID mapping with dense IDs starting at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: FxHashMap<String, TokenId>,
}

impl Vocabulary {
    /// Builds the vocabulary of a freshly trained model: the reserved tokens at
    /// their fixed IDs, then `symbols` in code-point order.
    pub fn from_symbols(special: &SpecialTokens, symbols: BTreeSet<String>) -> Result<Self> {
        let entries = special
            .entries()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .chain(symbols)
            .enumerate()
            .map(|(idx, symbol)| {
                TokenId::try_from(idx)
                    .map(|id| (symbol, id))
                    .map_err(|_| OdiaBpeError::Internal("vocabulary size exceeded u32::MAX".into()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_entries(entries)
    }

    /// Builds the vocabulary holding only the reserved tokens.
    pub fn reserved(special: &SpecialTokens) -> Self {
        let mut entries = special.entries();
        entries.sort_by_key(|(_, id)| *id);
        let tokens: Vec<String> = entries.iter().map(|(name, _)| name.to_string()).collect();
        let ids = entries
            .iter()
            .enumerate()
            .map(|(idx, (name, _))| (name.to_string(), idx as TokenId))
            .collect();
        Self { tokens, ids }
    }

    /// Builds a vocabulary from arbitrary `(symbol, id)` entries, checking that
    /// symbols are unique and IDs cover `0..len` exactly once.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, TokenId)>,
    {
        let entries: Vec<(String, TokenId)> = entries.into_iter().collect();
        let len = entries.len();
        let mut slots: Vec<Option<String>> = vec![None; len];
        let mut ids = FxHashMap::default();
        ids.reserve(len);
        for (symbol, id) in entries {
            let idx = id as usize;
            let Some(slot) = slots.get_mut(idx) else {
                return Err(OdiaBpeError::InvalidModel(format!(
                    "token id {id} for {symbol:?} is outside the contiguous range 0..{len}"
                )));
            };
            if let Some(existing) = slot {
                return Err(OdiaBpeError::InvalidModel(format!(
                    "token id {id} assigned to both {existing:?} and {symbol:?}"
                )));
            }
            if ids.insert(symbol.clone(), id).is_some() {
                return Err(OdiaBpeError::InvalidModel(format!(
                    "symbol {symbol:?} appears more than once"
                )));
            }
            *slot = Some(symbol);
        }
        // Every slot is filled: n entries, n distinct ids, all below n.
        let tokens = slots.into_iter().flatten().collect();
        Ok(Self { tokens, ids })
    }

    /// Number of entries, special tokens included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true when the vocabulary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Looks up the ID of `symbol`.
    #[must_use]
    pub fn id(&self, symbol: &str) -> Option<TokenId> {
        self.ids.get(symbol).copied()
    }

    /// Looks up the symbol registered under `id`.
    #[must_use]
    pub fn symbol(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Returns true when `symbol` has an ID.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.ids.contains_key(symbol)
    }

    /// Iterates `(symbol, id)` in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenId)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .map(|(idx, symbol)| (symbol.as_str(), idx as TokenId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn specials_come_first_then_sorted_symbols() {
        let vocab =
            Vocabulary::from_symbols(&SpecialTokens::default(), symbols(&["ବ", "ଆ", " ", "ଆମ"]))
                .expect("vocab");
        let ordered: Vec<&str> = vocab.iter().map(|(symbol, _)| symbol).collect();
        assert_eq!(
            ordered,
            vec!["<PAD>", "<UNK>", "<BOS>", "<EOS>", " ", "ଆ", "ଆମ", "ବ"]
        );
        assert_eq!(vocab.id("ଆମ"), Some(6));
        assert_eq!(vocab.symbol(1), Some("<UNK>"));
        assert_eq!(vocab.symbol(99), None);
    }

    #[test]
    fn reserved_holds_only_special_tokens() {
        let vocab = Vocabulary::reserved(&SpecialTokens::default());
        assert_eq!(vocab.len(), SpecialTokens::COUNT);
        assert_eq!(vocab.id("<EOS>"), Some(3));
        assert!(!vocab.contains(" "));
    }

    #[test]
    fn entries_may_arrive_in_any_order() {
        let vocab = Vocabulary::from_entries(vec![
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("a".to_string(), 0),
        ])
        .expect("vocab");
        assert_eq!(vocab.symbol(0), Some("a"));
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn gaps_are_rejected() {
        let err = Vocabulary::from_entries(vec![("a".to_string(), 0), ("b".to_string(), 2)])
            .expect_err("gap");
        assert!(matches!(err, OdiaBpeError::InvalidModel(_)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Vocabulary::from_entries(vec![("a".to_string(), 0), ("b".to_string(), 0)])
            .expect_err("duplicate id");
        assert!(matches!(err, OdiaBpeError::InvalidModel(message) if message.contains("both")));
    }
}
