//! Symbol sequences and the single-pass pair replacement used by training and encoding.

/// Interned symbol identifier local to one training run.
pub(crate) type SymbolId = u32;
/// Ordered pair of adjacent interned symbols.
pub(crate) type SymbolPair = (SymbolId, SymbolId);

/// Replaces every non-overlapping occurrence of `left` followed by `right`.
///
/// The scan runs left to right and skips past both consumed positions after a
/// replacement, so `a a a` merged on `(a, a)` yields `aa a`. Returns the number
/// of replacements; the sequence is untouched when the pair never occurs.
pub(crate) fn merge_pair<T, F>(symbols: &mut Vec<T>, left: &T, right: &T, mut merged: F) -> usize
where
    T: PartialEq,
    F: FnMut() -> T,
{
    let occurs = symbols
        .windows(2)
        .any(|window| window[0] == *left && window[1] == *right);
    if !occurs {
        return 0;
    }

    let mut merges = 0usize;
    let mut rewritten = Vec::with_capacity(symbols.len());
    let mut iter = std::mem::take(symbols).into_iter().peekable();
    while let Some(current) = iter.next() {
        if current == *left && iter.peek() == Some(right) {
            iter.next();
            rewritten.push(merged());
            merges += 1;
        } else {
            rewritten.push(current);
        }
    }
    *symbols = rewritten;
    merges
}

/// A training word: one corpus text as a sequence of interned symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Word {
    symbols: Vec<SymbolId>,
}

impl Word {
    /// Builds a word from an owned symbol sequence.
    pub(crate) fn from_symbols(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }

    /// Returns true when the word contains at least two symbols.
    pub(crate) fn has_pairs(&self) -> bool {
        self.symbols.len() >= 2
    }

    /// Invokes `f` for each adjacent pair, left to right.
    pub(crate) fn for_each_pair<F>(&self, mut f: F)
    where
        F: FnMut(SymbolPair),
    {
        for window in self.symbols.windows(2) {
            f((window[0], window[1]));
        }
    }

    /// Applies one merge throughout the word and returns the number of replacements.
    pub(crate) fn merge(&mut self, pair: SymbolPair, replacement: SymbolId) -> usize {
        merge_pair(&mut self.symbols, &pair.0, &pair.1, || replacement)
    }

    #[cfg(test)]
    pub(crate) fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_replaces_all_pairs() {
        let mut word = Word::from_symbols(vec![1, 2, 1, 2, 3]);
        assert!(word.has_pairs());
        assert_eq!(word.merge((1, 2), 99), 2);
        assert_eq!(word.symbols(), &[99, 99, 3]);
    }

    #[test]
    fn merge_does_not_overlap() {
        let mut word = Word::from_symbols(vec![7, 7, 7]);
        assert_eq!(word.merge((7, 7), 8), 1);
        assert_eq!(word.symbols(), &[8, 7]);

        let mut word = Word::from_symbols(vec![7, 7, 7, 7]);
        assert_eq!(word.merge((7, 7), 8), 2);
        assert_eq!(word.symbols(), &[8, 8]);
    }

    #[test]
    fn merge_is_ordered() {
        let mut word = Word::from_symbols(vec![2, 1, 2]);
        assert_eq!(word.merge((1, 2), 5), 1);
        assert_eq!(word.symbols(), &[2, 5]);
        assert_eq!(word.merge((1, 2), 6), 0);
    }

    #[test]
    fn enumerate_pairs_in_order() {
        let word = Word::from_symbols(vec![1, 2, 3]);
        let mut collected = Vec::new();
        word.for_each_pair(|pair| collected.push(pair));
        assert_eq!(collected, vec![(1, 2), (2, 3)]);

        let single = Word::from_symbols(vec![4]);
        assert!(!single.has_pairs());
        single.for_each_pair(|_| panic!("no pairs expected"));
    }

    #[test]
    fn merge_pair_works_on_strings() {
        let mut symbols: Vec<String> = ["ଆ", "ମ", "େ", "ଆ", "ମ"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let merges = merge_pair(&mut symbols, &"ଆ".to_string(), &"ମ".to_string(), || {
            "ଆମ".to_string()
        });
        assert_eq!(merges, 2);
        assert_eq!(symbols, vec!["ଆମ", "େ", "ଆମ"]);
    }
}
