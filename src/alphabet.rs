//! The fixed Odia base alphabet that seeds training.
//!
//! Only characters from this set (plus whitespace) survive corpus filtering, so
//! the ranges below decide which characters a trained model can ever represent.

use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Independent vowels, U+0B05 ..= U+0B13.
const VOWELS: (u32, u32) = (0x0B05, 0x0B13);
/// Consonants, U+0B15 ..= U+0B38.
const CONSONANTS: (u32, u32) = (0x0B15, 0x0B38);
/// Dependent vowel signs, U+0B3E ..= U+0B4B.
const VOWEL_SIGNS: (u32, u32) = (0x0B3E, 0x0B4B);

/// Anusvara, visarga, candrabindu and halanta.
const MARKS: [char; 4] = ['\u{0B02}', '\u{0B03}', '\u{0B01}', '\u{0B4D}'];
const WHITESPACE: [char; 3] = [' ', '\n', '\t'];

/// Read-only set of single-character symbols allowed to seed training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseAlphabet {
    symbols: BTreeSet<char>,
}

impl BaseAlphabet {
    fn build() -> Self {
        let mut symbols = BTreeSet::new();
        for (start, end) in [VOWELS, CONSONANTS, VOWEL_SIGNS] {
            symbols.extend((start..=end).filter_map(char::from_u32));
        }
        symbols.extend(MARKS);
        symbols.extend(WHITESPACE);
        Self { symbols }
    }

    /// Returns true when `ch` belongs to the alphabet.
    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.symbols.contains(&ch)
    }

    /// Number of symbols in the alphabet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; the alphabet is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates the alphabet in code-point order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

/// Returns the process-wide base alphabet, building it on first use.
pub fn base_alphabet() -> &'static BaseAlphabet {
    static ALPHABET: OnceLock<BaseAlphabet> = OnceLock::new();
    ALPHABET.get_or_init(BaseAlphabet::build)
}

/// Returns true when `ch` may appear in a training word.
///
/// Any whitespace passes the filter even if it is not one of the three
/// whitespace symbols in the alphabet; such characters can take part in merges
/// but never receive an ID of their own.
#[must_use]
pub fn is_trainable(ch: char) -> bool {
    base_alphabet().contains(ch) || is_space(ch)
}

/// Unicode whitespace plus the information separators U+001C ..= U+001F,
/// which Unicode classes as paragraph and segment separators.
fn is_space(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{1c}'..='\u{1f}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_expected_size() {
        // 15 vowels + 36 consonants + 14 vowel signs + 4 marks + 3 whitespace.
        assert_eq!(base_alphabet().len(), 72);
    }

    #[test]
    fn range_edges_are_respected() {
        let alphabet = base_alphabet();
        assert!(alphabet.contains('\u{0B05}'));
        assert!(alphabet.contains('\u{0B13}'));
        assert!(!alphabet.contains('\u{0B14}'));
        assert!(alphabet.contains('\u{0B38}'));
        assert!(!alphabet.contains('\u{0B39}'));
        assert!(alphabet.contains('\u{0B4B}'));
        assert!(!alphabet.contains('\u{0B4C}'));
        assert!(alphabet.contains('\u{0B4D}'));
        assert!(!alphabet.contains('\u{0B64}'));
    }

    #[test]
    fn trainable_accepts_any_whitespace() {
        assert!(is_trainable('\t'));
        assert!(is_trainable('\r'));
        assert!(is_trainable('\u{00A0}'));
        for separator in '\u{1c}'..='\u{1f}' {
            assert!(is_trainable(separator), "{separator:?}");
        }
        assert!(!is_trainable('\u{1b}'));
        assert!(!is_trainable('\u{0}'));
        assert!(!base_alphabet().contains('\r'));
        assert!(!is_trainable('a'));
        assert!(!is_trainable('|'));
    }

    #[test]
    fn iteration_is_sorted() {
        let chars: Vec<char> = base_alphabet().iter().collect();
        let mut sorted = chars.clone();
        sorted.sort_unstable();
        assert_eq!(chars, sorted);
        assert_eq!(chars.first(), Some(&'\t'));
    }
}
