//! The four reserved tokens that occupy the lowest vocabulary IDs.

use serde::{Deserialize, Serialize};

use crate::model::TokenId;

/// Padding token text.
pub const PAD_TOKEN: &str = "<PAD>";
/// Unknown-symbol token text.
pub const UNK_TOKEN: &str = "<UNK>";
/// Begin-of-sequence token text.
pub const BOS_TOKEN: &str = "<BOS>";
/// End-of-sequence token text.
pub const EOS_TOKEN: &str = "<EOS>";

/// Name → ID assignment of the reserved tokens.
///
/// The IDs are fixed at `PAD=0, UNK=1, BOS=2, EOS=3` for every model; the struct
/// exists so the mapping round-trips through persisted models by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// ID of `<PAD>`.
    #[serde(rename = "<PAD>")]
    pub pad: TokenId,
    /// ID of `<UNK>`.
    #[serde(rename = "<UNK>")]
    pub unk: TokenId,
    /// ID of `<BOS>`.
    #[serde(rename = "<BOS>")]
    pub bos: TokenId,
    /// ID of `<EOS>`.
    #[serde(rename = "<EOS>")]
    pub eos: TokenId,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: 0,
            unk: 1,
            bos: 2,
            eos: 3,
        }
    }
}

impl SpecialTokens {
    /// Number of reserved tokens.
    pub const COUNT: usize = 4;

    /// Returns `(name, id)` pairs in ID order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, TokenId); Self::COUNT] {
        [
            (PAD_TOKEN, self.pad),
            (UNK_TOKEN, self.unk),
            (BOS_TOKEN, self.bos),
            (EOS_TOKEN, self.eos),
        ]
    }

    /// Returns true when the assignment matches the fixed reserved IDs.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_occupy_first_ids() {
        let tokens = SpecialTokens::default();
        let ids: Vec<TokenId> = tokens.entries().iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(tokens.is_canonical());
    }

    #[test]
    fn serializes_by_token_name() {
        let json = serde_json::to_string(&SpecialTokens::default()).expect("serialize");
        assert_eq!(json, r#"{"<PAD>":0,"<UNK>":1,"<BOS>":2,"<EOS>":3}"#);
        let parsed: SpecialTokens = serde_json::from_str(&json).expect("deserialize");
        assert!(parsed.is_canonical());
    }

    #[test]
    fn reassigned_ids_are_not_canonical() {
        let tokens = SpecialTokens {
            unk: 7,
            ..SpecialTokens::default()
        };
        assert!(!tokens.is_canonical());
    }
}
