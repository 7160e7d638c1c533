//! JSON model documents: `vocab`, `merges`, `vocab_size` and `special_tokens`.
//!
//! Both maps are written and read in document order. The merge table depends
//! on that order, so the maps are (de)serialised through ordered entry lists
//! rather than hash maps.

use std::fmt;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{OdiaBpeError, Result};
use crate::model::{BpeModel, MergeRule, TokenId};
use crate::special_tokens::SpecialTokens;
use crate::vocab::Vocabulary;

/// Separator between the two halves of a pair in `merges` keys.
pub const PAIR_SEPARATOR: char = '|';

#[derive(Serialize, Deserialize)]
struct ModelDocument {
    vocab: OrderedEntries<TokenId>,
    merges: OrderedEntries<String>,
    vocab_size: usize,
    special_tokens: SpecialTokens,
}

/// A JSON object kept as its `(key, value)` entries in document order.
struct OrderedEntries<V>(Vec<(String, V)>);

impl<V: Serialize> Serialize for OrderedEntries<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Joins a pair into its `merges` key.
fn merge_key(rule: &MergeRule) -> Result<String> {
    if rule.first().contains(PAIR_SEPARATOR) || rule.second().contains(PAIR_SEPARATOR) {
        return Err(OdiaBpeError::Serialization(format!(
            "merge {rule} contains {PAIR_SEPARATOR:?} and cannot be keyed unambiguously"
        )));
    }
    Ok(format!("{}{PAIR_SEPARATOR}{}", rule.first(), rule.second()))
}

/// Splits a `merges` key at the separator whose halves concatenate to `merged`.
fn split_merge_key(key: &str, merged: &str) -> Result<MergeRule> {
    key.match_indices(PAIR_SEPARATOR)
        .map(|(idx, sep)| (&key[..idx], &key[idx + sep.len()..]))
        .find(|(first, second)| {
            !first.is_empty()
                && !second.is_empty()
                && first.len() + second.len() == merged.len()
                && merged.starts_with(first)
                && merged.ends_with(second)
        })
        .map(|(first, second)| MergeRule::new(first, second))
        .ok_or_else(|| {
            OdiaBpeError::InvalidModel(format!(
                "merge key {key:?} does not split into a pair producing {merged:?}"
            ))
        })
}

/// Serialises a model to a JSON string.
pub fn model_to_json(model: &BpeModel, pretty: bool) -> Result<String> {
    let document = to_document(model)?;
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}

/// Parses and validates a model from a JSON string.
pub fn model_from_json(text: &str) -> Result<BpeModel> {
    let document: ModelDocument = serde_json::from_str(text)?;
    from_document(document)
}

/// Persists the model as pretty-printed JSON, replacing `path` atomically.
pub fn save_model<P: AsRef<Path>>(model: &BpeModel, path: P) -> Result<()> {
    let path = path.as_ref();
    let document = to_document(model)?;
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let io_err = |err: std::io::Error| OdiaBpeError::io(err, Some(path.to_path_buf()));

    let temp_file = NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    temp_file.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

/// Loads a model written by [`save_model`].
///
/// Missing files, malformed JSON and documents violating model invariants are
/// all reported as errors; substituting a fallback model is up to the caller.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<BpeModel> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|err| OdiaBpeError::io(err, Some(path.to_path_buf())))?;
    model_from_json(&text)
}

fn to_document(model: &BpeModel) -> Result<ModelDocument> {
    let vocab = model
        .vocab()
        .iter()
        .map(|(symbol, id)| (symbol.to_string(), id))
        .collect();
    let merges = model
        .merges()
        .iter()
        .map(|rule| Ok((merge_key(rule)?, rule.merged().to_string())))
        .collect::<Result<Vec<_>>>()?;
    Ok(ModelDocument {
        vocab: OrderedEntries(vocab),
        merges: OrderedEntries(merges),
        vocab_size: model.vocab_size(),
        special_tokens: *model.special_tokens(),
    })
}

fn from_document(document: ModelDocument) -> Result<BpeModel> {
    let vocab = Vocabulary::from_entries(document.vocab.0)?;
    let merges = document
        .merges
        .0
        .iter()
        .map(|(key, merged)| split_merge_key(key, merged))
        .collect::<Result<Vec<_>>>()?;
    BpeModel::new(vocab, merges, document.special_tokens, document.vocab_size)
}
