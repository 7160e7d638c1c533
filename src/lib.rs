//! Byte pair encoding (BPE) tokenizer for Odia-script text.
//!
//! The crate learns a vocabulary of Odia characters and character merges from a
//! text corpus and uses the ordered merge table to map text to token IDs and
//! back. It exposes both a library API and an `odia-bpe` command line
//! interface. Typical usage trains a [`BpeModel`], persists it as JSON and later
//! loads it to encode text.
//!
//! ```no_run
//! use odia_bpe::{BpeModel, Trainer, TrainerConfig};
//!
//! # fn main() -> odia_bpe::Result<()> {
//! let cfg = TrainerConfig::builder()
//!     .target_vocab_size(5000)
//!     .min_frequency(10)
//!     .show_progress(false)
//!     .build()?;
//! let artifacts = Trainer::new(cfg).train(&["ଆମେ ଭାରତ ବାସୀ"])?;
//! artifacts.model.save("odia_bpe_tokenizer.json")?;
//!
//! let model = BpeModel::load("odia_bpe_tokenizer.json")?;
//! let ids = model.encode("ଭାରତ");
//! assert_eq!(model.decode(&ids), "ଭାରତ");
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature.  Users targeting the
//! library portion only can disable default features to avoid the CLI
//! dependencies: `odia-bpe = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

pub mod alphabet;
pub mod config;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod model;
pub mod serialization;
pub mod special_tokens;
pub mod trainer;
pub mod vocab;

pub use alphabet::{base_alphabet, BaseAlphabet};
pub use config::{IngestConfig, TrainerBuilder, TrainerConfig};
pub use error::{OdiaBpeError, Result};
pub use metrics::{IterationMetrics, StopReason, TrainingMetrics};
pub use model::{BpeModel, MergeRule, TokenId, UNKNOWN_PLACEHOLDER};
pub use special_tokens::SpecialTokens;
pub use trainer::{Trainer, TrainerArtifacts};
pub use vocab::Vocabulary;
