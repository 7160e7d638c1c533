//! Configuration builders controlling training and corpus ingestion.

use std::convert::TryFrom;

use crate::error::{OdiaBpeError, Result};
use crate::model::TokenId;
use serde::{Deserialize, Serialize};

/// Configuration for Odia BPE training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Target vocabulary size including the base alphabet and the four special tokens.
    pub target_vocab_size: usize,
    /// Minimum pair count required before a merge is recorded.
    pub min_frequency: usize,
    /// Enables per-iteration logging through the `log` facade.
    pub show_progress: bool,
    /// Hard cap on merge iterations; `None` derives the count from the target vocabulary size.
    pub max_merge_iterations: Option<usize>,
}

impl TrainerConfig {
    /// Returns a builder initialised with [`TrainerConfig::default`].
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// Validates the invariants required for training.
    ///
    /// A target size that leaves no room for merges is valid; training then
    /// returns the base alphabet alone.
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency == 0 {
            return Err(OdiaBpeError::InvalidConfig(
                "min_frequency must be greater than zero".into(),
            ));
        }
        let max_vocab = usize::try_from(TokenId::MAX).unwrap_or(usize::MAX);
        if self.target_vocab_size > max_vocab {
            return Err(OdiaBpeError::InvalidConfig(format!(
                "target_vocab_size ({}) exceeds {max_vocab}, the maximum representable TokenId",
                self.target_vocab_size
            )));
        }
        if self.max_merge_iterations == Some(0) {
            return Err(OdiaBpeError::InvalidConfig(
                "max_merge_iterations must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            target_vocab_size: 5000,
            min_frequency: 2,
            show_progress: true,
            max_merge_iterations: None,
        }
    }
}

/// Builder for [`TrainerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainerBuilder {
    cfg: TrainerConfig,
}

impl TrainerBuilder {
    /// Creates a builder with [`TrainerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the desired vocabulary size (including base alphabet and special tokens).
    #[must_use]
    pub fn target_vocab_size(mut self, value: usize) -> Self {
        self.cfg.target_vocab_size = value;
        self
    }

    /// Sets the minimum merge frequency.
    #[must_use]
    pub fn min_frequency(mut self, value: usize) -> Self {
        self.cfg.min_frequency = value;
        self
    }

    /// Enables or disables per-iteration logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Sets a hard merge iteration limit.
    #[must_use]
    pub fn max_merge_iterations(mut self, value: Option<usize>) -> Self {
        self.cfg.max_merge_iterations = value;
        self
    }

    /// Finalises the builder, returning a validated [`TrainerConfig`].
    pub fn build(self) -> Result<TrainerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how text corpora are read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
    /// Treats every non-empty line as its own text instead of one text per file.
    pub split_lines: bool,
    /// Keeps only the first `n` characters of each file.
    pub max_chars: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            split_lines: false,
            max_chars: None,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Splits files into one text per non-empty line.
    #[must_use]
    pub fn split_lines(mut self, enabled: bool) -> Self {
        self.cfg.split_lines = enabled;
        self
    }

    /// Caps the number of characters read from each file.
    #[must_use]
    pub fn max_chars(mut self, limit: Option<usize>) -> Self {
        self.cfg.max_chars = limit;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}
