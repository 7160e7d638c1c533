//! Facilities for discovering input files and loading text corpora.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{OdiaBpeError, Result};

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Directories are traversed recursively by default; set [`IngestConfig::recursive`] to `false`
/// to limit discovery to the first level.  Symlink traversal is controlled through
/// [`IngestConfig::follow_symlinks`]. Files inside a directory are returned in name order so
/// the corpus order, and therefore tie-breaking during training, is stable.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(OdiaBpeError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .symlink_metadata()
            .map_err(|err| OdiaBpeError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let depth = if cfg.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(path)
                .max_depth(depth)
                .follow_links(cfg.follow_symlinks)
                .sort_by_file_name();
            for entry in walker {
                let entry = entry.map_err(|err| OdiaBpeError::Internal(err.to_string()))?;
                if entry.file_type().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(OdiaBpeError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Loads UTF-8 text files into training texts.
///
/// Each file yields one text, or one text per non-empty line when
/// [`IngestConfig::split_lines`] is set. [`IngestConfig::max_chars`] truncates every file
/// before splitting. Empty texts are kept out; the trainer tolerates an empty result.
pub fn load_text_corpus<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<String>> {
    let file_paths = collect_paths(inputs, cfg)?;
    let mut texts = Vec::new();
    for file_path in file_paths {
        let mut contents = fs::read_to_string(&file_path)
            .map_err(|err| OdiaBpeError::io(err, Some(file_path.clone())))?;
        if let Some(limit) = cfg.max_chars {
            truncate_chars(&mut contents, limit);
        }
        debug!(
            "read {} characters from {}",
            contents.chars().count(),
            file_path.display()
        );
        if cfg.split_lines {
            texts.extend(
                contents
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string),
            );
        } else if !contents.is_empty() {
            texts.push(contents);
        }
    }
    Ok(texts)
}

fn truncate_chars(text: &mut String, limit: usize) {
    if let Some((byte_idx, _)) = text.char_indices().nth(limit) {
        text.truncate(byte_idx);
    }
}
