//! Selection of record files in a save directory by file name tags.

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::RECORD_EXTENSION;
use crate::errors::Result;

/// File name filter over a save directory.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Every one of these must appear in the file name.
    pub all_of: Vec<String>,
    /// At least one of these must appear; an empty list accepts any name.
    pub any_of: Vec<String>,
    /// Required file extension, without the dot.
    pub extension: String,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            all_of: vec!["sim".to_owned()],
            any_of: Vec::new(),
            extension: RECORD_EXTENSION.to_owned(),
        }
    }
}

impl RecordQuery {
    /// Query matching every record with the given extension.
    #[must_use]
    pub fn any(extension: &str) -> Self {
        Self {
            all_of: Vec::new(),
            any_of: Vec::new(),
            extension: extension.to_owned(),
        }
    }

    /// Adds a tag the file name must contain.
    #[must_use]
    pub fn with_all(mut self, tag: impl Into<String>) -> Self {
        self.all_of.push(tag.into());
        self
    }

    /// Adds an alternative tag; the name must contain at least one alternative.
    #[must_use]
    pub fn with_any(mut self, tag: impl Into<String>) -> Self {
        self.any_of.push(tag.into());
        self
    }

    /// True if `file_name` passes the filter.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        let Some(stem) = file_name
            .strip_suffix(self.extension.as_str())
            .and_then(|s| s.strip_suffix('.'))
        else {
            return false;
        };
        let has = |tag: &String| stem.contains(tag.as_str());
        self.all_of.iter().all(has) && (self.any_of.is_empty() || self.any_of.iter().any(has))
    }
}

/// Lists the record files in `dir` that pass `query`, sorted by name.
///
/// Hidden files, which include in-flight `.partial` reservations, are skipped.
///
/// # Errors
///
/// [`EisError::Io`](crate::errors::EisError::Io) if `dir` cannot be read.
pub fn find_records(dir: impl AsRef<Path>, query: &RecordQuery) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with('.') && query.matches(name) {
            found.push(entry.path());
        }
    }
    found.sort();
    tracing::debug!(dir = %dir.display(), matches = found.len(), "scanned save directory");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_of_is_an_and_filter_and_any_of_an_or_filter() {
        let query = RecordQuery::default().with_any("0001").with_any("0002");
        assert!(query.matches("260114-0001_sim_one.csv"));
        assert!(query.matches("260114-0002_sim_two-outliers.csv"));
        assert!(!query.matches("260114-0003_sim_one.csv"));
        assert!(!query.matches("260114-0001_exp_one.csv"));
        assert!(!query.matches("260114-0001_sim_one.txt"));
    }

    #[test]
    fn empty_alternatives_accept_every_name_with_the_extension() {
        let query = RecordQuery::any("csv");
        assert!(query.matches("anything.csv"));
        assert!(!query.matches("csv"));
        let noisy = RecordQuery::default().with_all("-");
        assert!(noisy.matches("260114-0003_sim_one-ivnoise.csv"));
    }
}
