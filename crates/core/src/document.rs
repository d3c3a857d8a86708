//! Source documents extracted from files on disk

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a piece of text came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Path of the originating file
    pub path: PathBuf,
    /// 1-based page number within the file
    pub page: u32,
}

impl DocumentSource {
    pub fn new(path: impl Into<PathBuf>, page: u32) -> Self {
        Self {
            path: path.into(),
            page,
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#page={}", self.path.display(), self.page)
    }
}

/// Text of a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source: DocumentSource,
    pub text: String,
}

impl Document {
    pub fn new(source: DocumentSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
