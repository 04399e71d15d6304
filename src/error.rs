//! Error taxonomy shared by the content and serving layers

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can surface while loading or querying blog content
#[derive(Debug, Error)]
pub enum BlogError {
    /// The index or a post body could not be read from disk
    #[error("failed to read {path:?}: {source}")]
    Fetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index file exists but is not valid JSON
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No post in the index carries this id
    #[error("post not found: {0}")]
    NotFound(String),

    /// A post date failed to parse during archive grouping
    #[error("invalid date {date:?} in post {id}")]
    InvalidDate { id: String, date: String },

    /// Two index entries share the same id
    #[error("duplicate post id: {0}")]
    DuplicateId(String),
}

impl BlogError {
    /// Whether retrying the same request can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BlogError::Fetch { .. })
    }
}
