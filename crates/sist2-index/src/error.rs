//! Error types for sist2 index access.
//!
//! All errors propagate to the caller uninterpreted: the library performs no
//! retries and no recovery. Soft absences (key-value miss, thumbnail miss,
//! end of iteration) are `Option`/iterator end, never errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sist2 index operations.
#[derive(Debug, Error)]
pub enum Sist2Error {
    /// The index file is missing, unreadable, or not a SQLite database.
    #[error("Failed to open index at {path:?}: {message}")]
    Open {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// An expected table or row is absent, e.g. no descriptor row.
    #[error("Index schema error: {message}")]
    Schema {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// A query failed, including malformed caller-supplied filter expressions.
    #[error("Query error: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// A document's JSON attribute bag is malformed or missing required fields.
    #[error("Document JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for sist2 index operations.
pub type Result<T> = std::result::Result<T, Sist2Error>;

impl From<rusqlite::Error> for Sist2Error {
    fn from(err: rusqlite::Error) -> Self {
        Sist2Error::Query {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for Sist2Error {
    fn from(err: serde_json::Error) -> Self {
        Sist2Error::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
