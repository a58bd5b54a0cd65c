//! Inference model registration and search backend capabilities.

use serde::{Deserialize, Serialize};

/// How a model's embeddings attach to documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// One embedding per document.
    Flat,
    /// Multiple embeddings per document.
    Nested,
}

impl ModelKind {
    /// Tag stored in the model table's `type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Nested => "nested",
        }
    }
}

/// Registration of an inference model for an index.
///
/// The library stores these fields verbatim. The constraints below are caller
/// contracts consumed by the web UI and search backend, not validated here:
///
/// - `name` must be at most 15 characters;
/// - `url` points at the model used for inference in the web UI, in .onnx
///   format;
/// - `path` is the Elasticsearch field path and must begin with `idx_<dim>.`
///   for indexed dense vectors (up to 1024 dimensions) or `<dim>.` for plain
///   dense vectors;
/// - `size` is the embedding dimensionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub path: String,
    pub size: i64,
    pub kind: ModelKind,
}

/// Search backend the index is served by.
///
/// Only the SQLite backend consults the derived tag table when filtering by
/// tag; Elasticsearch keeps tags in its own documents. The flag makes that
/// divergence explicit so [`Sist2Index::sync_tag_table`] can skip work that
/// no reader would ever see.
///
/// [`Sist2Index::sync_tag_table`]: crate::Sist2Index::sync_tag_table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    #[default]
    Sqlite,
    Elasticsearch,
}

impl SearchBackend {
    /// Whether this backend reads the derived tag table for tag filtering.
    pub const fn uses_tag_table(self) -> bool {
        matches!(self, SearchBackend::Sqlite)
    }
}
