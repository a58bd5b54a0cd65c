//! Document snapshots and derived path fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, Sist2Error};

/// One indexed file, yielded by [`DocumentCursor`].
///
/// `rel_path` and `path` are derived from the JSON attribute bag and the
/// descriptor root each time the row is read; they are never persisted.
/// `mtime`, `size` and the bag can be written back with
/// [`Sist2Index::update_document`].
///
/// [`DocumentCursor`]: crate::DocumentCursor
/// [`Sist2Index::update_document`]: crate::Sist2Index::update_document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Id assigned by the scanner, monotonically increasing.
    pub id: i64,
    /// Scan version that last touched this document.
    pub version: i64,
    /// Modification time, seconds since the epoch.
    pub mtime: i64,
    /// File size in bytes.
    pub size: i64,
    /// Open-ended attribute bag. `path`, `name` and `extension` are required
    /// strings; `tag` is an optional array of strings.
    pub json_data: Map<String, Value>,
    /// Path relative to the index root.
    pub rel_path: PathBuf,
    /// Absolute path, joined from the descriptor root.
    pub path: PathBuf,
}

impl Document {
    pub(crate) fn from_parts(
        id: i64,
        version: i64,
        mtime: i64,
        size: i64,
        raw_json: &str,
        root: &str,
    ) -> Result<Self> {
        let value: Value = serde_json::from_str(raw_json).map_err(|e| Sist2Error::Json {
            message: format!("document {} has malformed json_data: {}", id, e),
            source: Some(e),
        })?;

        let json_data = match value {
            Value::Object(map) => map,
            _ => {
                return Err(Sist2Error::Json {
                    message: format!("document {} json_data is not an object", id),
                    source: None,
                })
            }
        };

        let (rel_path, path) = derive_paths(&json_data, root, id)?;

        Ok(Self {
            id,
            version,
            mtime,
            size,
            json_data,
            rel_path,
            path,
        })
    }
}

fn required_str<'a>(bag: &'a Map<String, Value>, key: &str, id: i64) -> Result<&'a str> {
    bag.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Sist2Error::Json {
            message: format!(
                "document {} json_data is missing required string field `{}`",
                id, key
            ),
            source: None,
        })
}

/// Derive `(rel_path, path)` from the attribute bag and the index root.
///
/// The file name is `name` plus `.extension` when the extension is non-empty.
fn derive_paths(bag: &Map<String, Value>, root: &str, id: i64) -> Result<(PathBuf, PathBuf)> {
    let dir = required_str(bag, "path", id)?;
    let name = required_str(bag, "name", id)?;
    let extension = required_str(bag, "extension", id)?;

    let file_name = if extension.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    };

    let rel_path = Path::new(dir).join(&file_name);
    let path = Path::new(root).join(dir).join(&file_name);

    Ok((rel_path, path))
}
