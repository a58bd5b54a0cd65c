//! Index descriptor and scan version history.
//!
//! Both are written by the external scanner and loaded once at open time;
//! this library never mutates them.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::{Result, Sist2Error};

/// Identity and version metadata for an index. Exactly one row per index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub id: i64,
    pub version_major: i64,
    pub version_minor: i64,
    pub version_patch: i64,
    /// Filesystem root the index was scanned from.
    pub root: String,
    /// Display name of the index.
    pub name: String,
    /// URL-rewrite template used by the web UI.
    pub rewrite_url: String,
    /// Creation time, seconds since the epoch.
    pub timestamp: i64,
}

impl IndexDescriptor {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            version_major: row.get(1)?,
            version_minor: row.get(2)?,
            version_patch: row.get(3)?,
            root: row.get(4)?,
            name: row.get(5)?,
            rewrite_url: row.get(6)?,
            timestamp: row.get(7)?,
        })
    }
}

/// One incremental scan. Ids start at 1 and increment by one per scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexVersion {
    pub id: i64,
    /// Scan time, seconds since the epoch.
    pub date: i64,
}

pub(crate) fn load_descriptor(conn: &Connection) -> Result<IndexDescriptor> {
    conn.query_row(
        "SELECT id, version_major, version_minor, version_patch, root, name, rewrite_url, timestamp
         FROM descriptor",
        [],
        IndexDescriptor::from_row,
    )
    .optional()
    .map_err(|e| Sist2Error::Schema {
        message: format!("failed to read descriptor: {}", e),
        source: Some(e),
    })?
    .ok_or_else(|| Sist2Error::Schema {
        message: "descriptor table is empty".to_string(),
        source: None,
    })
}

pub(crate) fn load_versions(conn: &Connection) -> Result<Vec<IndexVersion>> {
    let mut stmt = conn
        .prepare("SELECT id, date FROM version ORDER BY id")
        .map_err(|e| Sist2Error::Schema {
            message: format!("failed to read version history: {}", e),
            source: Some(e),
        })?;

    let rows = stmt.query_map([], |row| {
        Ok(IndexVersion {
            id: row.get(0)?,
            date: row.get(1)?,
        })
    })?;

    let mut versions = Vec::new();
    for row in rows {
        versions.push(row?);
    }

    Ok(versions)
}
