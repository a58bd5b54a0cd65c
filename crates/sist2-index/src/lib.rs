//! Accessor library for sist2 SQLite document indexes.
//!
//! sist2 scans a filesystem tree into a single-file SQLite index. This crate
//! lets user scripts read indexed documents, thumbnails and metadata from
//! such an index, and write back enrichments (updated metadata, tags, model
//! registrations and vector embeddings) without hand-writing SQL. It never
//! creates or migrates the index schema itself; that belongs to the external
//! scanner. The only table this library owns is `kv`, a small key-value store
//! for script-level state.
//!
//! Writes stay pending on the handle's connection until [`Sist2Index::commit`]
//! makes them durable; dropping the handle without committing discards them.
//!
//! # Example
//!
//! ```rust,no_run
//! use sist2_index::{print_progress, Sist2Index};
//!
//! fn main() -> sist2_index::Result<()> {
//!     let index = Sist2Index::open("my-index.sist2")?;
//!
//!     let total = index.document_count("size > 1024")?;
//!     for (i, doc) in index.documents("size > 1024").enumerate() {
//!         let doc = doc?;
//!         println!("{}", doc.rel_path.display());
//!         print_progress(i as u64 + 1, total, false);
//!     }
//!
//!     index.commit()
//! }
//! ```

pub mod cursor;
pub mod descriptor;
pub mod document;
pub mod embedding;
pub mod error;
pub mod kv;
pub mod model;
pub mod progress;

// Re-export commonly used types
pub use cursor::DocumentCursor;
pub use descriptor::{IndexDescriptor, IndexVersion};
pub use document::Document;
pub use embedding::serialize_float_array;
pub use error::{Result, Sist2Error};
pub use kv::KvValue;
pub use model::{ModelKind, ModelSpec, SearchBackend};
pub use progress::{print_progress, ProgressReport, PROGRESS_MARKER};

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::debug;

/// Handle to an open sist2 index.
///
/// Owns the underlying connection for its lifetime. Reads return immutable
/// snapshots that stay valid however far the handle advances. Every call is
/// blocking and synchronous; callers that need concurrent scans of the same
/// file open separate handles. No locking beyond SQLite's own file locking is
/// configured or strengthened here.
#[derive(Debug)]
pub struct Sist2Index {
    path: PathBuf,
    conn: Connection,
    descriptor: IndexDescriptor,
    versions: Vec<IndexVersion>,
    backend: SearchBackend,
}

fn is_not_a_database(err: &Sist2Error) -> bool {
    matches!(
        err,
        Sist2Error::Schema {
            source: Some(rusqlite::Error::SqliteFailure(e, _)),
            ..
        } if e.code == rusqlite::ErrorCode::NotADatabase
    )
}

impl Sist2Index {
    /// Open an existing index file.
    ///
    /// Fails with [`Sist2Error::Open`] if the file is missing or not a
    /// database, and with [`Sist2Error::Schema`] if it has no descriptor row.
    /// The descriptor and the scan version history are loaded here, once; an
    /// index with no recorded versions is valid. The `kv` table is created if
    /// absent; that is idempotent and the only schema change this library
    /// ever makes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // No CREATE flag: opening must never materialize an empty index.
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Sist2Error::Open {
            path: path.clone(),
            message: e.to_string(),
            source: Some(e),
        })?;

        // SQLite validates the file header lazily, so a corrupt or non-database
        // file only fails on the first query. Surface that as an open failure
        // rather than a schema one.
        let descriptor = match descriptor::load_descriptor(&conn) {
            Ok(descriptor) => descriptor,
            Err(e) if is_not_a_database(&e) => {
                return Err(Sist2Error::Open {
                    path,
                    message: "file is not a SQLite database".to_string(),
                    source: None,
                })
            }
            Err(e) => return Err(e),
        };
        let versions = descriptor::load_versions(&conn)?;

        // Runs in autocommit so the table persists even if the script never
        // commits.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT)",
            [],
        )?;

        // Mutations batch on this transaction until commit().
        conn.execute_batch("BEGIN")?;

        debug!(
            "Opened index '{}' (root: {}, {} scan version(s))",
            descriptor.name,
            descriptor.root,
            versions.len()
        );

        Ok(Self {
            path,
            conn,
            descriptor,
            versions,
            backend: SearchBackend::default(),
        })
    }

    /// Select the search backend the index is served by, controlling whether
    /// [`sync_tag_table`](Self::sync_tag_table) has any work to do.
    pub fn with_backend(mut self, backend: SearchBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Change the search backend on an open handle.
    pub fn set_backend(&mut self, backend: SearchBackend) {
        self.backend = backend;
    }

    /// The currently configured search backend.
    pub fn backend(&self) -> SearchBackend {
        self.backend
    }

    /// Path this index was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index descriptor, loaded once at open time.
    pub fn descriptor(&self) -> &IndexDescriptor {
        &self.descriptor
    }

    /// Scan version history, loaded once at open time, oldest first.
    pub fn versions(&self) -> &[IndexVersion] {
        &self.versions
    }

    /// Read a value from the key-value table. A missing key is `None`, not
    /// an error.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Read a value from the key-value table, falling back to `default`.
    pub fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Upsert a value in the key-value table. Full replacement, last write
    /// wins.
    pub fn set(&self, key: &str, value: impl Into<KvValue>) -> Result<()> {
        self.conn.execute(
            "REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value.into()],
        )?;
        Ok(())
    }

    /// Raw thumbnail bytes for a document, or `None` if the scanner produced
    /// no thumbnail for it.
    pub fn thumbnail(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM thumbnail WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data)
    }

    /// Count documents matching `filter`, or all documents when it is empty.
    ///
    /// A single aggregate query, independent of any cursor. `filter` follows
    /// the same trust-boundary contract as [`documents`](Self::documents).
    pub fn document_count(&self, filter: &str) -> Result<u64> {
        let sql = if filter.is_empty() {
            "SELECT COUNT(*) FROM document".to_string()
        } else {
            format!("SELECT COUNT(*) FROM document WHERE {}", filter)
        };

        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Iterate documents matching `filter` in ascending id order, one
    /// single-row seek at a time. An empty filter matches every document.
    ///
    /// `filter` is a SQL boolean expression over document columns (e.g.
    /// `size > 100`), forwarded verbatim. It is the caller's responsibility
    /// to supply valid, injection-safe predicate text; a malformed expression
    /// surfaces as [`Sist2Error::Query`] on the first fetch. See
    /// [`DocumentCursor`] for the pagination contract.
    pub fn documents(&self, filter: &str) -> DocumentCursor<'_> {
        DocumentCursor::new(&self.conn, &self.descriptor.root, filter)
    }

    /// Overwrite a document's mtime, size and attribute bag by id.
    ///
    /// The derived path fields are never persisted. Matching zero rows
    /// (unknown id) is not an error.
    pub fn update_document(&self, doc: &Document) -> Result<()> {
        let json_data = serde_json::to_string(&doc.json_data)?;
        let updated = self.conn.execute(
            "UPDATE document SET mtime = ?1, size = ?2, json_data = ?3 WHERE id = ?4",
            params![doc.mtime, doc.size, json_data, doc.id],
        )?;
        debug!("Updated document {} ({} row(s))", doc.id, updated);
        Ok(())
    }

    /// Register an inference model, replacing any previous row with the same
    /// id. See [`ModelSpec`] for the caller contracts stored verbatim.
    pub fn register_model(&self, model: &ModelSpec) -> Result<()> {
        self.conn.execute(
            "REPLACE INTO model (id, name, url, path, size, type) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                model.id,
                model.name,
                model.url,
                model.path,
                model.size,
                model.kind.as_str()
            ],
        )?;
        debug!("Registered model {} ('{}')", model.id, model.name);
        Ok(())
    }

    /// Upsert an embedding, replacing any previous row with the same
    /// `(id, start, end, model_id)` key.
    ///
    /// `start` and `end` are byte offsets into the document's extracted text
    /// content; `end = None` means the span runs to the end of the content.
    /// Encode the vector with [`serialize_float_array`].
    pub fn upsert_embedding(
        &self,
        id: i64,
        start: i64,
        end: Option<i64>,
        model_id: i64,
        embedding: &[u8],
    ) -> Result<()> {
        self.conn.execute(
            "REPLACE INTO embedding (id, start, end, model_id, embedding) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, start, end, model_id, embedding],
        )?;
        Ok(())
    }

    /// Rebuild the derived tag table from every document's `tag` array.
    ///
    /// Not incremental: the table is cleared and fully repopulated, so it is
    /// safe to call repeatedly but costs a pass over all documents each time,
    /// and must be called again after updates that change tags. Backends that
    /// never read the tag table make this a no-op; see [`SearchBackend`].
    pub fn sync_tag_table(&self) -> Result<()> {
        if !self.backend.uses_tag_table() {
            debug!(
                "Skipping tag sync: {:?} backend does not read the tag table",
                self.backend
            );
            return Ok(());
        }

        self.conn.execute("DELETE FROM tag", [])?;
        let inserted = self.conn.execute(
            "REPLACE INTO tag SELECT document.id, json_each.value \
             FROM document, json_each(document.json_data->>'tag')",
            [],
        )?;
        debug!("Synced tag table ({} row(s))", inserted);
        Ok(())
    }

    /// Commit pending writes to durable storage and start the next batch.
    ///
    /// Must be called explicitly; no operation auto-commits. There is no
    /// partial/rollback API; a failed commit is fatal to the current batch.
    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT; BEGIN")?;
        debug!("Committed changes to {}", self.path.display());
        Ok(())
    }
}
