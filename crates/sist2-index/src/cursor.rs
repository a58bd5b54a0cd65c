//! Keyset-paginated document iteration.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::document::Document;
use crate::error::Result;

const SELECT_COLUMNS: &str = "SELECT document.id, version, mtime, size, json_data FROM document";

/// Forward-only cursor over documents matching a filter, in ascending id
/// order. Produced by [`Sist2Index::documents`].
///
/// Each step is a single-row seek comparing against the last id seen, so the
/// whole table is never held in memory, and rows appended by a concurrent
/// writer (which always get higher ids) are neither skipped nor duplicated.
///
/// The filter is a caller-supplied SQL boolean expression over document
/// columns (e.g. `size > 100`). It is forwarded verbatim, as an injection-risk
/// trust boundary that is not sanitized here, and a malformed expression surfaces
/// as [`Sist2Error::Query`] from the engine. After an error or the last row,
/// the cursor is fused and yields nothing further.
///
/// Cursors hold no state on the index handle, so any number of independent
/// iterations may coexist on one [`Sist2Index`].
///
/// [`Sist2Index`]: crate::Sist2Index
/// [`Sist2Index::documents`]: crate::Sist2Index::documents
/// [`Sist2Error::Query`]: crate::Sist2Error::Query
pub struct DocumentCursor<'conn> {
    conn: &'conn Connection,
    root: String,
    filter: String,
    last_id: Option<i64>,
    finished: bool,
}

impl<'conn> DocumentCursor<'conn> {
    pub(crate) fn new(conn: &'conn Connection, root: &str, filter: &str) -> Self {
        Self {
            conn,
            root: root.to_string(),
            filter: filter.to_string(),
            last_id: None,
            finished: false,
        }
    }

    fn fetch_next(&self) -> Result<Option<Document>> {
        let sql = match (self.last_id, self.filter.is_empty()) {
            (None, true) => format!("{} ORDER BY document.id LIMIT 1", SELECT_COLUMNS),
            (None, false) => format!(
                "{} WHERE {} ORDER BY document.id LIMIT 1",
                SELECT_COLUMNS, self.filter
            ),
            (Some(_), true) => format!(
                "{} WHERE document.id > ?1 ORDER BY document.id LIMIT 1",
                SELECT_COLUMNS
            ),
            (Some(_), false) => format!(
                "{} WHERE document.id > ?1 AND ({}) ORDER BY document.id LIMIT 1",
                SELECT_COLUMNS, self.filter
            ),
        };

        let row = match self.last_id {
            Some(last_id) => self
                .conn
                .query_row(&sql, params![last_id], Self::row_to_parts),
            None => self.conn.query_row(&sql, [], Self::row_to_parts),
        }
        .optional()?;

        match row {
            Some((id, version, mtime, size, raw_json)) => {
                Document::from_parts(id, version, mtime, size, &raw_json, &self.root).map(Some)
            }
            None => Ok(None),
        }
    }

    #[allow(clippy::type_complexity)]
    fn row_to_parts(row: &Row) -> rusqlite::Result<(i64, i64, i64, i64, String)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    }
}

impl Iterator for DocumentCursor<'_> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fetch_next() {
            Ok(Some(doc)) => {
                self.last_id = Some(doc.id);
                Some(Ok(doc))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
