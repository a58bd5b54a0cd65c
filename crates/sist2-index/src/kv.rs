//! Value type for the script-level key-value table.

use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Value accepted by the key-value table: a string or an integer.
///
/// SQLite stores both in the text-typed `value` column, so reads always come
/// back as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KvValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for KvValue {
    fn from(value: &str) -> Self {
        KvValue::Text(value.to_string())
    }
}

impl From<String> for KvValue {
    fn from(value: String) -> Self {
        KvValue::Text(value)
    }
}

impl From<i64> for KvValue {
    fn from(value: i64) -> Self {
        KvValue::Integer(value)
    }
}

impl ToSql for KvValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            KvValue::Text(s) => s.to_sql(),
            KvValue::Integer(i) => i.to_sql(),
        }
    }
}
