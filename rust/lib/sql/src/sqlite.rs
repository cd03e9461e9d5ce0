use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path)
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL for concurrent readers; foreign keys drive association cascades.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

/// Map a statement failure, singling out UNIQUE / PRIMARY KEY violations.
fn exec_error(e: rusqlite::Error) -> SQLError {
    if let rusqlite::Error::SqliteFailure(err, msg) = &e {
        let unique = err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
        if unique {
            // SQLite reports "UNIQUE constraint failed: table.col[, table.col]".
            let text = msg.clone().unwrap_or_else(|| e.to_string());
            let target = text
                .split_once("failed: ")
                .map(|(_, t)| t.trim().to_string())
                .unwrap_or(text);
            return SQLError::UniqueViolation { target };
        }
    }
    SQLError::Execution(e.to_string())
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), row_value_at(row, i)?));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| SQLError::Query(e.to_string()))?);
        }
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = conn
            .execute(sql, param_refs.as_slice())
            .map_err(exec_error)?;

        Ok(affected as u64)
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Value> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_table() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec(
                "CREATE TABLE people (id TEXT PRIMARY KEY, code TEXT NOT NULL UNIQUE, age INTEGER)",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn insert_and_query_roundtrip() {
        let store = store_with_table();
        let n = store
            .exec(
                "INSERT INTO people (id, code, age) VALUES (?1, ?2, ?3)",
                &["p1".into(), "X-0001".into(), Value::Integer(30)],
            )
            .unwrap();
        assert_eq!(n, 1);

        let rows = store
            .query("SELECT id, code, age FROM people WHERE id = ?1", &["p1".into()])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("code"), Some("X-0001"));
        assert_eq!(rows[0].get_i64("age"), Some(30));
    }

    #[test]
    fn duplicate_code_is_unique_violation() {
        let store = store_with_table();
        let insert = "INSERT INTO people (id, code) VALUES (?1, ?2)";
        store.exec(insert, &["p1".into(), "X-0001".into()]).unwrap();

        let err = store
            .exec(insert, &["p2".into(), "X-0001".into()])
            .unwrap_err();
        assert!(err.is_unique_violation_on("people", "code"), "got {err:?}");
    }

    #[test]
    fn duplicate_primary_key_is_unique_violation() {
        let store = store_with_table();
        let insert = "INSERT INTO people (id, code) VALUES (?1, ?2)";
        store.exec(insert, &["p1".into(), "X-0001".into()]).unwrap();

        let err = store
            .exec(insert, &["p1".into(), "X-0002".into()])
            .unwrap_err();
        assert!(err.is_unique_violation_on("people", "id"), "got {err:?}");
        assert!(!err.is_unique_violation_on("people", "code"));
    }

    #[test]
    fn not_null_failure_is_not_unique_violation() {
        let store = store_with_table();
        let err = store
            .exec("INSERT INTO people (id, code) VALUES (?1, NULL)", &["p1".into()])
            .unwrap_err();
        assert!(matches!(err, SQLError::Execution(_)), "got {err:?}");
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let store = store_with_table();
        store
            .exec(
                "CREATE TABLE tags (person_id TEXT NOT NULL REFERENCES people(id) ON DELETE CASCADE)",
                &[],
            )
            .unwrap();
        let err = store
            .exec("INSERT INTO tags (person_id) VALUES (?1)", &["ghost".into()])
            .unwrap_err();
        assert!(matches!(err, SQLError::Execution(_)));
    }

    #[test]
    fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.exec("CREATE TABLE t (v TEXT)", &[]).unwrap();
            store.exec("INSERT INTO t (v) VALUES (?1)", &["kept".into()]).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let rows = store.query("SELECT v FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_str("v"), Some("kept"));
    }
}
