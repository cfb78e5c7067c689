use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::types::ValueRef;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite
/// (bundled SQLite). A single connection is shared behind a mutex;
/// statements from concurrent requests serialize on it.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path).map_err(|e| SQLError::Open(e.to_string()))?;

        // WAL keeps readers from blocking on writers.
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| SQLError::Open(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn = Connection::open_in_memory().map_err(|e| SQLError::Open(e.to_string()))?;
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

/// Read a column from a rusqlite row without guessing types.
fn column_value(row: &rusqlite::Row, idx: usize) -> Result<Value, rusqlite::Error> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    };
    Ok(value)
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
                    columns.push((name.clone(), column_value(row, i)?));
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
            .map_err(|e| SQLError::Exec(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = conn
            .execute(sql, param_refs.as_slice())
            .map_err(|e| SQLError::Exec(e.to_string()))?;

        Ok(affected as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let s = SqliteStore::open_in_memory().unwrap();
        s.exec(
            "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER, x REAL, note TEXT)",
            &[],
        )
        .unwrap();
        s
    }

    #[test]
    fn test_query_and_exec() {
        let s = store();
        let affected = s
            .exec(
                "INSERT INTO t (id, n, x, note) VALUES (?, ?, ?, ?)",
                &[
                    Value::Text("a".into()),
                    Value::Integer(7),
                    Value::Real(1.5),
                    Value::Null,
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = s
            .query("SELECT id, n, x, note FROM t WHERE id = ?", &[Value::Text("a".into())])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("id"), Some("a"));
        assert_eq!(rows[0].get_i64("n"), Some(7));
        assert_eq!(rows[0].get_f64("x"), Some(1.5));
        assert_eq!(rows[0].get("note"), Some(&Value::Null));
    }

    #[test]
    fn test_unique_violation_message() {
        let s = store();
        s.exec("INSERT INTO t (id) VALUES (?)", &[Value::Text("a".into())])
            .unwrap();
        let err = s
            .exec("INSERT INTO t (id) VALUES (?)", &[Value::Text("a".into())])
            .unwrap_err();
        // The service layer maps conflicts by matching this text.
        assert!(err.to_string().contains("UNIQUE constraint"));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let s = SqliteStore::open(&path).unwrap();
        s.exec("CREATE TABLE t (id TEXT PRIMARY KEY)", &[]).unwrap();
        s.exec("INSERT INTO t (id) VALUES (?)", &[Value::Text("x".into())])
            .unwrap();

        drop(s);
        let s = SqliteStore::open(&path).unwrap();
        let rows = s.query("SELECT id FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
