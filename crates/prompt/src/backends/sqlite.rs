//! SQLite-backed [`StorageBackend`].
//!
//! One table keyed by `(reference, versioning)`; the full record is kept as
//! JSON in `item`. Atomic writes run in an IMMEDIATE transaction so that
//! condition checks and inserts happen under the database write lock.

use crate::backend::{batch_keys, StorageBackend, WriteItem};
use crate::error::BackendError;
use crate::record::Record;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteBackend {
    /// Open (creating if needed) the database at `db_path`.
    pub fn open(db_path: &Path, table: &str) -> Result<Self, BackendError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BackendError::Unavailable(format!(
                        "Failed to create database directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        tracing::debug!("Opened SQLite prompt store at {:?}", db_path);
        Self::with_connection(conn, table)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory(table: &str) -> Result<Self, BackendError> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self, BackendError> {
        check_table_name(table)?;

        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                reference TEXT NOT NULL,
                versioning TEXT NOT NULL,
                item TEXT NOT NULL,
                PRIMARY KEY (reference, versioning)
            );
            "#
        ))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        })
    }

    /// Run `f` with the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &str) -> Result<T, BackendError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table = self.table.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                BackendError::Unavailable("sqlite connection lock poisoned".to_string())
            })?;
            f(&mut guard, &table)
        })
        .await
        .map_err(|e| BackendError::Unavailable(format!("sqlite task failed: {}", e)))?
    }
}

fn check_table_name(table: &str) -> Result<(), BackendError> {
    let valid = table
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(BackendError::Unavailable(format!(
            "invalid table name '{}'",
            table
        )))
    }
}

fn parse_item(json: &str) -> Result<Record, BackendError> {
    serde_json::from_str(json)
        .map_err(|e| BackendError::InvalidRecord(format!("stored item is not a JSON object: {}", e)))
}

#[async_trait::async_trait]
impl StorageBackend for SqliteBackend {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    async fn query(&self, reference: &str, versioning: &str) -> Result<Vec<Record>, BackendError> {
        let reference = reference.to_string();
        let versioning = versioning.to_string();

        self.with_conn(move |conn, table| {
            let mut stmt = conn.prepare(&format!(
                "SELECT item FROM {table} WHERE reference = ?1 AND versioning = ?2"
            ))?;

            let rows = stmt.query_map(params![reference, versioning], |row| {
                row.get::<_, String>(0)
            })?;

            let mut records = Vec::new();
            for row in rows {
                records.push(parse_item(&row?)?);
            }
            Ok(records)
        })
        .await
    }

    async fn atomic_write(&self, items: Vec<WriteItem>) -> Result<(), BackendError> {
        let keys = batch_keys(&items)?;

        self.with_conn(move |conn, table| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            for (item, key) in items.iter().zip(&keys) {
                let Some(condition) = &item.condition else {
                    continue;
                };

                let existing: Option<String> = tx
                    .query_row(
                        &format!(
                            "SELECT item FROM {table} WHERE reference = ?1 AND versioning = ?2"
                        ),
                        params![key.reference, key.versioning],
                        |row| row.get(0),
                    )
                    .optional()?;

                let existing = existing.as_deref().map(parse_item).transpose()?;

                if !condition.holds(existing.as_ref()) {
                    // Dropping `tx` rolls the transaction back.
                    return Err(BackendError::ConditionFailed {
                        reference: key.reference.clone(),
                        versioning: key.versioning.clone(),
                    });
                }
            }

            for (item, key) in items.iter().zip(&keys) {
                let json = serde_json::to_string(&item.record).map_err(|e| {
                    BackendError::InvalidRecord(format!("Failed to serialize record: {}", e))
                })?;

                tx.execute(
                    &format!(
                        "INSERT OR REPLACE INTO {table} (reference, versioning, item) VALUES (?1, ?2, ?3)"
                    ),
                    params![key.reference, key.versioning, json],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}
