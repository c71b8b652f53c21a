// SQLite backend over a single `todos(title)` table

use crate::error::{DbResultExt, Result};
use crate::store::{TodoStore, survivors};
use crate::task::{RemoveSpec, Task, validate_title};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Task list stored as rows of `todos(title TEXT NOT NULL)`.
///
/// Display order is insertion order, read back with `ORDER BY rowid`. Rows
/// are only ever appended, so SQLite assigns each new row a rowid greater
/// than every existing one.
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    /// Open or create the database file and ensure the table exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = Connection::open(path).db_context(format!("Failed to open SQLite database {}", path.display()))?;

        let store = Self { db };
        store.create_schema()?;
        debug!(?path, "Opened todo database");
        Ok(store)
    }

    /// In-memory store, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().db_context("Failed to open in-memory database")?;
        let store = Self { db };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS todos (
                    title TEXT NOT NULL
                );
                "#,
            )
            .db_context("Failed to create todos table")
    }

    fn titles(conn: &Connection) -> Result<Vec<(i64, String)>> {
        let mut stmt = conn
            .prepare("SELECT rowid, title FROM todos ORDER BY rowid")
            .db_context("Failed to prepare todo query")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .db_context("Failed to query todos")?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.db_context("Failed to read todo row")?);
        }
        Ok(results)
    }
}

impl TodoStore for SqliteStore {
    fn list(&mut self) -> Result<Vec<Task>> {
        let rows = Self::titles(&self.db)?;
        Ok(Task::number(rows.into_iter().map(|(_, title)| title)))
    }

    fn append(&mut self, title: &str) -> Result<usize> {
        validate_title(title)?;

        let tx = self.db.transaction().db_context("Failed to begin transaction")?;
        tx.execute("INSERT INTO todos (title) VALUES (?1)", [title])
            .db_context("Failed to insert todo")?;
        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))
            .db_context("Failed to count todos")?;
        tx.commit().db_context("Failed to commit insert")?;

        debug!(ordinal = count, "Inserted task");
        Ok(count as usize)
    }

    fn remove(&mut self, spec: &RemoveSpec) -> Result<usize> {
        if spec.is_all() {
            self.db
                .execute("DELETE FROM todos", [])
                .db_context("Failed to delete todos")?;
            info!("Cleared todo table");
            return Ok(0);
        }

        // Ordinals are derived and applied within one transaction
        let tx = self.db.transaction().db_context("Failed to begin transaction")?;
        let rows = Self::titles(&tx)?;
        let (kept, removed) = survivors(rows.into_iter().map(|(rowid, _)| rowid), spec);

        for rowid in &removed {
            tx.execute("DELETE FROM todos WHERE rowid = ?1", [rowid])
                .db_context("Failed to delete todo")?;
        }
        tx.commit().db_context("Failed to commit delete")?;

        info!(removed = removed.len(), remaining = kept.len(), "Removed tasks");
        Ok(kept.len())
    }
}
