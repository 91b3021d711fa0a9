use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::NoteRepository;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// `PRAGMA user_version` written once the schema is current. Databases at
/// version 0 or 1 with the old single-user `notes` table get migrated.
pub const SCHEMA_VERSION: i64 = 2;

pub struct Database {
    connection: Arc<Mutex<Connection>>,
    pub notes: NoteRepository,
}

impl Database {
    /// Opens (creating if needed) the database at `path`. Notes found in a
    /// legacy database are assigned to `legacy_owner`.
    pub fn open<P: AsRef<Path>>(path: P, legacy_owner: &str) -> AppResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(path)?;
        Self::configure(connection, legacy_owner)
    }

    pub fn in_memory() -> AppResult<Self> {
        debug!("opening in-memory database");
        Self::configure(Connection::open_in_memory()?, "local")
    }

    fn configure(connection: Connection, legacy_owner: &str) -> AppResult<Self> {
        if let Err(e) = connection.pragma_update(None, "synchronous", "FULL") {
            warn!(error = %e, "could not set synchronous mode");
        }
        if let Err(e) = connection.pragma_update(None, "journal_mode", "DELETE") {
            warn!(error = %e, "could not set journal mode");
        }
        connection.pragma_update(None, "foreign_keys", "ON")?;

        let connection = Arc::new(Mutex::new(connection));
        let db = Self {
            notes: NoteRepository::new(Arc::clone(&connection)),
            connection,
        };

        db.migrate_database(legacy_owner)?;
        Ok(db)
    }

    pub fn schema_version(&self) -> AppResult<i64> {
        let connection = self.lock()?;
        let version = connection.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| AppError::Storage("database mutex poisoned".to_string()))
    }

    fn migrate_database(&self, legacy_owner: &str) -> AppResult<()> {
        let mut connection = self.lock()?;

        let version: i64 = connection.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            debug!(version, "schema is current");
            return Ok(());
        }

        let legacy = column_exists(&connection, "notes", "id")?
            && !column_exists(&connection, "notes", "user_id")?;

        let tx = connection.transaction()?;
        if legacy {
            info!(owner = legacy_owner, "migrating single-user notes table");
            tx.execute("ALTER TABLE notes RENAME TO notes_legacy", [])?;
            tx.execute_batch(SCHEMA_SQL)?;
            let moved = tx.execute(
                "INSERT INTO notes (
                    id, title, content, user_id, is_pinned, is_archived, is_trashed,
                    last_updated, created_at, tags_json, folder_id
                 )
                 SELECT id, title, content, ?1, 0, 0, 0,
                        CAST(created_at AS INTEGER) * 1000,
                        CAST(created_at AS INTEGER) * 1000,
                        '[]', NULL
                 FROM notes_legacy",
                [legacy_owner],
            )?;
            tx.execute("DROP TABLE notes_legacy", [])?;
            info!(notes = moved, "legacy notes migrated");
        } else {
            tx.execute_batch(SCHEMA_SQL)?;
        }
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;

        info!(from = version, to = SCHEMA_VERSION, "database schema ready");
        Ok(())
    }
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteStore;

    #[test]
    fn fresh_database_is_at_current_version() {
        let db = Database::in_memory().expect("db");
        assert_eq!(db.schema_version().expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn reopening_keeps_existing_notes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("nested").join("notes.db");

        {
            let db = Database::open(&db_path, "local").expect("db");
            db.notes
                .insert(&crate::models::NewNote::new("A", "B", "u1"), 1_000)
                .expect("insert");
        }

        let db = Database::open(&db_path, "local").expect("reopen");
        assert_eq!(db.notes.list_by_user("u1").expect("list").len(), 1);
    }

    #[test]
    fn legacy_single_user_table_is_migrated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("notes.db");

        {
            let conn = Connection::open(&db_path).expect("conn");
            conn.execute_batch(
                "CREATE TABLE notes (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                 );
                 INSERT INTO notes VALUES
                    ('0f8fad5b-d9cb-469f-a165-70867728950e', 'Welcome', 'hello', 1700000000);
                 PRAGMA user_version = 1;",
            )
            .expect("legacy schema");
        }

        let db = Database::open(&db_path, "me").expect("migrate");
        assert_eq!(db.schema_version().expect("version"), SCHEMA_VERSION);

        let notes = db.notes.list_by_user("me").expect("list");
        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert_eq!(note.title, "Welcome");
        assert_eq!(note.created_at, 1_700_000_000_000);
        assert_eq!(note.last_updated, 1_700_000_000_000);
        assert!(!note.is_pinned && !note.is_archived && !note.is_trashed);
        assert!(note.tags.is_empty());
    }
}
