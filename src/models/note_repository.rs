use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{FolderId, NewNote, Note, NoteFlag, NoteId, NotePatch, NoteStore};

const NOTE_COLUMNS: &str = "id, title, content, user_id, is_pinned, is_archived, is_trashed, \
                            last_updated, created_at, tags_json, folder_id";

const NEWEST_FIRST: &str = "ORDER BY last_updated DESC, created_at DESC";

/// SQLite-backed note store sharing one connection with its `Database`.
#[derive(Clone)]
pub struct NoteRepository {
    connection: Arc<Mutex<Connection>>,
}

impl NoteRepository {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|e| {
            warn!(error = %e, "failed to lock database connection");
            AppError::Storage("database mutex poisoned".to_string())
        })
    }

    fn query_notes(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> AppResult<Vec<Note>> {
        let connection = self.lock()?;
        let mut stmt = connection.prepare(sql)?;
        let notes = stmt
            .query_map(params, parse_note_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}

impl NoteStore for NoteRepository {
    fn insert(&self, note: &NewNote, now: i64) -> AppResult<NoteId> {
        let id = NoteId::new();
        let tags = note.tags.as_deref().unwrap_or_default();
        let tags_json = serde_json::to_string(tags)?;

        let mut connection = self.lock()?;
        let tx = connection.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO notes ({}) VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?5, ?6, ?7)",
                NOTE_COLUMNS
            ),
            params![
                id.to_string(),
                note.title,
                note.content,
                note.user_id,
                now,
                tags_json,
                note.folder_id.as_ref().map(FolderId::as_str),
            ],
        )?;
        tx.commit()?;

        debug!(note_id = %id, "inserted note");
        Ok(id)
    }

    fn get(&self, id: NoteId) -> AppResult<Option<Note>> {
        let connection = self.lock()?;
        let note = connection
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                [id.to_string()],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn patch(&self, id: NoteId, patch: &NotePatch, now: i64) -> AppResult<()> {
        let tags_json = patch.tags.as_ref().map(serde_json::to_string).transpose()?;

        let connection = self.lock()?;
        let rows = connection.execute(
            "UPDATE notes SET
                title = COALESCE(?1, title),
                content = COALESCE(?2, content),
                is_archived = COALESCE(?3, is_archived),
                is_pinned = COALESCE(?4, is_pinned),
                tags_json = COALESCE(?5, tags_json),
                folder_id = COALESCE(?6, folder_id),
                last_updated = MAX(?7, last_updated + 1)
             WHERE id = ?8",
            params![
                patch.title,
                patch.content,
                patch.is_archived,
                patch.is_pinned,
                tags_json,
                patch.folder_id.as_ref().map(FolderId::as_str),
                now,
                id.to_string(),
            ],
        )?;

        if rows == 0 {
            return Err(AppError::NotFound(format!("note {}", id)));
        }
        Ok(())
    }

    fn set_flag(&self, id: NoteId, flag: NoteFlag, value: bool, now: i64) -> AppResult<()> {
        let connection = self.lock()?;
        let rows = connection.execute(
            &format!(
                "UPDATE notes SET {col} = ?1, last_updated = MAX(?2, last_updated + 1) WHERE id = ?3",
                col = flag.column()
            ),
            params![value, now, id.to_string()],
        )?;

        if rows == 0 {
            return Err(AppError::NotFound(format!("note {}", id)));
        }
        Ok(())
    }

    fn toggle_flag(&self, id: NoteId, flag: NoteFlag, now: i64) -> AppResult<bool> {
        let connection = self.lock()?;
        let value = connection
            .query_row(
                &format!(
                    "UPDATE notes
                     SET {col} = NOT COALESCE({col}, 0), last_updated = MAX(?1, last_updated + 1)
                     WHERE id = ?2
                     RETURNING {col}",
                    col = flag.column()
                ),
                params![now, id.to_string()],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;

        value.ok_or_else(|| AppError::NotFound(format!("note {}", id)))
    }

    fn delete(&self, id: NoteId) -> AppResult<()> {
        let connection = self.lock()?;
        let rows = connection.execute("DELETE FROM notes WHERE id = ?1", [id.to_string()])?;
        if rows == 0 {
            debug!(note_id = %id, "delete matched no note");
        }
        Ok(())
    }

    fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {} FROM notes WHERE user_id = ?1 {}",
                NOTE_COLUMNS, NEWEST_FIRST
            ),
            params![user_id],
        )
    }

    fn list_by_folder(&self, folder_id: &FolderId) -> AppResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {} FROM notes WHERE folder_id = ?1 {}",
                NOTE_COLUMNS, NEWEST_FIRST
            ),
            params![folder_id.as_str()],
        )
    }

    fn list_by_flag(&self, user_id: &str, flag: NoteFlag) -> AppResult<Vec<Note>> {
        self.query_notes(
            &format!(
                "SELECT {} FROM notes WHERE user_id = ?1 AND {} = 1 {}",
                NOTE_COLUMNS,
                flag.column(),
                NEWEST_FIRST
            ),
            params![user_id],
        )
    }

    fn delete_trashed_before(&self, user_id: &str, cutoff: i64) -> AppResult<usize> {
        let connection = self.lock()?;
        let rows = connection.execute(
            "DELETE FROM notes WHERE user_id = ?1 AND is_trashed = 1 AND last_updated < ?2",
            params![user_id, cutoff],
        )?;
        Ok(rows)
    }
}

fn parse_note_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|e| conversion_failure(0, rusqlite::types::Type::Text, e))?;

    let tags_json: String = row.get(9)?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_json)
        .map_err(|e| conversion_failure(9, rusqlite::types::Type::Text, e))?;

    Ok(Note {
        id: NoteId::from(id),
        title: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
        is_pinned: row.get(4)?,
        is_archived: row.get(5)?,
        is_trashed: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
        last_updated: row.get(7)?,
        created_at: row.get(8)?,
        tags,
        folder_id: row.get::<_, Option<String>>(10)?.map(|raw| FolderId::from(raw.as_str())),
    })
}

fn conversion_failure<E>(column: usize, ty: rusqlite::types::Type, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(error))
}
