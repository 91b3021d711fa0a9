use crate::errors::AppResult;
use crate::models::{FolderId, NewNote, Note, NoteFlag, NoteId, NotePatch};

/// Durable home of notes. Implementations own indexing and read consistency.
///
/// Every mutating call receives the caller's clock reading in epoch
/// milliseconds. Stores write `max(now, previous + 1)` so a note's
/// `last_updated` never goes backwards.
pub trait NoteStore {
    fn insert(&self, note: &NewNote, now: i64) -> AppResult<NoteId>;

    fn get(&self, id: NoteId) -> AppResult<Option<Note>>;

    /// Fails with `NotFound` when no note has this id.
    fn patch(&self, id: NoteId, patch: &NotePatch, now: i64) -> AppResult<()>;

    /// Fails with `NotFound` when no note has this id.
    fn set_flag(&self, id: NoteId, flag: NoteFlag, value: bool, now: i64) -> AppResult<()>;

    /// Flips the flag in a single conditional write and returns the new value.
    fn toggle_flag(&self, id: NoteId, flag: NoteFlag, now: i64) -> AppResult<bool>;

    /// Deleting an unknown id is not an error.
    fn delete(&self, id: NoteId) -> AppResult<()>;

    /// Newest first.
    fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Note>>;

    /// Folder index scan across all owners, newest first.
    fn list_by_folder(&self, folder_id: &FolderId) -> AppResult<Vec<Note>>;

    /// Notes of `user_id` with `flag` set, newest first.
    fn list_by_flag(&self, user_id: &str, flag: NoteFlag) -> AppResult<Vec<Note>>;

    /// Permanently removes trashed notes of `user_id` last touched before `cutoff`.
    fn delete_trashed_before(&self, user_id: &str, cutoff: i64) -> AppResult<usize>;
}
