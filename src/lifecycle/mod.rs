//! Note lifecycle: creation, edits, trash and restore, flag toggles and the
//! owner-scoped read queries. Defaults and timestamp bookkeeping happen here;
//! persistence is delegated to a [`NoteStore`].

mod clock;
mod views;

pub use clock::{Clock, ManualClock, SystemClock};
pub use views::NoteViews;

use chrono::Duration;
use tracing::{debug, info};

use crate::errors::AppResult;
use crate::models::{FolderId, NewNote, Note, NoteFlag, NoteId, NotePatch, NoteStore};

pub struct NoteLifecycle<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: NoteStore> NoteLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: NoteStore, C: Clock> NoteLifecycle<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn create(&self, note: NewNote) -> AppResult<NoteId> {
        let now = self.clock.now_millis();
        let id = self.store.insert(&note, now)?;
        info!(note_id = %id, user_id = %note.user_id, "note created");
        Ok(id)
    }

    /// Applies the supplied fields. `last_updated` is refreshed even when the
    /// patch is empty.
    pub fn update(&self, id: NoteId, patch: NotePatch) -> AppResult<NoteId> {
        let now = self.clock.now_millis();
        self.store.patch(id, &patch, now)?;
        debug!(note_id = %id, "note updated");
        Ok(id)
    }

    pub fn trash_note(&self, id: NoteId) -> AppResult<NoteId> {
        self.store
            .set_flag(id, NoteFlag::Trashed, true, self.clock.now_millis())?;
        info!(note_id = %id, "note moved to trash");
        Ok(id)
    }

    pub fn restore_note(&self, id: NoteId) -> AppResult<NoteId> {
        self.store
            .set_flag(id, NoteFlag::Trashed, false, self.clock.now_millis())?;
        info!(note_id = %id, "note restored from trash");
        Ok(id)
    }

    /// Irreversible.
    pub fn delete_note(&self, id: NoteId) -> AppResult<()> {
        self.store.delete(id)?;
        info!(note_id = %id, "note deleted permanently");
        Ok(())
    }

    pub fn toggle_pin(&self, id: NoteId) -> AppResult<NoteId> {
        self.toggle(id, NoteFlag::Pinned)
    }

    pub fn toggle_archive(&self, id: NoteId) -> AppResult<NoteId> {
        self.toggle(id, NoteFlag::Archived)
    }

    fn toggle(&self, id: NoteId, flag: NoteFlag) -> AppResult<NoteId> {
        let value = self.store.toggle_flag(id, flag, self.clock.now_millis())?;
        debug!(note_id = %id, flag = flag.as_str(), value, "note flag toggled");
        Ok(id)
    }

    pub fn get_by_id(&self, id: NoteId) -> AppResult<Option<Note>> {
        self.store.get(id)
    }

    /// Every note of the owner, newest first, trashed and archived included.
    /// No owner means no notes.
    pub fn get_by_user(&self, user_id: Option<&str>) -> AppResult<Vec<Note>> {
        match user_id {
            Some(user_id) => self.store.list_by_user(user_id),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_by_folder(&self, user_id: &str, folder_id: &FolderId) -> AppResult<Vec<Note>> {
        let notes = self.store.list_by_folder(folder_id)?;
        Ok(notes.into_iter().filter(|n| n.user_id == user_id).collect())
    }

    pub fn get_archived(&self, user_id: &str) -> AppResult<Vec<Note>> {
        self.store.list_by_flag(user_id, NoteFlag::Archived)
    }

    pub fn get_pinned(&self, user_id: &str) -> AppResult<Vec<Note>> {
        self.store.list_by_flag(user_id, NoteFlag::Pinned)
    }

    pub fn get_trashed(&self, user_id: &str) -> AppResult<Vec<Note>> {
        self.store.list_by_flag(user_id, NoteFlag::Trashed)
    }

    /// Sections of the owner's list view, computed from `get_by_user`.
    pub fn views(&self, user_id: Option<&str>) -> AppResult<NoteViews> {
        Ok(NoteViews::partition(self.get_by_user(user_id)?))
    }

    /// Permanently deletes the owner's trashed notes untouched for longer than
    /// `retention`. Only runs when called.
    pub fn purge_trash(&self, user_id: &str, retention: Duration) -> AppResult<usize> {
        let cutoff = self.clock.now_millis() - retention.num_milliseconds();
        let removed = self.store.delete_trashed_before(user_id, cutoff)?;
        info!(user_id, removed, cutoff, "trash purged");
        Ok(removed)
    }
}
