use serde::Serialize;

use crate::models::Note;

/// Client-side split of an owner's full note list into the sections a note
/// list renders. Input order is preserved inside each section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NoteViews {
    pub pinned: Vec<Note>,
    pub regular: Vec<Note>,
    pub archived: Vec<Note>,
    pub trashed: Vec<Note>,
}

impl NoteViews {
    pub fn partition(notes: Vec<Note>) -> Self {
        let mut views = Self::default();
        for note in notes {
            if note.is_trashed {
                views.trashed.push(note);
            } else if note.is_pinned {
                views.pinned.push(note);
            } else if note.is_archived {
                views.archived.push(note);
            } else {
                views.regular.push(note);
            }
        }
        views
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
            && self.regular.is_empty()
            && self.archived.is_empty()
            && self.trashed.is_empty()
    }
}
