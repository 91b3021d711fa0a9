mod db;
mod note;
mod note_repository;
mod store;

pub use db::{Database, SCHEMA_VERSION};
pub use note::{FolderId, NewNote, Note, NoteFlag, NoteId, NotePatch};
pub use note_repository::NoteRepository;
pub use store::NoteStore;
