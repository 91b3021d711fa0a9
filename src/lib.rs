pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod util;

pub use errors::{AppError, AppResult};
pub use lifecycle::{NoteLifecycle, NoteViews};
pub use models::{Database, FolderId, NewNote, Note, NoteId, NotePatch, NoteStore};
