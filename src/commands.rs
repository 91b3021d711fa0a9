use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;
use std::io::Write;

use crate::cli::{edit_patch, Command};
use crate::lifecycle::{Clock, NoteLifecycle};
use crate::models::{NewNote, Note, NoteId, NoteStore};
use crate::util::{format_date, preview};

const PREVIEW_GRAPHEMES: usize = 60;

pub struct Session<'a, S, C> {
    pub notes: &'a NoteLifecycle<S, C>,
    pub user: Option<String>,
    pub json: bool,
    pub trash_retention: chrono::Duration,
}

impl<S: NoteStore, C: Clock> Session<'_, S, C> {
    fn user(&self) -> Result<&str> {
        self.user
            .as_deref()
            .ok_or_else(|| anyhow!("no user given; pass --user or set TAPNOTES_USER"))
    }

    fn fetch(&self, id: NoteId) -> Result<Note> {
        self.notes
            .get_by_id(id)?
            .ok_or_else(|| anyhow!("note {} not found", id))
    }

    pub fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::New {
                title,
                content,
                tags,
                folder,
            } => {
                let mut note = NewNote::new(title, content, self.user()?);
                if !tags.is_empty() {
                    note = note.with_tags(tags);
                }
                if let Some(folder) = folder {
                    note = note.in_folder(folder);
                }
                let id = self.notes.create(note).context("could not create note")?;
                self.report(out, "created", id)
            }
            Command::Edit {
                id,
                title,
                content,
                tags,
                clear_tags,
                folder,
                pinned,
                archived,
            } => {
                let patch = edit_patch(title, content, tags, clear_tags, folder, pinned, archived);
                self.notes
                    .update(id, patch)
                    .with_context(|| format!("could not update note {}", id))?;
                self.report(out, "updated", id)
            }
            Command::Show { id } => {
                let note = self.fetch(id)?;
                if self.json {
                    return write_json(out, &note);
                }
                write_note(out, &note)?;
                if !note.content.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "{}", note.content)?;
                }
                Ok(())
            }
            Command::List => {
                let views = self.notes.views(self.user.as_deref())?;
                if self.json {
                    return write_json(out, &views);
                }
                if views.pinned.is_empty() && views.regular.is_empty() {
                    writeln!(out, "No notes yet. Create one with `tapnotes new <title>`.")?;
                    return Ok(());
                }
                if !views.pinned.is_empty() {
                    writeln!(out, "Pinned")?;
                    write_notes(out, &views.pinned)?;
                    writeln!(out)?;
                }
                writeln!(out, "Notes")?;
                write_notes(out, &views.regular)
            }
            Command::Pinned => self.list(out, self.notes.get_pinned(self.user()?)?, "No pinned notes."),
            Command::Archived => {
                self.list(out, self.notes.get_archived(self.user()?)?, "No archived notes.")
            }
            Command::Trash => self.list(out, self.notes.get_trashed(self.user()?)?, "Trash is empty."),
            Command::Folder { folder } => self.list(
                out,
                self.notes.get_by_folder(self.user()?, &folder)?,
                "No notes in this folder.",
            ),
            Command::Pin { id } => {
                self.notes.toggle_pin(id)?;
                let state = if self.fetch(id)?.is_pinned { "pinned" } else { "unpinned" };
                self.report(out, state, id)
            }
            Command::Archive { id } => {
                self.notes.toggle_archive(id)?;
                let state = if self.fetch(id)?.is_archived {
                    "archived"
                } else {
                    "unarchived"
                };
                self.report(out, state, id)
            }
            Command::Rm { id } => {
                self.notes
                    .trash_note(id)
                    .with_context(|| format!("could not move note {} to trash", id))?;
                self.report(out, "trashed", id)
            }
            Command::Restore { id } => {
                self.notes
                    .restore_note(id)
                    .with_context(|| format!("could not restore note {}", id))?;
                self.report(out, "restored", id)
            }
            Command::Purge { id } => {
                self.notes.delete_note(id)?;
                self.report(out, "deleted", id)
            }
            Command::EmptyTrash { older_than_days } => {
                let retention = older_than_days
                    .map(|days| chrono::Duration::days(i64::from(days)))
                    .unwrap_or(self.trash_retention);
                let removed = self.notes.purge_trash(self.user()?, retention)?;
                if self.json {
                    return write_json(out, &serde_json::json!({ "deleted": removed }));
                }
                writeln!(out, "deleted {} note(s) from trash", removed)?;
                Ok(())
            }
        }
    }

    fn report<W: Write>(&self, out: &mut W, action: &str, id: NoteId) -> Result<()> {
        if self.json {
            return write_json(out, &serde_json::json!({ "action": action, "id": id }));
        }
        writeln!(out, "{} {}", action, id)?;
        Ok(())
    }

    fn list<W: Write>(&self, out: &mut W, notes: Vec<Note>, empty: &str) -> Result<()> {
        if self.json {
            return write_json(out, &notes);
        }
        if notes.is_empty() {
            writeln!(out, "{}", empty)?;
            return Ok(());
        }
        write_notes(out, &notes)
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_notes<W: Write>(out: &mut W, notes: &[Note]) -> Result<()> {
    for note in notes {
        write_note(out, note)?;
    }
    Ok(())
}

fn write_note<W: Write>(out: &mut W, note: &Note) -> Result<()> {
    let mut flags = String::new();
    if note.is_pinned {
        flags.push('P');
    }
    if note.is_archived {
        flags.push('A');
    }
    if note.is_trashed {
        flags.push('T');
    }

    writeln!(out, "{:<3} {}  {}", flags, note.id, note.title)?;

    let mut detail = preview(&note.content, PREVIEW_GRAPHEMES);
    if !note.tags.is_empty() {
        detail.push_str(&format!("  [{}]", note.tags.join(", ")));
    }
    if let Some(folder) = &note.folder_id {
        detail.push_str(&format!("  ({})", folder));
    }
    writeln!(out, "    {}  {}", detail, format_date(note.last_updated))?;
    Ok(())
}
