use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{FolderId, NoteId, NotePatch};

#[derive(Parser, Debug)]
#[command(name = "tapnotes", version, about = "Personal notes in a local SQLite database")]
pub struct Cli {
    /// Configuration file (defaults to ~/.tap/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Owner whose notes are read and created
    #[arg(long, short, env = "TAPNOTES_USER", global = true)]
    pub user: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a note
    New {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        folder: Option<FolderId>,
    },
    /// Change fields of a note
    Edit {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replaces all tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
        #[arg(long)]
        folder: Option<FolderId>,
        #[arg(long)]
        pinned: Option<bool>,
        #[arg(long)]
        archived: Option<bool>,
    },
    /// Show one note
    Show { id: NoteId },
    /// Pinned notes, then everything not archived or trashed
    List,
    Pinned,
    Archived,
    /// Notes in the trash
    Trash,
    /// Notes in a folder
    Folder { folder: FolderId },
    /// Pin or unpin
    Pin { id: NoteId },
    /// Archive or unarchive
    Archive { id: NoteId },
    /// Move to trash
    Rm { id: NoteId },
    /// Bring back from trash
    Restore { id: NoteId },
    /// Delete permanently
    Purge { id: NoteId },
    /// Permanently delete trashed notes older than the retention period
    EmptyTrash {
        #[arg(long)]
        older_than_days: Option<u32>,
    },
}

/// Builds the patch for `edit`. An empty `tags` leaves tags alone unless
/// `clear_tags` is set.
pub fn edit_patch(
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
    folder: Option<FolderId>,
    pinned: Option<bool>,
    archived: Option<bool>,
) -> NotePatch {
    let tags = if !tags.is_empty() {
        Some(tags)
    } else if clear_tags {
        Some(Vec::new())
    } else {
        None
    };

    NotePatch {
        title,
        content,
        is_archived: archived,
        is_pinned: pinned,
        tags,
        folder_id: folder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_new_with_tags() {
        let cli = Cli::try_parse_from([
            "tapnotes", "--user", "u1", "new", "Groceries", "--content", "milk", "--tag", "home",
            "--tag", "errands",
        ])
        .expect("parse");

        assert_eq!(cli.user.as_deref(), Some("u1"));
        assert_eq!(
            cli.command,
            Command::New {
                title: "Groceries".to_string(),
                content: "milk".to_string(),
                tags: vec!["home".to_string(), "errands".to_string()],
                folder: None,
            }
        );
    }

    #[test]
    fn rejects_malformed_note_id() {
        assert!(Cli::try_parse_from(["tapnotes", "pin", "nope"]).is_err());
    }

    #[test]
    fn clear_tags_conflicts_with_tags() {
        let id = NoteId::new().to_string();
        assert!(
            Cli::try_parse_from(["tapnotes", "edit", id.as_str(), "--tag", "a", "--clear-tags"]).is_err()
        );
    }

    #[test]
    fn edit_patch_handles_tag_modes() {
        let untouched = edit_patch(None, None, Vec::new(), false, None, None, None);
        assert!(untouched.is_empty());

        let cleared = edit_patch(None, None, Vec::new(), true, None, None, None);
        assert_eq!(cleared.tags, Some(Vec::new()));

        let replaced = edit_patch(None, None, vec!["a".into()], false, None, Some(true), None);
        assert_eq!(replaced.tags, Some(vec!["a".to_string()]));
        assert_eq!(replaced.is_pinned, Some(true));
    }
}
