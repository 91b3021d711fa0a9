use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NoteId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NoteId {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|e| AppError::InvalidInput(format!("invalid note id '{}': {}", raw, e)))
    }
}

/// Reference to a folder record. Never checked against the folders table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FolderId {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput("folder id must not be empty".to_string()));
        }
        Ok(Self(raw.to_string()))
    }
}

impl From<&str> for FolderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub is_pinned: bool,
    pub is_archived: bool,
    #[serde(default)]
    pub is_trashed: bool,
    /// Epoch milliseconds.
    pub last_updated: i64,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
}

/// Input for creating a note. Flags are not part of it: new notes always
/// start unpinned, unarchived and out of the trash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub tags: Option<Vec<String>>,
    pub folder_id: Option<FolderId>,
}

impl NewNote {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            user_id: user_id.into(),
            tags: None,
            folder_id: None,
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn in_folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_archived: Option<bool>,
    pub is_pinned: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub folder_id: Option<FolderId>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteFlag {
    Pinned,
    Archived,
    Trashed,
}

impl NoteFlag {
    pub fn column(self) -> &'static str {
        match self {
            Self::Pinned => "is_pinned",
            Self::Archived => "is_archived",
            Self::Trashed => "is_trashed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pinned => "pinned",
            Self::Archived => "archived",
            Self::Trashed => "trashed",
        }
    }
}
