//! Domain models and their persisted row shapes.
//!
//! In-memory models carry typed fields and explicit optionality; the
//! `Stored*` rows mirror the JSON layout kept under each storage key.

use docshelf_shared::codec::Blob;
use docshelf_shared::types::{CategoryId, CommentId, DocumentId, UserId};
use serde::{Deserialize, Serialize};

use crate::handles::BlobHandle;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Whether a document's binary content is in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobState {
    Present(Blob),
    /// Never stored, or the stored encoding could not be decoded.
    Unavailable,
}

impl BlobState {
    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            BlobState::Present(blob) => Some(blob),
            BlobState::Unavailable => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, BlobState::Present(_))
    }
}

/// An uploaded file and its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    /// Display name; editable independently of the original file name.
    pub name: String,
    /// Free-form category name; may reference a deleted category.
    pub category: String,
    /// ISO calendar date (`YYYY-MM-DD`) fixed at creation.
    pub upload_date: String,
    /// Display size computed at creation.
    pub size: String,
    /// Name of the uploading user at creation time.
    pub uploader: String,
    /// Partition this document lives in.
    pub owner: UserId,
    pub blob: BlobState,
    /// Session-local handle for `blob`; never persisted.
    pub handle: Option<BlobHandle>,
}

/// Persisted form of a [`Document`] (one element of the partition array).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: DocumentId,
    pub name: String,
    pub category: String,
    pub upload_date: String,
    pub size: String,
    pub uploader: String,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment attached to a document.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    /// Not checked against the document set; comments may outlive documents.
    pub document_id: DocumentId,
    pub author_name: String,
    pub text: String,
    pub created_date: String,
    pub created_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredComment {
    pub id: CommentId,
    pub user: String,
    pub comment: String,
    pub date: String,
    pub time: String,
}

impl Comment {
    pub fn from_stored(document_id: DocumentId, row: StoredComment) -> Self {
        Self {
            id: row.id,
            document_id,
            author_name: row.user,
            text: row.comment,
            created_date: row.date,
            created_time: row.time,
        }
    }

    pub fn to_stored(&self) -> StoredComment {
        StoredComment {
            id: self.id,
            user: self.author_name.clone(),
            comment: self.text.clone(),
            date: self.created_date.clone(),
            time: self.created_time.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A named category.  `document_count` is derived by
/// [`projection::project_counts`](crate::projection::project_counts) and is
/// never trusted from storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub document_count: usize,
    pub color: String,
}
