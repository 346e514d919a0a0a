use std::collections::{BTreeMap, HashSet};

use docshelf_shared::constants::{comments_key, documents_key};
use docshelf_shared::types::{CommentId, DocumentId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::models::{StoredComment, StoredDocument};
use crate::storage::Storage;

/// Snapshot of one user's partitions, in their stored form.  Blobs stay
/// encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    /// RFC 3339 timestamp of when the backup was created
    pub created_at: String,
    /// App version that produced the backup
    pub version: String,
    pub user_id: UserId,
    pub documents: Vec<StoredDocument>,
    pub comments: BTreeMap<String, Vec<StoredComment>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportStats {
    pub documents_imported: usize,
    pub comments_imported: usize,
}

pub fn export_partition(storage: &dyn Storage, user: UserId) -> Result<BackupPayload> {
    let documents = match storage.get(&documents_key(user.0))? {
        Some(text) => serde_json::from_str(&text)?,
        None => Vec::new(),
    };
    let comments = match storage.get(&comments_key(user.0))? {
        Some(text) => serde_json::from_str(&text)?,
        None => BTreeMap::new(),
    };

    Ok(BackupPayload {
        created_at: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        user_id: user,
        documents,
        comments,
    })
}

/// Merge a backup into `user`'s partitions.  Documents and comments whose id
/// already exists are kept as they are; new documents are appended after the
/// existing ones.
pub fn import_partition(
    storage: &dyn Storage,
    user: UserId,
    payload: &BackupPayload,
) -> Result<ImportStats> {
    if payload.user_id != user {
        return Err(StoreError::PartitionMismatch {
            expected: user,
            found: payload.user_id,
        });
    }

    let mut stats = ImportStats::default();
    let existing = export_partition(storage, user)?;

    let mut documents = existing.documents;
    let mut known: HashSet<DocumentId> = documents.iter().map(|d| d.id).collect();
    for doc in &payload.documents {
        if doc.user_id != user {
            tracing::warn!(document_id = %doc.id, found = %doc.user_id, "skipping foreign document in backup");
            continue;
        }
        if known.insert(doc.id) {
            documents.push(doc.clone());
            stats.documents_imported += 1;
        }
    }

    let mut comments = existing.comments;
    for (doc_key, incoming) in &payload.comments {
        let thread = comments.entry(doc_key.clone()).or_default();
        let mut seen: HashSet<CommentId> = thread.iter().map(|c| c.id).collect();
        for comment in incoming {
            if seen.insert(comment.id) {
                thread.push(comment.clone());
                stats.comments_imported += 1;
            }
        }
    }

    let documents_text = serde_json::to_string(&documents)?;
    let comments_text = serde_json::to_string(&comments)?;
    let (documents_at, comments_at) = (documents_key(user.0), comments_key(user.0));
    write_both(
        storage,
        (documents_at.as_str(), documents_text.as_str()),
        (comments_at.as_str(), comments_text.as_str()),
    )?;

    tracing::info!(
        %user,
        documents = stats.documents_imported,
        comments = stats.comments_imported,
        "imported backup"
    );
    Ok(stats)
}

/// Write two keys so that either both change or neither does.
fn write_both(storage: &dyn Storage, first: (&str, &str), second: (&str, &str)) -> Result<()> {
    let previous = storage.get(first.0)?;
    storage.set(first.0, first.1)?;

    if let Err(e) = storage.set(second.0, second.1) {
        let restored = match &previous {
            Some(text) => storage.set(first.0, text),
            None => storage.delete(first.0).map(|_| ()),
        };
        if let Err(restore) = restored {
            tracing::error!(key = first.0, error = %restore, "failed to restore partition after aborted import");
        }
        return Err(e);
    }
    Ok(())
}
