//! Per-user comment partitions.
//!
//! Stored under `app_comments_user_<id>` as a JSON object mapping document
//! ids to comment arrays.  The partition belongs to the *viewing* user, so a
//! comment is only visible to whoever was signed in when it was written.

use std::collections::BTreeMap;
use std::sync::Arc;

use docshelf_shared::constants::comments_key;
use docshelf_shared::types::{DocumentId, UserId};

use crate::error::Result;
use crate::models::{Comment, StoredComment};
use crate::storage::Storage;

/// Comment threads keyed by document.
pub type CommentThreads = BTreeMap<DocumentId, Vec<Comment>>;

pub struct CommentStore {
    storage: Arc<dyn Storage>,
}

impl CommentStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn load(&self, user: UserId) -> Result<CommentThreads> {
        let Some(text) = self.storage.get(&comments_key(user.0))? else {
            return Ok(CommentThreads::new());
        };

        let raw: BTreeMap<String, Vec<StoredComment>> = serde_json::from_str(&text)?;

        let mut threads = CommentThreads::new();
        for (key, rows) in raw {
            let Ok(document_id) = key.parse::<DocumentId>() else {
                tracing::warn!(%user, key = %key, "skipping comment thread with non-numeric key");
                continue;
            };
            let thread = rows
                .into_iter()
                .map(|row| Comment::from_stored(document_id, row))
                .collect();
            threads.insert(document_id, thread);
        }

        tracing::debug!(%user, threads = threads.len(), "loaded comments");
        Ok(threads)
    }

    /// Overwrite the whole partition.  Empty threads are not written.
    pub fn save(&self, user: UserId, threads: &CommentThreads) -> Result<()> {
        let raw: BTreeMap<String, Vec<StoredComment>> = threads
            .iter()
            .filter(|(_, thread)| !thread.is_empty())
            .map(|(id, thread)| (id.to_string(), thread.iter().map(Comment::to_stored).collect()))
            .collect();

        let text = serde_json::to_string(&raw)?;
        self.storage.set(&comments_key(user.0), &text)
    }

    pub fn clear(&self, user: UserId) -> Result<bool> {
        self.storage.delete(&comments_key(user.0))
    }
}
