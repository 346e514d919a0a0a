//! Comment commands.
//!
//! Threads are stored in the viewing user's partition.  Deleting a comment is
//! allowed to its author (matched by display name) and to administrators.

use chrono::Local;
use tracing::info;

use docshelf_shared::constants::FALLBACK_AUTHOR;
use docshelf_shared::types::{CommentId, DocumentId};
use docshelf_store::Comment;

use crate::error::ClientError;
use crate::events::Notice;
use crate::state::{Result, Workspace};

impl Workspace {
    pub async fn add_comment(&self, document_id: DocumentId, text: &str) -> Result<Comment> {
        let result = self.add_comment_inner(document_id, text).await;
        self.finish(result, |_| {
            Notice::info("Comment added", "Your comment has been added successfully")
        })
    }

    async fn add_comment_inner(&self, document_id: DocumentId, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("Comment cannot be empty".into()));
        }

        let mut state = self.state.lock().await;
        let user = state.require_user()?.clone();
        state.position(document_id)?;

        let now = Local::now();
        let author_name = if user.name.trim().is_empty() {
            FALLBACK_AUTHOR.to_string()
        } else {
            user.name.clone()
        };
        let comment = Comment {
            id: CommentId(self.ids.next()),
            document_id,
            author_name,
            text: text.to_string(),
            created_date: now.format("%-m/%-d/%Y").to_string(),
            created_time: now.format("%H:%M").to_string(),
        };

        state
            .comments
            .entry(document_id)
            .or_default()
            .push(comment.clone());

        if let Err(e) = self.comments.save(user.id, &state.comments) {
            if let Some(thread) = state.comments.get_mut(&document_id) {
                thread.pop();
            }
            return Err(e.into());
        }

        info!(document_id = %document_id, comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    /// Comments on a document, oldest first.  Threads of deleted documents
    /// remain readable.
    pub async fn comments_for(&self, document_id: DocumentId) -> Result<Vec<Comment>> {
        let state = self.state.lock().await;
        state.require_user()?;
        Ok(state.comments.get(&document_id).cloned().unwrap_or_default())
    }

    pub async fn delete_comment(&self, document_id: DocumentId, comment_id: CommentId) -> Result<()> {
        let result = self.delete_comment_inner(document_id, comment_id).await;
        self.finish(result, |_| Notice::info("Comment deleted", "Comment has been removed"))
    }

    async fn delete_comment_inner(&self, document_id: DocumentId, comment_id: CommentId) -> Result<()> {
        let mut state = self.state.lock().await;
        let user = state.require_user()?.clone();

        let thread = state
            .comments
            .get_mut(&document_id)
            .ok_or_else(|| ClientError::not_found("comment", comment_id))?;
        let idx = thread
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| ClientError::not_found("comment", comment_id))?;

        if thread[idx].author_name != user.name && !user.is_elevated() {
            return Err(ClientError::Forbidden(
                "Only the author or an administrator can delete this comment".into(),
            ));
        }

        let removed = thread.remove(idx);
        if let Err(e) = self.comments.save(user.id, &state.comments) {
            if let Some(thread) = state.comments.get_mut(&document_id) {
                thread.insert(idx, removed);
            }
            return Err(e.into());
        }

        info!(document_id = %document_id, comment_id = %comment_id, "comment deleted");
        Ok(())
    }
}
