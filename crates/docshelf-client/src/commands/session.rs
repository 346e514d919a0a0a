//! Sign-in and sign-out.
//!
//! Partitions are read once per identity change; signing in again as the
//! same user keeps the in-memory state.

use serde::Serialize;
use tracing::{error, info};

use docshelf_shared::types::User;
use docshelf_store::comments::CommentThreads;
use docshelf_store::{Document, StoreError};

use crate::events::{Notice, NoticeVariant};
use crate::state::{AppState, Result, Workspace};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub user: User,
    pub documents: usize,
    pub comment_threads: usize,
}

impl SessionSummary {
    fn of(state: &AppState, user: &User) -> Self {
        Self {
            user: user.clone(),
            documents: state.documents.len(),
            comment_threads: state.comments.len(),
        }
    }
}

impl Workspace {
    pub async fn sign_in(&self, user: User) -> Result<SessionSummary> {
        let result = self.sign_in_inner(user).await;
        self.finish(result, |s| {
            Notice::info("Signed in", format!("Welcome back, {}", s.user.name))
        })
    }

    async fn sign_in_inner(&self, user: User) -> Result<SessionSummary> {
        let mut state = self.state.lock().await;

        if state.user.as_ref().map(|u| u.id) == Some(user.id) {
            state.user = Some(user.clone());
            return Ok(SessionSummary::of(&state, &user));
        }

        // Read before the documents so a failure here issues no handles.
        let categories = self.categories.load()?;

        let documents = match self.documents.load(user.id) {
            Ok(documents) => documents,
            Err(StoreError::Serialization(e)) => {
                error!(user = %user.id, error = %e, "stored documents are unreadable");
                self.notify(unreadable_notice("documents"));
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let comments = match self.comments.load(user.id) {
            Ok(comments) => comments,
            Err(StoreError::Serialization(e)) => {
                error!(user = %user.id, error = %e, "stored comments are unreadable");
                self.notify(unreadable_notice("comments"));
                CommentThreads::new()
            }
            Err(e) => {
                self.release(&documents);
                return Err(e.into());
            }
        };

        self.release(&state.documents);
        state.user = Some(user.clone());
        state.documents = documents;
        state.comments = comments;
        state.categories = categories;

        info!(
            user = %user.id,
            documents = state.documents.len(),
            "session started"
        );
        Ok(SessionSummary::of(&state, &user))
    }

    /// Forget the active user and revoke every handle issued for them.
    pub async fn sign_out(&self) {
        let mut state = self.state.lock().await;
        self.release(&state.documents);
        state.user = None;
        state.documents.clear();
        state.comments.clear();
        info!("session ended");
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.user.clone()
    }

    /// Revoke the transient handles of `documents`.
    pub(crate) fn release(&self, documents: &[Document]) {
        for handle in documents.iter().filter_map(|d| d.handle.as_ref()) {
            if let Err(e) = self.handles().revoke(handle) {
                error!(%handle, error = %e, "failed to revoke handle");
            }
        }
    }
}

fn unreadable_notice(what: &str) -> Notice {
    Notice {
        title: "Something went wrong".to_string(),
        description: format!("Your saved {what} could not be read"),
        variant: NoticeVariant::Destructive,
        retryable: false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use docshelf_shared::types::{Role, UserId};
    use docshelf_store::{MemoryStorage, Storage};

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ClientError;

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId(id),
            name: name.into(),
            email: String::new(),
            role: Role::Member,
        }
    }

    const ONE_DOCUMENT: &str = r#"[{"id":1,"name":"a.txt","category":"General","uploadDate":"2024-01-01","size":"0.00 MB","uploader":"Ada","userId":1,"fileData":"data:text/plain;base64,aGk="}]"#;

    #[tokio::test]
    async fn test_failed_category_read_issues_no_handles() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("app_documents_user_1", ONE_DOCUMENT).unwrap();
        let (ws, _rx) = Workspace::open(storage.clone(), ClientConfig::default()).unwrap();

        storage.set("app_categories", "{broken").unwrap();
        let err = ws.sign_in(user(1, "Ada")).await.unwrap_err();
        assert!(matches!(err, ClientError::Store(StoreError::Serialization(_))));
        assert_eq!(ws.handles().live_count(), 0);
        assert!(ws.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_switching_user_revokes_previous_handles() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("app_documents_user_1", ONE_DOCUMENT).unwrap();
        let (ws, _rx) = Workspace::open(storage, ClientConfig::default()).unwrap();

        let summary = ws.sign_in(user(1, "Ada")).await.unwrap();
        assert_eq!(summary.documents, 1);
        assert_eq!(ws.handles().live_count(), 1);

        let summary = ws.sign_in(user(2, "Bob")).await.unwrap();
        assert_eq!(summary.documents, 0);
        assert_eq!(ws.handles().live_count(), 0);

        ws.sign_out().await;
        assert!(ws.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_documents_start_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set("app_documents_user_1", "{not json").unwrap();
        let (ws, mut rx) = Workspace::open(storage.clone(), ClientConfig::default()).unwrap();

        let summary = ws.sign_in(user(1, "Ada")).await.unwrap();
        assert_eq!(summary.documents, 0);
        assert_eq!(
            storage.get("app_documents_user_1").unwrap().as_deref(),
            Some("{not json")
        );

        let first = rx.try_recv().unwrap();
        assert_eq!(first.variant, NoticeVariant::Destructive);
        assert_eq!(first.description, "Your saved documents could not be read");
    }
}
