//! Application state shared across all commands.
//!
//! The [`Workspace`] owns the stores and the in-memory view of the signed-in
//! user's data.  Every mutating command takes the state lock, applies the
//! change, persists it, and rolls the in-memory change back if persisting
//! fails, so memory and storage never disagree once the command returns.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};

use docshelf_shared::types::{DocumentId, IdGenerator, User};
use docshelf_store::comments::CommentThreads;
use docshelf_store::{
    Category, CategoryRegistry, CommentStore, Document, DocumentStore, HandleRegistry, Storage,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{Notice, NoticeSender};

pub type Result<T> = std::result::Result<T, ClientError>;

/// In-memory view of the active session.
#[derive(Debug, Default)]
pub struct AppState {
    /// `None` until a user signs in.
    pub user: Option<User>,
    /// Most recent first.
    pub documents: Vec<Document>,
    pub comments: CommentThreads,
    /// Registry order; `document_count` is not maintained here.
    pub categories: Vec<Category>,
}

impl AppState {
    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(ClientError::NotSignedIn)
    }

    pub fn position(&self, id: DocumentId) -> Result<usize> {
        self.documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ClientError::not_found("document", id))
    }
}

/// Document metadata without the blob, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub category: String,
    pub upload_date: String,
    pub size: String,
    pub uploader: String,
    pub available: bool,
    pub handle: Option<String>,
}

impl From<&Document> for DocumentSummary {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            category: d.category.clone(),
            upload_date: d.upload_date.clone(),
            size: d.size.clone(),
            uploader: d.uploader.clone(),
            available: d.blob.is_present(),
            handle: d.handle.as_ref().map(|h| h.to_string()),
        }
    }
}

pub struct Workspace {
    pub(crate) state: Mutex<AppState>,
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) documents: DocumentStore,
    pub(crate) comments: CommentStore,
    pub(crate) categories: CategoryRegistry,
    pub(crate) ids: IdGenerator,
    pub(crate) config: ClientConfig,
    notices: NoticeSender,
}

impl Workspace {
    /// Build a workspace over `storage` and load the category registry.
    pub fn open(
        storage: Arc<dyn Storage>,
        config: ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notice>)> {
        let handles = HandleRegistry::new();
        let categories = CategoryRegistry::new(storage.clone());
        let state = AppState {
            categories: categories.load()?,
            ..AppState::default()
        };
        let (notices, rx) = NoticeSender::channel();

        let workspace = Self {
            state: Mutex::new(state),
            documents: DocumentStore::new(storage.clone(), handles),
            comments: CommentStore::new(storage.clone()),
            categories,
            storage,
            ids: IdGenerator::new(),
            config,
            notices,
        };
        Ok((workspace, rx))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn handles(&self) -> &HandleRegistry {
        self.documents.handles()
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notices.emit(notice);
    }

    /// Emit the notice matching an action's outcome and pass the outcome on.
    pub(crate) fn finish<T>(&self, result: Result<T>, on_success: impl FnOnce(&T) -> Notice) -> Result<T> {
        match &result {
            Ok(value) => self.notify(on_success(value)),
            Err(e) => {
                tracing::warn!(error = %e, "action failed");
                self.notify(Notice::from_error(e));
            }
        }
        result
    }
}
