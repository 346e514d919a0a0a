//! Document commands: upload, edit, delete, view, download and listings.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use docshelf_shared::codec::Blob;
use docshelf_shared::constants::DEFAULT_CATEGORY;
use docshelf_shared::types::DocumentId;
use docshelf_store::{projection, BlobState, Document};

use crate::error::ClientError;
use crate::events::Notice;
use crate::state::{DocumentSummary, Result, Workspace};

#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub id: DocumentId,
    pub name: String,
    pub size: String,
}

/// A blob handed out for download, with the name to save it under.
#[derive(Debug, Clone)]
pub struct Download {
    pub name: String,
    pub blob: Blob,
}

impl Workspace {
    /// Upload a file into the active user's partition.
    ///
    /// The simulated delay elapses before the state lock is taken, and the
    /// new document is prepended to whatever the list holds at that moment,
    /// so overlapping uploads all land.
    pub async fn upload_document(&self, file_name: &str, blob: Blob) -> Result<UploadResult> {
        let result = self.upload_inner(file_name, blob).await;
        self.finish(result, |r| {
            Notice::info(
                "File uploaded successfully",
                format!("{} has been uploaded and is ready for viewing", r.name),
            )
        })
    }

    async fn upload_inner(&self, file_name: &str, blob: Blob) -> Result<UploadResult> {
        let name = file_name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Please choose a file to upload".into()));
        }
        if blob.len() > self.config.max_file_size {
            return Err(ClientError::Validation(format!(
                "File too large: {} bytes (max {})",
                blob.len(),
                self.config.max_file_size
            )));
        }

        let uploader = self.state.lock().await.require_user()?.clone();

        tokio::time::sleep(self.config.upload_delay).await;

        let mut state = self.state.lock().await;
        if state.user.as_ref().map(|u| u.id) != Some(uploader.id) {
            return Err(ClientError::SessionChanged);
        }

        let handle = self.handles().issue(blob.clone())?;
        let document = Document {
            id: DocumentId(self.ids.next()),
            name: name.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            upload_date: Utc::now().format("%Y-%m-%d").to_string(),
            size: blob.display_size(),
            uploader: uploader.name.clone(),
            owner: uploader.id,
            blob: BlobState::Present(blob),
            handle: Some(handle),
        };
        let result = UploadResult {
            id: document.id,
            name: document.name.clone(),
            size: document.size.clone(),
        };

        state.documents.insert(0, document);
        if let Err(e) = self.documents.save(uploader.id, &state.documents) {
            let rejected = state.documents.remove(0);
            self.release(std::slice::from_ref(&rejected));
            return Err(e.into());
        }

        info!(document_id = %result.id, name = %result.name, size = %result.size, "document uploaded");
        Ok(result)
    }

    /// Rename and/or recategorise a document.  The blob never changes.
    pub async fn edit_document(
        &self,
        id: DocumentId,
        name: &str,
        category: &str,
    ) -> Result<DocumentSummary> {
        let result = self.edit_inner(id, name, category).await;
        self.finish(result, |_| {
            Notice::info("Document updated", "Document has been updated successfully")
        })
    }

    async fn edit_inner(&self, id: DocumentId, name: &str, category: &str) -> Result<DocumentSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Document name is required".into()));
        }

        let mut state = self.state.lock().await;
        let user = state.require_user()?.id;
        let idx = state.position(id)?;

        let doc = &mut state.documents[idx];
        let old_name = std::mem::replace(&mut doc.name, name.to_string());
        let old_category = std::mem::replace(&mut doc.category, category.trim().to_string());

        if let Err(e) = self.documents.save(user, &state.documents) {
            let doc = &mut state.documents[idx];
            doc.name = old_name;
            doc.category = old_category;
            return Err(e.into());
        }

        info!(document_id = %id, "document updated");
        Ok(DocumentSummary::from(&state.documents[idx]))
    }

    /// Remove a document and revoke its handle.  Comments on it are kept.
    pub async fn delete_document(&self, id: DocumentId) -> Result<()> {
        let result = self.delete_inner(id).await;
        self.finish(result, |_| {
            Notice::info("Document deleted", "Document has been removed successfully")
        })
    }

    async fn delete_inner(&self, id: DocumentId) -> Result<()> {
        let mut state = self.state.lock().await;
        let user = state.require_user()?.id;
        let idx = state.position(id)?;

        let removed = state.documents.remove(idx);
        if let Err(e) = self.documents.save(user, &state.documents) {
            state.documents.insert(idx, removed);
            return Err(e.into());
        }
        self.release(std::slice::from_ref(&removed));

        info!(document_id = %id, "document deleted");
        Ok(())
    }

    /// Open a document for preview.  A document without content is still
    /// returned, with a notice that it cannot be previewed.
    pub async fn view_document(&self, id: DocumentId) -> Result<DocumentSummary> {
        let result = self.view_inner(id).await;
        match &result {
            Ok(summary) if !summary.available => {
                self.notify(Notice::from_error(&ClientError::BlobUnavailable(id)));
            }
            Ok(_) => {}
            Err(e) => self.notify(Notice::from_error(e)),
        }
        result
    }

    async fn view_inner(&self, id: DocumentId) -> Result<DocumentSummary> {
        let state = self.state.lock().await;
        state.require_user()?;
        let idx = state.position(id)?;
        Ok(DocumentSummary::from(&state.documents[idx]))
    }

    pub async fn download_document(&self, id: DocumentId) -> Result<Download> {
        let result = self.download_inner(id).await;
        self.finish(result, |d| {
            Notice::info("Download started", format!("Downloading {}", d.name))
        })
    }

    async fn download_inner(&self, id: DocumentId) -> Result<Download> {
        let state = self.state.lock().await;
        state.require_user()?;
        let doc = &state.documents[state.position(id)?];
        let handle = doc.handle.as_ref().ok_or(ClientError::BlobUnavailable(id))?;
        let blob = self.handles().resolve(handle)?;
        Ok(Download {
            name: doc.name.clone(),
            blob,
        })
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let state = self.state.lock().await;
        state.require_user()?;
        Ok(state.documents.iter().map(DocumentSummary::from).collect())
    }

    /// Documents whose name or category contains `term`, ignoring case.
    pub async fn search_documents(&self, term: &str) -> Result<Vec<DocumentSummary>> {
        let state = self.state.lock().await;
        state.require_user()?;
        Ok(projection::filter(&state.documents, term)
            .into_iter()
            .map(DocumentSummary::from)
            .collect())
    }

    pub async fn recent_documents(&self, limit: usize) -> Result<Vec<DocumentSummary>> {
        let state = self.state.lock().await;
        state.require_user()?;
        Ok(projection::recent(&state.documents, limit)
            .iter()
            .map(DocumentSummary::from)
            .collect())
    }
}
