//! Per-user document partitions.
//!
//! Each user's documents live under `app_documents_user_<id>` as a JSON
//! array of [`StoredDocument`] rows, most recent first.  Blobs are embedded
//! as data URLs through the shared codec.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use docshelf_shared::codec;
use docshelf_shared::constants::documents_key;
use docshelf_shared::types::{DocumentId, UserId};

use crate::error::{Result, StoreError};
use crate::handles::HandleRegistry;
use crate::models::{BlobState, Document, StoredDocument};
use crate::storage::Storage;

/// Encoded blob text memoised per document, tagged with the digest of the
/// blob it was produced from.
struct EncodedBlob {
    digest: String,
    text: String,
}

pub struct DocumentStore {
    storage: Arc<dyn Storage>,
    handles: HandleRegistry,
    encoded: Mutex<HashMap<(UserId, DocumentId), EncodedBlob>>,
    #[cfg(test)]
    reencodes: std::sync::atomic::AtomicUsize,
}

impl DocumentStore {
    pub fn new(storage: Arc<dyn Storage>, handles: HandleRegistry) -> Self {
        Self {
            storage,
            handles,
            encoded: Mutex::new(HashMap::new()),
            #[cfg(test)]
            reencodes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Read a user's partition, decoding blobs and issuing fresh handles.
    ///
    /// A missing partition yields an empty list.  A row whose blob fails to
    /// decode comes back as [`BlobState::Unavailable`] instead of failing
    /// the whole load.
    pub fn load(&self, user: UserId) -> Result<Vec<Document>> {
        let key = documents_key(user.0);
        let Some(text) = self.storage.get(&key)? else {
            tracing::debug!(%user, "no stored documents");
            return Ok(Vec::new());
        };

        let rows: Vec<StoredDocument> = serde_json::from_str(&text)?;
        let mut encoded = self.encoded.lock().map_err(|_| StoreError::LockPoisoned)?;
        encoded.retain(|(owner, _), _| *owner != user);

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            if row.user_id != user {
                tracing::warn!(
                    %user,
                    document_id = %row.id,
                    found = %row.user_id,
                    "skipping document stored in another user's partition"
                );
                continue;
            }

            let blob = match row.file_data {
                None => BlobState::Unavailable,
                Some(text) => match codec::decode(&text) {
                    Ok(blob) => {
                        encoded.insert(
                            (user, row.id),
                            EncodedBlob {
                                digest: blob.digest(),
                                text,
                            },
                        );
                        BlobState::Present(blob)
                    }
                    Err(e) => {
                        tracing::warn!(document_id = %row.id, error = %e, "blob not available");
                        BlobState::Unavailable
                    }
                },
            };

            let handle = match &blob {
                BlobState::Present(b) => Some(self.handles.issue(b.clone())?),
                BlobState::Unavailable => None,
            };

            documents.push(Document {
                id: row.id,
                name: row.name,
                category: row.category,
                upload_date: row.upload_date,
                size: row.size,
                uploader: row.uploader,
                owner: row.user_id,
                blob,
                handle,
            });
        }

        tracing::info!(%user, count = documents.len(), "loaded documents");
        Ok(documents)
    }

    /// Replace a user's partition with `documents`, in order.
    ///
    /// Blobs are only re-encoded when their digest differs from the last
    /// encoding this store produced or read for the same document.
    pub fn save(&self, user: UserId, documents: &[Document]) -> Result<()> {
        if let Some(foreign) = documents.iter().find(|d| d.owner != user) {
            return Err(StoreError::PartitionMismatch {
                expected: user,
                found: foreign.owner,
            });
        }

        let mut encoded = self.encoded.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut reencoded = 0usize;
        for doc in documents {
            let BlobState::Present(blob) = &doc.blob else {
                continue;
            };
            let digest = blob.digest();
            let fresh = encoded
                .get(&(user, doc.id))
                .is_some_and(|cached| cached.digest == digest);
            if !fresh {
                encoded.insert(
                    (user, doc.id),
                    EncodedBlob {
                        digest,
                        text: codec::encode(blob),
                    },
                );
                reencoded += 1;
            }
        }

        #[cfg(test)]
        self.reencodes
            .fetch_add(reencoded, std::sync::atomic::Ordering::Relaxed);

        let live: HashSet<DocumentId> = documents.iter().map(|d| d.id).collect();
        encoded.retain(|(owner, id), _| *owner != user || live.contains(id));

        let rows: Vec<StoredDocumentRef<'_>> = documents
            .iter()
            .map(|doc| StoredDocumentRef {
                id: doc.id,
                name: &doc.name,
                category: &doc.category,
                upload_date: &doc.upload_date,
                size: &doc.size,
                uploader: &doc.uploader,
                user_id: doc.owner,
                file_data: match doc.blob {
                    BlobState::Present(_) => encoded
                        .get(&(user, doc.id))
                        .map(|cached| cached.text.as_str()),
                    BlobState::Unavailable => None,
                },
            })
            .collect();

        let text = serde_json::to_string(&rows)?;
        self.storage.set(&documents_key(user.0), &text)?;

        tracing::debug!(
            %user,
            count = documents.len(),
            reencoded,
            bytes = text.len(),
            "saved documents"
        );
        Ok(())
    }

    /// Drop a user's partition entirely.
    pub fn clear(&self, user: UserId) -> Result<bool> {
        self.encoded
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .retain(|(owner, _), _| *owner != user);
        self.storage.delete(&documents_key(user.0))
    }

    #[cfg(test)]
    fn cached_encodings(&self) -> usize {
        self.encoded.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Blobs encoded by `save` since this store was built.
    #[cfg(test)]
    fn reencode_count(&self) -> usize {
        self.reencodes.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Borrowing twin of [`StoredDocument`] used when writing, so cached
/// encodings are serialized without being copied.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocumentRef<'a> {
    id: DocumentId,
    name: &'a str,
    category: &'a str,
    upload_date: &'a str,
    size: &'a str,
    uploader: &'a str,
    user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<&'a str>,
}
