//! Export and import of the active user's partitions.

use docshelf_store::backup::{self, BackupPayload, ImportStats};

use crate::events::Notice;
use crate::state::{Result, Workspace};

impl Workspace {
    pub async fn export_backup(&self) -> Result<BackupPayload> {
        let state = self.state.lock().await;
        let user = state.require_user()?.id;
        Ok(backup::export_partition(self.storage.as_ref(), user)?)
    }

    /// Merge a backup into the active user's partitions and reload them.
    pub async fn import_backup(&self, payload: &BackupPayload) -> Result<ImportStats> {
        let result = self.import_inner(payload).await;
        self.finish(result, |stats| {
            Notice::info(
                "Backup imported",
                format!(
                    "{} documents and {} comments restored",
                    stats.documents_imported, stats.comments_imported
                ),
            )
        })
    }

    async fn import_inner(&self, payload: &BackupPayload) -> Result<ImportStats> {
        let mut state = self.state.lock().await;
        let user = state.require_user()?.id;

        let stats = backup::import_partition(self.storage.as_ref(), user, payload)?;

        let documents = self.documents.load(user)?;
        let comments = self.comments.load(user)?;
        self.release(&state.documents);
        state.documents = documents;
        state.comments = comments;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use docshelf_shared::codec::Blob;
    use docshelf_shared::types::{Role, User, UserId};
    use docshelf_store::{MemoryStorage, Storage};

    use crate::config::ClientConfig;
    use crate::error::ClientError;
    use crate::state::Workspace;

    fn ada() -> User {
        User {
            id: UserId(1),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Member,
        }
    }

    fn workspace() -> Workspace {
        let config = ClientConfig {
            upload_delay: Duration::ZERO,
            ..ClientConfig::default()
        };
        Workspace::open(Arc::new(MemoryStorage::new()), config).unwrap().0
    }

    #[tokio::test]
    async fn test_export_import_between_devices() {
        let laptop = workspace();
        laptop.sign_in(ada()).await.unwrap();
        let up = laptop
            .upload_document("notes.txt", Blob::new("text/plain", b"n".to_vec()))
            .await
            .unwrap();
        laptop.add_comment(up.id, "remember").await.unwrap();
        let payload = laptop.export_backup().await.unwrap();

        let desktop = workspace();
        desktop.sign_in(ada()).await.unwrap();
        let stats = desktop.import_backup(&payload).await.unwrap();
        assert_eq!(stats.documents_imported, 1);
        assert_eq!(stats.comments_imported, 1);

        let docs = desktop.list_documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].available);
        assert_eq!(desktop.comments_for(up.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_import_changes_nothing() {
        let laptop = workspace();
        laptop.sign_in(ada()).await.unwrap();
        let up = laptop
            .upload_document("notes.txt", Blob::new("text/plain", b"n".to_vec()))
            .await
            .unwrap();
        laptop.add_comment(up.id, &"x".repeat(2_000)).await.unwrap();
        let payload = laptop.export_backup().await.unwrap();

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::with_quota(1_500));
        let config = ClientConfig {
            upload_delay: Duration::ZERO,
            ..ClientConfig::default()
        };
        let (desktop, _rx) = Workspace::open(storage.clone(), config.clone()).unwrap();
        desktop.sign_in(ada()).await.unwrap();
        desktop
            .upload_document("local.txt", Blob::new("text/plain", b"l".to_vec()))
            .await
            .unwrap();
        let stored_before = storage.get("app_documents_user_1").unwrap();

        let err = desktop.import_backup(&payload).await.unwrap_err();
        assert!(err.is_retryable());

        let names: Vec<String> = desktop
            .list_documents()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["local.txt".to_string()]);
        assert_eq!(storage.get("app_documents_user_1").unwrap(), stored_before);

        let (reopened, _rx) = Workspace::open(storage, config).unwrap();
        reopened.sign_in(ada()).await.unwrap();
        assert_eq!(reopened.list_documents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_requires_sign_in() {
        assert!(matches!(
            workspace().export_backup().await,
            Err(ClientError::NotSignedIn)
        ));
    }
}
