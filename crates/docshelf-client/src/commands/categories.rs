//! Category registry commands.  The registry is shared by all users and is
//! usable without signing in.

use tracing::info;

use docshelf_shared::types::CategoryId;
use docshelf_store::{projection, Category};

use crate::error::ClientError;
use crate::events::Notice;
use crate::state::{DocumentSummary, Result, Workspace};

impl Workspace {
    /// Categories with document counts derived from the active user's
    /// documents.
    pub async fn list_categories(&self) -> Vec<Category> {
        let state = self.state.lock().await;
        projection::project_counts(&state.documents, &state.categories)
    }

    /// Documents filed under a category.
    pub async fn category_documents(&self, id: CategoryId) -> Result<Vec<DocumentSummary>> {
        let state = self.state.lock().await;
        state.require_user()?;
        let category = state
            .categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ClientError::not_found("category", id))?;
        Ok(projection::in_category(&state.documents, &category.name)
            .into_iter()
            .map(DocumentSummary::from)
            .collect())
    }

    pub async fn add_category(&self, name: &str, description: &str) -> Result<Category> {
        let result = self.add_category_inner(name, description).await;
        self.finish(result, |c| {
            Notice::info("Category added", format!("{} has been created successfully", c.name))
        })
    }

    async fn add_category_inner(&self, name: &str, description: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Please enter a category name".into()));
        }

        let mut state = self.state.lock().await;
        let category = Category::new(CategoryId(self.ids.next()), name, description.trim());
        state.categories.push(category.clone());

        if let Err(e) = self.categories.save(&state.categories) {
            state.categories.pop();
            return Err(e.into());
        }

        info!(category_id = %category.id, name = %category.name, color = %category.color, "category added");
        Ok(category)
    }

    /// Change a category's name and description.  Documents filed under the
    /// old name keep it.
    pub async fn edit_category(&self, id: CategoryId, name: &str, description: &str) -> Result<Category> {
        let result = self.edit_category_inner(id, name, description).await;
        self.finish(result, |_| {
            Notice::info("Category updated", "Category has been updated successfully")
        })
    }

    async fn edit_category_inner(&self, id: CategoryId, name: &str, description: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Please enter a category name".into()));
        }

        let mut state = self.state.lock().await;
        let idx = state
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ClientError::not_found("category", id))?;

        let previous = state.categories[idx].clone();
        state.categories[idx].name = name.to_string();
        state.categories[idx].description = description.trim().to_string();

        if let Err(e) = self.categories.save(&state.categories) {
            state.categories[idx] = previous;
            return Err(e.into());
        }

        let updated = projection::project_counts(&state.documents, &state.categories[idx..=idx]);
        Ok(updated.into_iter().next().unwrap_or(previous))
    }

    /// Remove a category.  Documents referencing it by name are left as they
    /// are.
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let result = self.delete_category_inner(id).await;
        self.finish(result, |_| {
            Notice::info("Category deleted", "Category has been removed successfully")
        })
    }

    async fn delete_category_inner(&self, id: CategoryId) -> Result<()> {
        let mut state = self.state.lock().await;
        let idx = state
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ClientError::not_found("category", id))?;

        let removed = state.categories.remove(idx);
        if let Err(e) = self.categories.save(&state.categories) {
            state.categories.insert(idx, removed);
            return Err(e.into());
        }

        info!(category_id = %id, name = %removed.name, "category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use docshelf_shared::codec::Blob;
    use docshelf_shared::constants::PALETTE;
    use docshelf_shared::types::{Role, User, UserId};
    use docshelf_store::{MemoryStorage, Storage};

    use super::*;
    use crate::config::ClientConfig;

    fn ada() -> User {
        User {
            id: UserId(1),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Member,
        }
    }

    fn workspace(storage: Arc<dyn Storage>) -> Workspace {
        let config = ClientConfig {
            upload_delay: Duration::ZERO,
            ..ClientConfig::default()
        };
        Workspace::open(storage, config).unwrap().0
    }

    fn count(categories: &[Category], name: &str) -> usize {
        categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.document_count)
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_edit_delete_scenario() {
        let ws = workspace(Arc::new(MemoryStorage::new()));
        ws.add_category("General", "Everything else").await.unwrap();
        ws.sign_in(ada()).await.unwrap();

        let up = ws
            .upload_document("report.pdf", Blob::new("application/pdf", b"%PDF".to_vec()))
            .await
            .unwrap();
        assert_eq!(ws.list_documents().await.unwrap().len(), 1);
        assert_eq!(count(&ws.list_categories().await, "General"), 1);

        ws.edit_document(up.id, "report.pdf", "Finance").await.unwrap();
        let categories = ws.list_categories().await;
        assert_eq!(count(&categories, "Finance"), 1);
        assert_eq!(count(&categories, "General"), 0);

        ws.delete_document(up.id).await.unwrap();
        ws.sign_out().await;
        ws.sign_in(ada()).await.unwrap();
        assert!(ws.list_documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_category_validation_and_color() {
        let ws = workspace(Arc::new(MemoryStorage::new()));
        assert!(matches!(
            ws.add_category("  ", "x").await,
            Err(ClientError::Validation(_))
        ));

        let c = ws.add_category("Research", "Papers").await.unwrap();
        assert!(PALETTE.contains(&c.color.as_str()));
        assert_eq!(ws.list_categories().await.len(), 7);
    }

    #[tokio::test]
    async fn test_edit_keeps_color_and_persists() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let ws = workspace(storage.clone());
        let finance = ws.list_categories().await[0].clone();

        let edited = ws
            .edit_category(finance.id, "Accounting", "Books")
            .await
            .unwrap();
        assert_eq!(edited.color, finance.color);

        let reopened = workspace(storage);
        assert_eq!(reopened.list_categories().await[0].name, "Accounting");

        assert!(matches!(
            ws.edit_category(CategoryId(999), "x", "y").await,
            Err(ClientError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_does_not_cascade() {
        let ws = workspace(Arc::new(MemoryStorage::new()));
        ws.sign_in(ada()).await.unwrap();
        let up = ws
            .upload_document("contract.pdf", Blob::new("application/pdf", b"c".to_vec()))
            .await
            .unwrap();
        ws.edit_document(up.id, "contract.pdf", "Legal").await.unwrap();

        let legal = ws
            .list_categories()
            .await
            .into_iter()
            .find(|c| c.name == "Legal")
            .unwrap();
        assert_eq!(ws.category_documents(legal.id).await.unwrap().len(), 1);

        ws.delete_category(legal.id).await.unwrap();
        assert!(ws.list_categories().await.iter().all(|c| c.name != "Legal"));
        assert_eq!(ws.list_documents().await.unwrap()[0].category, "Legal");
        assert!(matches!(
            ws.category_documents(legal.id).await,
            Err(ClientError::NotFound { .. })
        ));
    }
}
