//! The category registry.
//!
//! Unlike documents and comments the registry is shared by every user and
//! stored under a single key.  Deleting a category leaves documents that
//! reference it by name untouched.

use std::sync::Arc;

use docshelf_shared::constants::{CATEGORIES_KEY, PALETTE};
use docshelf_shared::types::CategoryId;
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::models::Category;
use crate::storage::Storage;

const DEFAULTS: [(&str, &str, &str); 6] = [
    ("Finance", "Financial documents and reports", "bg-green-500"),
    ("HR", "Human resources policies and procedures", "bg-blue-500"),
    ("Legal", "Legal contracts and agreements", "bg-purple-500"),
    ("Projects", "Project documentation and proposals", "bg-orange-500"),
    ("Marketing", "Marketing materials and campaigns", "bg-pink-500"),
    ("Operations", "Operational procedures and manuals", "bg-indigo-500"),
];

impl Category {
    /// Build a category with a palette colour picked at random.
    pub fn new(id: CategoryId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let color = PALETTE
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(PALETTE[0]);
        Self {
            id,
            name: name.into(),
            description: description.into(),
            document_count: 0,
            color: color.to_string(),
        }
    }
}

/// The registry used before anything has been stored.
pub fn default_categories() -> Vec<Category> {
    DEFAULTS
        .iter()
        .zip(1..)
        .map(|(&(name, description, color), id)| Category {
            id: CategoryId(id),
            name: name.to_string(),
            description: description.to_string(),
            document_count: 0,
            color: color.to_string(),
        })
        .collect()
}

pub struct CategoryRegistry {
    storage: Arc<dyn Storage>,
}

impl CategoryRegistry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Read the registry, falling back to the defaults.  Stored document
    /// counts are discarded.
    pub fn load(&self) -> Result<Vec<Category>> {
        let Some(text) = self.storage.get(CATEGORIES_KEY)? else {
            tracing::debug!("no stored categories, using defaults");
            return Ok(default_categories());
        };

        let mut categories: Vec<Category> = serde_json::from_str(&text)?;
        for category in &mut categories {
            category.document_count = 0;
        }
        Ok(categories)
    }

    pub fn save(&self, categories: &[Category]) -> Result<()> {
        let text = serde_json::to_string(categories)?;
        self.storage.set(CATEGORIES_KEY, &text)
    }
}
