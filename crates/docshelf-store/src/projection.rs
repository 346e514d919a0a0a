//! Read-only views derived from the document set.

use std::collections::HashMap;

use crate::models::{Category, Document};

/// Copy `categories` with `document_count` set to the number of documents
/// whose category name matches exactly.
pub fn project_counts(documents: &[Document], categories: &[Category]) -> Vec<Category> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        *counts.entry(doc.category.as_str()).or_default() += 1;
    }

    categories
        .iter()
        .map(|category| Category {
            document_count: counts.get(category.name.as_str()).copied().unwrap_or(0),
            ..category.clone()
        })
        .collect()
}

/// Documents whose name or category contains `term`, ignoring case and
/// surrounding whitespace.  A blank term matches everything.
pub fn filter<'a>(documents: &'a [Document], term: &str) -> Vec<&'a Document> {
    let needle = term.trim().to_lowercase();
    documents
        .iter()
        .filter(|doc| {
            needle.is_empty()
                || doc.name.to_lowercase().contains(&needle)
                || doc.category.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn in_category<'a>(documents: &'a [Document], category: &str) -> Vec<&'a Document> {
    documents.iter().filter(|doc| doc.category == category).collect()
}

/// The first `limit` documents in stored (most recent first) order.
pub fn recent(documents: &[Document], limit: usize) -> &[Document] {
    &documents[..limit.min(documents.len())]
}
