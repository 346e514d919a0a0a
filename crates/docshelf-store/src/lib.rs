//! # docshelf-store
//!
//! Client-side persistence for docshelf.
//!
//! Everything is written through the [`Storage`] port, a plain text
//! key/value interface.  Two adapters are provided: [`MemoryStorage`] for
//! tests and ephemeral sessions, and the SQLite-backed [`Database`] for
//! durable local state.  On top of the port sit the per-user
//! [`DocumentStore`] and [`CommentStore`], the shared [`CategoryRegistry`],
//! and the pure [`projection`] helpers used to derive views.

pub mod backup;
pub mod categories;
pub mod comments;
pub mod database;
pub mod documents;
pub mod handles;
pub mod migrations;
pub mod models;
pub mod projection;
pub mod storage;

mod error;

pub use categories::CategoryRegistry;
pub use comments::CommentStore;
pub use database::Database;
pub use documents::DocumentStore;
pub use error::{Result, StoreError};
pub use handles::{BlobHandle, HandleRegistry};
pub use models::*;
pub use storage::{MemoryStorage, Storage};
