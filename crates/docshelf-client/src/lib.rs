//! # docshelf-client
//!
//! Session-scoped document workspace: uploads, comments, categories and the
//! views derived from them, persisted per user through a [`Storage`] port.
//!
//! [`Storage`]: docshelf_store::Storage

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod state;

pub use commands::documents::{Download, UploadResult};
pub use commands::session::SessionSummary;
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{Notice, NoticeVariant};
pub use state::{DocumentSummary, Workspace};
