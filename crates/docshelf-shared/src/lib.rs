//! # docshelf-shared
//!
//! Types shared by every docshelf crate: identifiers, the in-memory
//! [`codec::Blob`] and its text codec, constants, and error enums.

pub mod codec;
pub mod constants;
pub mod error;
pub mod types;
