//! User actions.
//!
//! Each sub-module adds a group of `async` methods to
//! [`Workspace`](crate::state::Workspace).  Every action reports its outcome
//! as a notice before returning.

pub mod backup;
pub mod categories;
pub mod comments;
pub mod documents;
pub mod session;
