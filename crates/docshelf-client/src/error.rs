use docshelf_shared::types::DocumentId;
use docshelf_store::StoreError;
use thiserror::Error;

/// Failures of user actions.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A required field was empty or a value was out of bounds.  Nothing
    /// changed.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("No user is signed in")]
    NotSignedIn,

    /// The signed-in user changed while an action was in flight.
    #[error("The active user changed before the action completed")]
    SessionChanged,

    #[error("Document {0} has no content available")]
    BlobUnavailable(DocumentId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A backend call failed.  The raw cause is logged, never shown.
    #[error("Remote call failed: {0}")]
    RemoteCall(String),
}

impl ClientError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ClientError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Store(e) => e.is_write_failure(),
            ClientError::RemoteCall(_) => true,
            _ => false,
        }
    }

    /// Title and description suitable for showing to the user.
    pub fn user_message(&self) -> (&'static str, String) {
        match self {
            ClientError::Validation(msg) => ("Invalid input", msg.clone()),
            ClientError::NotFound { kind, .. } => {
                ("Not found", format!("The {kind} no longer exists"))
            }
            ClientError::Forbidden(msg) => ("Not allowed", msg.clone()),
            ClientError::NotSignedIn => ("Not signed in", "Please sign in first".to_string()),
            ClientError::SessionChanged => (
                "Action cancelled",
                "You switched accounts before the action finished".to_string(),
            ),
            ClientError::BlobUnavailable(_) => (
                "File not available",
                "This file is not available for preview or download".to_string(),
            ),
            ClientError::Store(e) if e.is_write_failure() => (
                "Could not save changes",
                "Local storage is full or unavailable. Please try again.".to_string(),
            ),
            ClientError::Store(_) => (
                "Something went wrong",
                "Stored data could not be read".to_string(),
            ),
            ClientError::RemoteCall(_) => (
                "Request failed",
                "Something went wrong. Please try again later.".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failures_are_retryable() {
        let err = ClientError::from(StoreError::QuotaExceeded { needed: 10, quota: 5 });
        assert!(err.is_retryable());
        assert_eq!(err.user_message().0, "Could not save changes");

        let err = ClientError::Store(StoreError::LockPoisoned);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_read_failure_is_not_reported_as_save() {
        let parse = serde_json::from_str::<u8>("not json").unwrap_err();
        let err = ClientError::from(StoreError::Serialization(parse));
        assert!(!err.is_retryable());
        assert_eq!(err.user_message().0, "Something went wrong");
    }

    #[test]
    fn test_remote_message_is_generic() {
        let err = ClientError::RemoteCall("GET /documents".into());
        let (_, description) = err.user_message();
        assert!(!description.contains("/documents"));
    }
}
