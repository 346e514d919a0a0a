//! Transient user-facing notices.
//!
//! Every action reports its outcome as a [`Notice`] on an unbounded channel;
//! the front end decides how to show them.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
    pub retryable: bool,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Info,
            retryable: false,
        }
    }

    pub fn from_error(err: &ClientError) -> Self {
        let (title, description) = err.user_message();
        Self {
            title: title.to_string(),
            description,
            variant: NoticeVariant::Destructive,
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoticeSender(mpsc::UnboundedSender<Notice>);

impl NoticeSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    pub fn emit(&self, notice: Notice) {
        if let Err(e) = self.0.send(notice) {
            tracing::debug!(title = %e.0.title, "notice dropped, no receiver");
        }
    }
}
