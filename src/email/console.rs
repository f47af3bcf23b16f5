//! Console backend for development
//!
//! Logs every message through `tracing` instead of sending it. Useful when
//! running locally without Mailgun credentials.

use async_trait::async_trait;
use tracing::info;

use super::{Email, EmailError, EmailSender};

/// Email backend that logs messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend;

impl ConsoleBackend {
    /// Create a console backend
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        info!(
            to = ?email.to,
            subject = %email.subject,
            "console email backend: would send\n{}",
            email.html.as_deref().unwrap_or("(no html body)")
        );
        Ok(())
    }
}
