//! Email sender trait abstraction
//!
//! This module defines the core `EmailSender` trait that all email backends
//! implement.

use async_trait::async_trait;

use super::{Email, EmailError};

/// Trait for sending emails
///
/// Implemented by all email backends (Mailgun, console, test mocks).
///
/// # Examples
///
/// ```rust,no_run
/// use camel_mail::config::MailSettings;
/// use camel_mail::email::{Email, EmailSender, MailgunBackend};
///
/// # async fn example() -> Result<(), camel_mail::email::EmailError> {
/// let sender = MailgunBackend::new(&MailSettings::default());
///
/// let email = Email::new()
///     .to("ann@example.com")
///     .subject("Hello!")
///     .html("<p>Hello, World!</p>");
///
/// sender.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email cannot be sent or is invalid
    async fn send(&self, email: Email) -> Result<(), EmailError>;

    /// Send multiple emails in batch
    ///
    /// Default implementation sends emails sequentially. Backends can
    /// override for more efficient batch sending.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if any email fails to send
    async fn send_batch(&self, emails: Vec<Email>) -> Result<(), EmailError> {
        for email in emails {
            self.send(email).await?;
        }
        Ok(())
    }
}
