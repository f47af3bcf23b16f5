//! Email message type and transport backends
//!
//! [`Email`] is a fully rendered message; [`EmailSender`] is the transport
//! seam. Production sends through [`MailgunBackend`]; development logs
//! through [`ConsoleBackend`]; tests drive the mockall-generated mock of the
//! trait.

mod console;
mod mailgun;
mod sender;

pub use console::ConsoleBackend;
pub use mailgun::MailgunBackend;
pub use sender::EmailSender;

#[cfg(test)]
pub(crate) use sender::MockEmailSender;

use thiserror::Error;

/// Errors from email transport
#[derive(Debug, Error)]
pub enum EmailError {
    /// The provider answered with a status other than 200
    ///
    /// Always fatal: the message is neither retried nor queued.
    #[error("email rejected by provider: status {status}")]
    Delivery {
        /// HTTP status returned by the provider
        status: u16,
    },

    /// The request to the provider could not be made at all
    #[error("email transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The message is not sendable (for example, no recipients)
    #[error("invalid email message: {0}")]
    InvalidMessage(String),
}

/// A rendered email message, ready to hand to a transport
///
/// Recipients are carried as a list even though account dispatch always
/// addresses exactly one; an entry is either a bare address or
/// `"Display Name address"`.
///
/// # Examples
///
/// ```rust
/// use camel_mail::email::Email;
///
/// let email = Email::new()
///     .to("Ann ann@example.com")
///     .subject("Confirm Camel your email address!")
///     .html("<p>Hello</p>");
///
/// assert_eq!(email.to, vec!["Ann ann@example.com"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Email {
    /// Sender address; the backend's configured default applies when unset
    pub from: Option<String>,
    /// Recipient entries
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Rendered HTML body
    pub html: Option<String>,
    /// Plain-text body
    pub text: Option<String>,
}

impl Email {
    /// Create an empty message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient entry
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Set an explicit sender address
    #[must_use]
    pub fn from_address(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the subject line
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the plain-text body
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}
