//! camel-mail: transactional account email dispatch for Camel
//!
//! This crate is the email layer of the Camel account-management product. It
//! composes expiring tokenized links, rendered HTML templates, and a
//! transactional email provider into a single dispatch surface:
//!
//! - **Token codec**: opaque, time-limited, tamper-proof tokens minted from a
//!   small string-to-string payload ([`token::TokenCodec`])
//! - **Link builder**: named endpoints resolved to absolute URLs, optionally
//!   carrying one token as a query parameter ([`links::LinkBuilder`])
//! - **Template registry**: the Camel email templates, rendered by name from
//!   a variable map ([`templates::TemplateRegistry`])
//! - **Email transport**: an [`email::EmailSender`] trait with Mailgun and
//!   console backends
//! - **Account mailer**: the dispatcher tying it all together, with one
//!   intent method per account email ([`dispatch::AccountMailer`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use camel_mail::config::CamelMailConfig;
//! use camel_mail::dispatch::{AccountMailer, Identity};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CamelMailConfig::load()?;
//! let mailer = AccountMailer::from_config(&config)?;
//!
//! let user = Identity::new("ann@example.com").with_name("Ann");
//! mailer.send_confirmation(&user).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error model
//!
//! Nothing is caught or retried inside this crate. Link resolution, template
//! rendering, token minting, and delivery failures all surface as typed
//! errors ([`error::CamelMailError`]); the surrounding web layer decides
//! which HTTP status each becomes.

// Public modules (exported in public API)
pub mod config;
pub mod dispatch;
pub mod email;
pub mod error;
pub mod forms;
pub mod links;
pub mod observability;
pub mod templates;
pub mod token;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use camel_mail::prelude::*;
    //! ```

    // Dispatch surface
    pub use crate::dispatch::{
        AccountMailer, DispatchError, EmailChangeRequest, EmailChangedNotice, Identity,
        SendRequest,
    };

    // Email transport
    pub use crate::email::{ConsoleBackend, Email, EmailError, EmailSender, MailgunBackend};

    // Links and tokens
    pub use crate::links::{LinkBuilder, LinkError, RouteTable};
    pub use crate::token::{TokenCodec, TokenError};

    // Templates
    pub use crate::templates::{TemplateError, TemplateRegistry};

    // Forms
    pub use crate::forms::{EditEmailForm, EditNameForm, EditPasswordForm};

    // Configuration and errors
    pub use crate::config::CamelMailConfig;
    pub use crate::error::CamelMailError;
}
