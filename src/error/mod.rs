//! Error types and error handling
//!
//! Every module defines its own error enum; [`CamelMailError`] aggregates
//! them for callers that want a single error type at the crate boundary.
//! Nothing inside the crate maps errors to HTTP statuses — that is the web
//! layer's decision.

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::email::EmailError;
use crate::links::LinkError;
use crate::templates::TemplateError;
use crate::token::TokenError;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum CamelMailError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Link construction error
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Token sealing or opening error
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Template rendering error
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Email transport error
    #[error(transparent)]
    Email(#[from] EmailError),

    /// Account email dispatch error
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
