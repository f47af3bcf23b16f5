//! Absolute link construction for account emails
//!
//! Emails never embed raw paths: intents name an endpoint (`auth.confirm`,
//! `auth.reset`, ...), and the [`LinkBuilder`] resolves it against a route
//! table and the application's public base URL. When an intent carries a
//! payload, the payload is sealed into one expiring token and attached as
//! the `t` query parameter.

use std::collections::BTreeMap;

use reqwest::Url;
use thiserror::Error;

use crate::token::{TokenCodec, TokenError};

/// Query parameter carrying the sealed link token
///
/// Appended as a single pair; the pair-based encoding leaves room for more
/// than one token per link, though only one is ever minted today.
pub const TOKEN_PARAM: &str = "t";

/// Errors from link construction
#[derive(Debug, Error)]
pub enum LinkError {
    /// The endpoint name does not map to a known route
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The configured base URL or route path does not form a valid URL
    #[error("invalid link URL: {0}")]
    InvalidUrl(String),

    /// The payload could not be sealed into a token
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Maps endpoint names to application route paths
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

impl RouteTable {
    /// Create an empty route table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The Camel account routes referenced by the email intents
    #[must_use]
    pub fn camel() -> Self {
        let mut table = Self::new();
        table.insert("auth.confirm", "/auth/confirm");
        table.insert("auth.reset", "/auth/reset");
        table.insert("auth.forgot", "/auth/forgot");
        table
    }

    /// Register an endpoint name for a route path
    pub fn insert(&mut self, endpoint: impl Into<String>, path: impl Into<String>) {
        self.routes.insert(endpoint.into(), path.into());
    }

    /// Look up the path for an endpoint name
    #[must_use]
    pub fn resolve(&self, endpoint: &str) -> Option<&str> {
        self.routes.get(endpoint).map(String::as_str)
    }
}

/// Builds absolute URLs for named endpoints, optionally carrying a sealed
/// token payload
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use camel_mail::links::{LinkBuilder, RouteTable};
/// use camel_mail::token::TokenCodec;
///
/// # fn example() -> Result<(), camel_mail::links::LinkError> {
/// let links = LinkBuilder::new(
///     "https://www.camel.com",
///     RouteTable::camel(),
///     TokenCodec::new("secret", 3600),
/// );
///
/// // No payload: plain absolute URL
/// let url = links.build("auth.forgot", None)?;
/// assert_eq!(url, "https://www.camel.com/auth/forgot");
///
/// // Payload: sealed into a `t` query parameter
/// let mut payload = BTreeMap::new();
/// payload.insert("email".to_string(), "ann@example.com".to_string());
/// let url = links.build("auth.confirm", Some(&payload))?;
/// assert!(url.starts_with("https://www.camel.com/auth/confirm?t="));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
    routes: RouteTable,
    codec: TokenCodec,
}

impl LinkBuilder {
    /// Create a link builder over the application's public base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>, routes: RouteTable, codec: TokenCodec) -> Self {
        Self {
            base_url: base_url.into(),
            routes,
            codec,
        }
    }

    /// Build an absolute URL for `endpoint`
    ///
    /// A non-empty payload is sealed into one token and attached as the
    /// [`TOKEN_PARAM`] query parameter; `None` or an empty map yields a URL
    /// with no query string.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnknownEndpoint`] for an unregistered endpoint
    /// name, [`LinkError::InvalidUrl`] if the base URL is malformed, or a
    /// token error if the payload cannot be sealed.
    pub fn build(
        &self,
        endpoint: &str,
        payload: Option<&BTreeMap<String, String>>,
    ) -> Result<String, LinkError> {
        let path = self
            .routes
            .resolve(endpoint)
            .ok_or_else(|| LinkError::UnknownEndpoint(endpoint.to_string()))?;

        let base = Url::parse(&self.base_url).map_err(|e| LinkError::InvalidUrl(e.to_string()))?;
        let mut url = base
            .join(path)
            .map_err(|e| LinkError::InvalidUrl(e.to_string()))?;

        if let Some(data) = payload.filter(|data| !data.is_empty()) {
            let token = self.codec.encrypt(data)?;
            url.query_pairs_mut().append_pair(TOKEN_PARAM, &token);
        }

        Ok(url.to_string())
    }
}
