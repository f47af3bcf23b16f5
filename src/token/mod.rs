//! Expiring link tokens
//!
//! Account emails carry self-verifying links: a small string-to-string
//! payload (an email address, or an old/new address pair) is sealed into an
//! opaque token, embedded in the URL, and verified when the link is opened.
//! Tokens are signed and time-limited; a tampered or expired token never
//! yields a payload.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from token sealing and opening
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's lifetime has elapsed
    #[error("token has expired")]
    Expired,

    /// The token is malformed, has a bad signature, or otherwise fails
    /// verification
    #[error("invalid token: {0}")]
    Invalid(String),

    /// The payload could not be sealed (effectively unreachable for
    /// string-map payloads, but surfaced rather than swallowed)
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Signed claims carried by every link token
#[derive(Debug, Serialize, Deserialize)]
struct LinkClaims {
    /// Expiry, seconds since the epoch
    exp: i64,
    /// Issued-at, seconds since the epoch
    iat: i64,
    /// The sealed payload
    data: BTreeMap<String, String>,
}

/// Seals and opens expiring link-token payloads
///
/// The payload round-trips exactly: for any map `m`,
/// `decrypt(encrypt(m)) == m` within the configured lifetime. Tokens embed
/// their issuance time, so encrypting the same payload twice is not
/// guaranteed to produce the same token.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use camel_mail::token::TokenCodec;
///
/// # fn example() -> Result<(), camel_mail::token::TokenError> {
/// let codec = TokenCodec::new("secret", 3600);
///
/// let mut payload = BTreeMap::new();
/// payload.insert("email".to_string(), "ann@example.com".to_string());
///
/// let token = codec.encrypt(&payload)?;
/// assert_eq!(codec.decrypt(&token)?, payload);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenCodec {
    /// Create a codec with the given signing secret and token lifetime in
    /// seconds
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    /// Seal a payload into an opaque, expiring token
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if the claims cannot be serialized.
    pub fn encrypt(&self, data: &BTreeMap<String, String>) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = LinkClaims {
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            data: data.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Open a token, returning the sealed payload
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] if the token's lifetime has elapsed,
    /// or [`TokenError::Invalid`] for a malformed or tampered token.
    pub fn decrypt(&self, token: &str) -> Result<BTreeMap<String, String>, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded = decode::<LinkClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        Ok(decoded.claims.data)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn round_trips_payload_exactly() {
        let codec = TokenCodec::new("test-secret", 3600);
        let data = payload(&[
            ("old_email", "ann@example.com"),
            ("new_email", "ann@new.example.com"),
        ]);

        let token = codec.encrypt(&data).unwrap();
        assert_eq!(codec.decrypt(&token).unwrap(), data);
    }

    #[test]
    fn round_trips_empty_payload() {
        let codec = TokenCodec::new("test-secret", 3600);
        let data = BTreeMap::new();

        let token = codec.encrypt(&data).unwrap();
        assert!(codec.decrypt(&token).unwrap().is_empty());
    }

    #[test]
    fn rejects_expired_token() {
        let codec = TokenCodec::new("test-secret", -10);
        let token = codec.encrypt(&payload(&[("email", "a@x.com")])).unwrap();

        assert!(matches!(codec.decrypt(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn rejects_garbage_token() {
        let codec = TokenCodec::new("test-secret", 3600);

        assert!(matches!(
            codec.decrypt("not-a-token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let ours = TokenCodec::new("test-secret", 3600);
        let theirs = TokenCodec::new("other-secret", 3600);
        let token = theirs.encrypt(&payload(&[("email", "a@x.com")])).unwrap();

        assert!(matches!(ours.decrypt(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let codec = TokenCodec::new("hunter2", 3600);
        assert!(!format!("{codec:?}").contains("hunter2"));
    }
}
