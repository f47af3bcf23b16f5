//! Configuration for camel-mail
//!
//! Settings are plain serde structs with sensible defaults, loaded with a
//! clear precedence:
//!
//! 1. Environment variables (highest priority, `CAMEL_` prefix)
//! 2. `./camel-mail.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # camel-mail.toml
//! [mail]
//! api_base = "https://api.eu.mailgun.net"
//! domain = "www.camel.com"
//! api_key = "key-123"
//! from_name = "Camel"
//!
//! [links]
//! base_url = "https://www.camel.com"
//!
//! [token]
//! secret = "change-me"
//! ttl_secs = 86400
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use camel_mail::config::CamelMailConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = CamelMailConfig::load()?;
//! let domain = &config.mail.domain;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Mailgun transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Mailgun API base URL (EU region by default)
    pub api_base: String,

    /// Sending domain registered with Mailgun
    pub domain: String,

    /// Mailgun API key
    pub api_key: String,

    /// Display name for the default sender address
    pub from_name: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.eu.mailgun.net".to_string(),
            domain: "www.camel.com".to_string(),
            api_key: String::new(),
            from_name: "Camel".to_string(),
        }
    }
}

impl MailSettings {
    /// The default sender address, `"{from_name} <mailgun@{domain}>"`
    #[must_use]
    pub fn from_address(&self) -> String {
        format!("{} <mailgun@{}>", self.from_name, self.domain)
    }
}

/// Link builder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    /// Public base URL the emailed links are built against
    pub base_url: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.camel.com".to_string(),
        }
    }
}

/// Link token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSettings {
    /// Signing secret for link tokens
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_secs: i64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: 86400, // 24 hours
        }
    }
}

/// Template registry settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TemplateSettings {
    /// Optional directory layered over the embedded templates
    pub template_dir: Option<PathBuf>,
}

/// Complete camel-mail configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CamelMailConfig {
    /// Mailgun transport settings
    #[serde(default)]
    pub mail: MailSettings,

    /// Link builder settings
    #[serde(default)]
    pub links: LinkSettings,

    /// Link token settings
    #[serde(default)]
    pub token: TokenSettings,

    /// Template registry settings
    #[serde(default)]
    pub templates: TemplateSettings,
}

impl CamelMailConfig {
    /// Load configuration from `./camel-mail.toml` and `CAMEL_*` environment
    /// variables over the defaults
    ///
    /// Nested keys use `__` in the environment, for example
    /// `CAMEL_MAIL__API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is present but malformed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("camel-mail.toml")
    }

    /// Load configuration from a specific TOML file plus the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source is present but malformed.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAMEL_").split("__"))
            .extract()?;
        Ok(config)
    }
}
