//! Email template rendering
//!
//! The Camel account email bodies ship embedded in the crate so the mailer
//! works with zero filesystem setup; an application can layer its own
//! template directory on top and the embedded bodies remain as fallback.
//! Templates are rendered by name from a string-to-string variable map, and
//! a variable a template needs but the map lacks is an error, not empty
//! output.

use std::collections::BTreeMap;
use std::path::Path;

use tera::{Context, Tera};
use thiserror::Error;

/// Template names for the Camel account emails
pub mod names {
    /// Email confirmation
    pub const CONFIRM: &str = "email/confirm.html";
    /// Email change request (sent to the new address)
    pub const CHANGE_EMAIL: &str = "email/change_email.html";
    /// Email changed notice (sent to the old address)
    pub const CHANGE_EMAIL_SUCCESS: &str = "email/change_email_success.html";
    /// Password reset request
    pub const RESET: &str = "email/reset.html";
    /// Password reset success notice
    pub const RESET_SUCCESS: &str = "email/reset_success.html";
    /// Password changed success notice
    pub const CHANGE_PASSWORD_SUCCESS: &str = "email/change_password_success.html";
}

/// Errors from template rendering
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The named template is not registered
    #[error("unknown template: {0}")]
    Unknown(String),

    /// Rendering failed, typically because a required variable is missing
    #[error("template rendering failed: {0}")]
    Render(#[from] tera::Error),
}

/// Registry of renderable email templates
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use camel_mail::templates::{names, TemplateRegistry};
///
/// # fn example() -> Result<(), camel_mail::templates::TemplateError> {
/// let templates = TemplateRegistry::camel()?;
///
/// let mut vars = BTreeMap::new();
/// vars.insert("email".to_string(), "ann@example.com".to_string());
/// vars.insert("url".to_string(), "https://www.camel.com/auth/confirm".to_string());
///
/// let html = templates.render(names::CONFIRM, &vars)?;
/// assert!(html.contains("ann@example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TemplateRegistry {
    tera: Tera,
}

/// Embedded template sources, compiled into the crate
const EMBEDDED: [(&str, &str); 6] = [
    (names::CONFIRM, include_str!("../../templates/email/confirm.html")),
    (
        names::CHANGE_EMAIL,
        include_str!("../../templates/email/change_email.html"),
    ),
    (
        names::CHANGE_EMAIL_SUCCESS,
        include_str!("../../templates/email/change_email_success.html"),
    ),
    (names::RESET, include_str!("../../templates/email/reset.html")),
    (
        names::RESET_SUCCESS,
        include_str!("../../templates/email/reset_success.html"),
    ),
    (
        names::CHANGE_PASSWORD_SUCCESS,
        include_str!("../../templates/email/change_password_success.html"),
    ),
];

impl TemplateRegistry {
    /// Create a registry holding the embedded Camel email templates
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if an embedded template fails to
    /// parse (a build defect, not a runtime condition).
    pub fn camel() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(EMBEDDED.to_vec())?;
        Ok(Self { tera })
    }

    /// Create a registry from a template directory, with the embedded Camel
    /// templates as fallback for any name the directory does not provide
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the directory glob or a template
    /// fails to parse.
    pub fn with_dir(dir: &Path) -> Result<Self, TemplateError> {
        let glob = format!("{}/**/*.html", dir.display());
        let mut tera = Tera::new(&glob)?;

        let loaded: Vec<String> = tera.get_template_names().map(String::from).collect();
        for (name, source) in EMBEDDED {
            if !loaded.iter().any(|t| t == name) {
                tera.add_raw_template(name, source)?;
            }
        }

        Ok(Self { tera })
    }

    /// Render the named template with the given variable bindings
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unknown`] for an unregistered template name,
    /// or [`TemplateError::Render`] if the template references a variable
    /// missing from `vars`.
    pub fn render(
        &self,
        name: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|t| t == name) {
            return Err(TemplateError::Unknown(name.to_string()));
        }

        let mut context = Context::new();
        for (key, value) in vars {
            context.insert(key, value);
        }

        Ok(self.tera.render(name, &context)?)
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn renders_confirmation_with_link() {
        let templates = TemplateRegistry::camel().unwrap();
        let html = templates
            .render(
                names::CONFIRM,
                &vars(&[
                    ("email", "ann@example.com"),
                    ("url", "https://www.camel.com/auth/confirm?t=abc"),
                ]),
            )
            .unwrap();

        assert!(html.contains("ann@example.com"));
        assert!(html.contains("https://www.camel.com/auth/confirm?t=abc"));
    }

    #[test]
    fn renders_change_email_with_both_addresses() {
        let templates = TemplateRegistry::camel().unwrap();
        let html = templates
            .render(
                names::CHANGE_EMAIL,
                &vars(&[
                    ("old_email", "old@example.com"),
                    ("new_email", "new@example.com"),
                    ("url", "https://www.camel.com/auth/confirm?t=abc"),
                ]),
            )
            .unwrap();

        assert!(html.contains("old@example.com"));
        assert!(html.contains("new@example.com"));
    }

    #[test]
    fn missing_variable_is_an_error() {
        let templates = TemplateRegistry::camel().unwrap();
        let result = templates.render(names::CONFIRM, &vars(&[("email", "ann@example.com")]));
        assert!(matches!(result, Err(TemplateError::Render(_))));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let templates = TemplateRegistry::camel().unwrap();
        let result = templates.render("email/nope.html", &BTreeMap::new());
        assert!(matches!(result, Err(TemplateError::Unknown(name)) if name == "email/nope.html"));
    }

    #[test]
    fn all_intent_templates_are_registered() {
        let templates = TemplateRegistry::camel().unwrap();
        for name in [
            names::CONFIRM,
            names::CHANGE_EMAIL,
            names::CHANGE_EMAIL_SUCCESS,
            names::RESET,
            names::RESET_SUCCESS,
            names::CHANGE_PASSWORD_SUCCESS,
        ] {
            assert!(
                templates.tera.get_template_names().any(|t| t == name),
                "missing template {name}"
            );
        }
    }
}
