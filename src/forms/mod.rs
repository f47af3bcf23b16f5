//! Profile edit form validation
//!
//! The three account profile forms — password change, email change, name
//! change — with the same rules and user-facing messages the Camel web
//! forms enforce. Handlers deserialize the submitted form and call
//! [`validator::Validate::validate`].

use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Password change form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditPasswordForm {
    /// The user's current password
    #[validate(length(min = 8, message = "Your password must be at least 8 characters"))]
    pub old_password: String,

    /// The replacement password
    #[validate(length(min = 8, message = "Your password must be at least 8 characters"))]
    pub new_password: String,
}

/// Email change form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditEmailForm {
    /// The new address, confirmed by email before it takes effect
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
}

/// Display name change form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditNameForm {
    /// The new display name
    #[validate(custom(function = validate_name, message = "Please enter a valid name"))]
    pub name: String,
}

/// A name is ASCII letters, whitespace, and dots, and — unless empty — must
/// contain at least one letter
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let allowed = name
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || c == '.');
    let substantive = name.is_empty() || name.chars().any(|c| c.is_ascii_alphabetic());

    if allowed && substantive {
        Ok(())
    } else {
        Err(ValidationError::new("name"))
    }
}
