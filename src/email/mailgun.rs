//! Mailgun HTTP backend
//!
//! Sends through the Mailgun messages API: a form-encoded POST to
//! `{api_base}/v3/{domain}/messages` with basic auth (`api` / the API key).
//! Acceptance is exactly a 200 response; anything else is a fatal delivery
//! error. Acceptance by Mailgun does not guarantee final delivery to the
//! recipient's inbox.

use async_trait::async_trait;
use tracing::{error, info};

use crate::config::MailSettings;

use super::{Email, EmailError, EmailSender};

/// Email backend for the Mailgun HTTP API
#[derive(Debug, Clone)]
pub struct MailgunBackend {
    client: reqwest::Client,
    api_base: String,
    domain: String,
    api_key: String,
    default_from: String,
}

impl MailgunBackend {
    /// Create a backend from mail settings
    #[must_use]
    pub fn new(settings: &MailSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: settings.api_base.clone(),
            domain: settings.domain.clone(),
            api_key: settings.api_key.clone(),
            default_from: settings.from_address(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v3/{}/messages", self.api_base, self.domain)
    }
}

#[async_trait]
impl EmailSender for MailgunBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        if email.to.is_empty() {
            return Err(EmailError::InvalidMessage("no recipients".to_string()));
        }

        let from = email.from.as_deref().unwrap_or(&self.default_from);

        let mut form: Vec<(&str, &str)> = vec![("from", from)];
        for recipient in &email.to {
            form.push(("to", recipient));
        }
        form.push(("subject", &email.subject));
        if let Some(html) = &email.html {
            form.push(("html", html));
        }
        if let Some(text) = &email.text {
            form.push(("text", text));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            error!(
                status = status.as_u16(),
                subject = %email.subject,
                "mailgun rejected message"
            );
            return Err(EmailError::Delivery {
                status: status.as_u16(),
            });
        }

        info!(subject = %email.subject, "email accepted by mailgun");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_includes_domain() {
        let backend = MailgunBackend::new(&MailSettings {
            api_base: "https://api.eu.mailgun.net".to_string(),
            domain: "www.camel.com".to_string(),
            api_key: "key-123".to_string(),
            from_name: "Camel".to_string(),
        });

        assert_eq!(
            backend.messages_url(),
            "https://api.eu.mailgun.net/v3/www.camel.com/messages"
        );
    }
}
