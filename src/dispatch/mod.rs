//! Account email dispatch
//!
//! [`AccountMailer`] is the heart of the crate: it orchestrates the link
//! builder, the template registry, and the email transport into a single
//! [`AccountMailer::send_email`] operation, and exposes one intent method per
//! Camel account email (confirmation, email-changed notice, password reset
//! request and success, password-changed success, email-change request).
//!
//! Every intent takes the acting identity as an explicit argument — there is
//! no ambient "current user" anywhere in this crate — and builds its payload
//! map fresh per call. Errors are typed and propagate unretried; the web
//! layer owns the mapping to HTTP statuses.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::CamelMailConfig;
use crate::email::{Email, EmailError, EmailSender, MailgunBackend};
use crate::links::{LinkBuilder, LinkError, RouteTable};
use crate::templates::{names, TemplateError, TemplateRegistry};
use crate::token::TokenCodec;

/// Errors from dispatching an account email
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Link construction failed (unknown endpoint, bad base URL, token
    /// sealing)
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Template rendering failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The transport reported a failure; never retried here
    #[error(transparent)]
    Delivery(#[from] EmailError),
}

/// The acting identity an intent is sent on behalf of
///
/// Passed explicitly to every intent; the dispatcher performs no session or
/// global lookups of its own.
#[derive(Debug, Clone)]
pub struct Identity {
    /// The identity's current email address
    pub email: String,
    /// Profile display name, when one is set
    pub name: Option<String>,
}

impl Identity {
    /// Create an identity with no display name
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Attach a display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Parameters for the email-changed notice
#[derive(Debug, Clone)]
pub struct EmailChangedNotice {
    /// The address the account changed away from; the notice goes here
    pub old_email: String,
}

/// Parameters for the email-change request
#[derive(Debug, Clone)]
pub struct EmailChangeRequest {
    /// The new, not yet confirmed address; the request goes here
    pub new_email: String,
}

/// A fully specified send: recipient, template, subject, and the optional
/// link endpoint, display name, and token payload
///
/// Each request owns its payload map, constructed fresh by the caller; maps
/// are never shared between sends.
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Recipient email address
    pub to: String,
    /// Template name to render for the body
    pub template: String,
    /// Subject line
    pub subject: String,
    /// Endpoint to build a link for; no link is built when absent
    pub endpoint: Option<String>,
    /// Recipient display name; prefixed to the address when present
    pub display_name: Option<String>,
    /// Token payload, also the template's variable bindings
    pub payload: BTreeMap<String, String>,
}

impl SendRequest {
    /// Create a request with no link, display name, or payload
    #[must_use]
    pub fn new(
        to: impl Into<String>,
        template: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            template: template.into(),
            subject: subject.into(),
            endpoint: None,
            display_name: None,
            payload: BTreeMap::new(),
        }
    }

    /// Set the link endpoint
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the recipient display name
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Add one payload entry
    #[must_use]
    pub fn payload_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Dispatches Camel's transactional account emails
///
/// # Examples
///
/// ```rust,no_run
/// use camel_mail::config::CamelMailConfig;
/// use camel_mail::dispatch::{AccountMailer, Identity};
///
/// # async fn example() -> anyhow::Result<()> {
/// let mailer = AccountMailer::from_config(&CamelMailConfig::load()?)?;
/// let user = Identity::new("ann@example.com").with_name("Ann");
///
/// mailer.send_confirmation(&user).await?;
/// # Ok(())
/// # }
/// ```
pub struct AccountMailer {
    links: LinkBuilder,
    templates: TemplateRegistry,
    sender: Arc<dyn EmailSender>,
}

impl AccountMailer {
    /// Create a mailer from its collaborators
    #[must_use]
    pub fn new(links: LinkBuilder, templates: TemplateRegistry, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            links,
            templates,
            sender,
        }
    }

    /// Wire up a mailer from configuration: Camel routes, embedded templates
    /// (plus any configured template directory), and the Mailgun backend
    ///
    /// # Errors
    ///
    /// Returns an error if the template directory fails to load.
    pub fn from_config(config: &CamelMailConfig) -> Result<Self, crate::error::CamelMailError> {
        let codec = TokenCodec::new(&config.token.secret, config.token.ttl_secs);
        let links = LinkBuilder::new(&config.links.base_url, RouteTable::camel(), codec);
        let templates = match &config.templates.template_dir {
            Some(dir) => TemplateRegistry::with_dir(dir)?,
            None => TemplateRegistry::camel()?,
        };
        let sender = Arc::new(MailgunBackend::new(&config.mail));
        Ok(Self::new(links, templates, sender))
    }

    /// Compose and send one account email
    ///
    /// When the request names an endpoint, a link is built first — with a
    /// token when the payload is non-empty, without one otherwise — and
    /// stored under the payload's `url` key before the template is rendered,
    /// because templates read `url` from the payload. The recipient string is
    /// `"{display_name} {email}"` when a non-empty display name is present,
    /// the bare address otherwise.
    ///
    /// # Errors
    ///
    /// Propagates link, template, and delivery errors unretried; a provider
    /// status other than 200 is fatal.
    pub async fn send_email(&self, request: SendRequest) -> Result<(), DispatchError> {
        let SendRequest {
            to,
            template,
            subject,
            endpoint,
            display_name,
            mut payload,
        } = request;

        if let Some(endpoint) = endpoint.as_deref() {
            let url = if payload.is_empty() {
                self.links.build(endpoint, None)?
            } else {
                self.links.build(endpoint, Some(&payload))?
            };
            payload.insert("url".to_string(), url);
        }

        let html = self.templates.render(&template, &payload)?;

        let recipient = match display_name.as_deref() {
            Some(name) if !name.is_empty() => format!("{name} {to}"),
            _ => to.clone(),
        };

        let email = Email::new().to(recipient).subject(&subject).html(html);
        self.sender.send(email).await?;

        info!(to = %to, subject = %subject, template = %template, "account email dispatched");
        Ok(())
    }

    /// Direct the user where to confirm their email address
    ///
    /// # Errors
    ///
    /// Propagates any [`DispatchError`] from [`Self::send_email`].
    pub async fn send_confirmation(&self, identity: &Identity) -> Result<(), DispatchError> {
        let mut request = SendRequest::new(
            &identity.email,
            names::CONFIRM,
            "Confirm Camel your email address!",
        )
        .endpoint("auth.confirm")
        .payload_entry("email", &identity.email);
        if let Some(name) = &identity.name {
            request = request.display_name(name);
        }
        self.send_email(request).await
    }

    /// Notify the user's old address that the account email has changed
    ///
    /// # Errors
    ///
    /// Propagates any [`DispatchError`] from [`Self::send_email`].
    pub async fn send_email_changed_notice(
        &self,
        identity: &Identity,
        notice: EmailChangedNotice,
    ) -> Result<(), DispatchError> {
        let mut request = SendRequest::new(
            notice.old_email,
            names::CHANGE_EMAIL_SUCCESS,
            "Your Camel email address has changed",
        )
        .payload_entry("new_email", &identity.email);
        if let Some(name) = &identity.name {
            request = request.display_name(name);
        }
        self.send_email(request).await
    }

    /// Direct the user where to reset their password
    ///
    /// # Errors
    ///
    /// Propagates any [`DispatchError`] from [`Self::send_email`].
    pub async fn send_password_reset(&self, identity: &Identity) -> Result<(), DispatchError> {
        let request = SendRequest::new(&identity.email, names::RESET, "Reset your Camel password")
            .endpoint("auth.reset")
            .payload_entry("email", &identity.email);
        self.send_email(request).await
    }

    /// Notify the user that the password was changed via a reset
    ///
    /// The link carries no token: the payload is empty, so the URL is built
    /// bare and only then stored under `url`.
    ///
    /// # Errors
    ///
    /// Propagates any [`DispatchError`] from [`Self::send_email`].
    pub async fn send_password_reset_success(
        &self,
        identity: &Identity,
    ) -> Result<(), DispatchError> {
        let request = SendRequest::new(
            &identity.email,
            names::RESET_SUCCESS,
            "Your Camel password has been changed",
        )
        .endpoint("auth.forgot");
        self.send_email(request).await
    }

    /// Notify the user that the password was changed from their profile
    ///
    /// The recipient is always the identity's email address, as a plain
    /// string.
    ///
    /// # Errors
    ///
    /// Propagates any [`DispatchError`] from [`Self::send_email`].
    pub async fn send_password_changed_success(
        &self,
        identity: &Identity,
    ) -> Result<(), DispatchError> {
        let mut request = SendRequest::new(
            &identity.email,
            names::CHANGE_PASSWORD_SUCCESS,
            "Your Camel password has been changed",
        )
        .endpoint("auth.reset");
        if let Some(name) = &identity.name {
            request = request.display_name(name);
        }
        self.send_email(request).await
    }

    /// Ask the new, unconfirmed address to confirm an email change
    ///
    /// # Errors
    ///
    /// Propagates any [`DispatchError`] from [`Self::send_email`].
    pub async fn send_email_change_request(
        &self,
        identity: &Identity,
        change: EmailChangeRequest,
    ) -> Result<(), DispatchError> {
        let mut request = SendRequest::new(
            &change.new_email,
            names::CHANGE_EMAIL,
            "Confirm your new Camel email address!",
        )
        .endpoint("auth.confirm")
        .payload_entry("old_email", &identity.email)
        .payload_entry("new_email", &change.new_email);
        if let Some(name) = &identity.name {
            request = request.display_name(name);
        }
        self.send_email(request).await
    }
}

impl std::fmt::Debug for AccountMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountMailer")
            .field("links", &self.links)
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::MockEmailSender;

    fn mailer(mock: MockEmailSender) -> AccountMailer {
        let links = LinkBuilder::new(
            "https://www.camel.com",
            RouteTable::camel(),
            TokenCodec::new("test-secret", 3600),
        );
        AccountMailer::new(links, TemplateRegistry::camel().unwrap(), Arc::new(mock))
    }

    fn ann() -> Identity {
        Identity::new("ann@example.com").with_name("Ann")
    }

    #[tokio::test]
    async fn confirmation_scenario_end_to_end() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| {
                let html = email.html.as_deref().unwrap_or_default();
                email.to == vec!["Ann ann@example.com".to_string()]
                    && email.subject == "Confirm Camel your email address!"
                    && html.contains("ann@example.com")
                    && html.contains("https://www.camel.com/auth/confirm?t=")
            })
            .times(1)
            .returning(|_| Ok(()));

        mailer(mock).send_confirmation(&ann()).await.unwrap();
    }

    #[tokio::test]
    async fn display_name_joins_with_single_space() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| email.to == vec!["Ann ann@example.com".to_string()])
            .returning(|_| Ok(()));

        let request = SendRequest::new(
            "ann@example.com",
            names::RESET_SUCCESS,
            "Hi",
        )
        .endpoint("auth.forgot")
        .display_name("Ann");
        mailer(mock).send_email(request).await.unwrap();
    }

    #[tokio::test]
    async fn missing_display_name_uses_bare_address() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| email.to == vec!["ann@example.com".to_string()])
            .returning(|_| Ok(()));

        let request = SendRequest::new("ann@example.com", names::RESET_SUCCESS, "Hi")
            .endpoint("auth.forgot");
        mailer(mock).send_email(request).await.unwrap();
    }

    #[tokio::test]
    async fn empty_display_name_uses_bare_address() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| email.to == vec!["ann@example.com".to_string()])
            .returning(|_| Ok(()));

        let request = SendRequest::new("ann@example.com", names::RESET_SUCCESS, "Hi")
            .endpoint("auth.forgot")
            .display_name("");
        mailer(mock).send_email(request).await.unwrap();
    }

    #[tokio::test]
    async fn empty_payload_still_gets_tokenless_url() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| {
                let html = email.html.as_deref().unwrap_or_default();
                html.contains("https://www.camel.com/auth/forgot") && !html.contains("?t=")
            })
            .returning(|_| Ok(()));

        mailer(mock)
            .send_password_reset_success(&ann())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delivery_failure_is_fatal_and_typed() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(EmailError::Delivery { status: 502 }));

        let err = mailer(mock).send_confirmation(&ann()).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Delivery(EmailError::Delivery { status: 502 })
        ));
    }

    #[tokio::test]
    async fn password_changed_success_recipient_is_plain_address() {
        // Regression guard: the recipient must be the identity's email
        // address string, never the identity itself.
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| {
                email.to.len() == 1
                    && email.to[0].ends_with("ann@example.com")
                    && !email.to[0].contains("Identity")
            })
            .times(1)
            .returning(|_| Ok(()));

        mailer(mock)
            .send_password_changed_success(&ann())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn email_changed_notice_goes_to_old_address_without_link() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| {
                let html = email.html.as_deref().unwrap_or_default();
                email.to == vec!["Ann old@example.com".to_string()]
                    && html.contains("ann@example.com")
                    && !html.contains("?t=")
            })
            .times(1)
            .returning(|_| Ok(()));

        mailer(mock)
            .send_email_changed_notice(
                &ann(),
                EmailChangedNotice {
                    old_email: "old@example.com".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn email_change_request_goes_to_new_address_with_both_emails() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| {
                let html = email.html.as_deref().unwrap_or_default();
                email.to == vec!["Ann new@example.com".to_string()]
                    && email.subject == "Confirm your new Camel email address!"
                    && html.contains("ann@example.com")
                    && html.contains("new@example.com")
                    && html.contains("/auth/confirm?t=")
            })
            .times(1)
            .returning(|_| Ok(()));

        mailer(mock)
            .send_email_change_request(
                &ann(),
                EmailChangeRequest {
                    new_email: "new@example.com".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn password_reset_carries_tokenized_link() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .withf(|email| {
                let html = email.html.as_deref().unwrap_or_default();
                email.subject == "Reset your Camel password"
                    && html.contains("https://www.camel.com/auth/reset?t=")
            })
            .times(1)
            .returning(|_| Ok(()));

        mailer(mock).send_password_reset(&ann()).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_endpoint_propagates_before_sending() {
        let mut mock = MockEmailSender::new();
        mock.expect_send().times(0);

        let request =
            SendRequest::new("ann@example.com", names::RESET, "Hi").endpoint("auth.nope");
        let err = mailer(mock).send_email(request).await.unwrap_err();
        assert!(matches!(err, DispatchError::Link(LinkError::UnknownEndpoint(_))));
    }

    #[tokio::test]
    async fn payloads_are_fresh_per_call() {
        // Two sends through the same intent must not leak payload entries
        // (the `url` key in particular) into each other.
        let mut mock = MockEmailSender::new();
        mock.expect_send().times(2).returning(|_| Ok(()));

        let mailer = mailer(mock);
        mailer.send_confirmation(&ann()).await.unwrap();
        mailer.send_confirmation(&ann()).await.unwrap();
    }
}
