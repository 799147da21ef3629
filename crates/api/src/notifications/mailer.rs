//! Outbound email via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport. Configuration is
//! loaded from environment variables; if `MAIL_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and the mailer runs disabled,
//! reporting every send as undelivered.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// Mail is not configured for this deployment.
    #[error("Email delivery is not configured")]
    Disabled,
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `MAIL_FROM_ADDRESS` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@tessera.local";

const WELCOME_SUBJECT: &str = "Welcome!";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port (defaults to 587).
    pub port: u16,
    /// Optional SMTP username.
    pub username: Option<String>,
    /// Optional SMTP password.
    pub password: Option<String>,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Display name shown next to the "From" address.
    pub from_name: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `MAIL_HOST` is not set.
    ///
    /// | Variable            | Required | Default                 |
    /// |---------------------|----------|-------------------------|
    /// | `MAIL_HOST`         | yes      | --                      |
    /// | `MAIL_PORT`         | no       | `587`                   |
    /// | `MAIL_USERNAME`     | no       | --                      |
    /// | `MAIL_PASSWORD`     | no       | --                      |
    /// | `MAIL_FROM_ADDRESS` | no       | `noreply@tessera.local` |
    /// | `MAIL_FROM_NAME`    | no       | --                      |
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("MAIL_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            host,
            port: std::env::var("MAIL_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: std::env::var("MAIL_USERNAME").ok(),
            password: std::env::var("MAIL_PASSWORD").ok(),
            from_address: std::env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: std::env::var("MAIL_FROM_NAME").ok(),
        })
    }

    fn sender(&self) -> Result<Mailbox, EmailError> {
        let address: Address = self.from_address.parse()?;
        Ok(Mailbox::new(self.from_name.clone(), address))
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends account emails. Cheap to share behind an `Arc`.
pub struct Mailer {
    config: Option<EmailConfig>,
}

impl Mailer {
    pub fn new(config: Option<EmailConfig>) -> Self {
        if config.is_none() {
            tracing::info!("MAIL_HOST not set; outbound email disabled");
        }
        Self { config }
    }

    /// A mailer that never sends.
    pub fn disabled() -> Self {
        Self { config: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send the registration welcome email.
    ///
    /// Returns whether the message was handed to the SMTP server. Failures are
    /// logged, never propagated: callers treat this as fire-and-forget.
    pub async fn send_welcome_email(&self, to_email: &str) -> bool {
        match self.deliver_welcome(to_email).await {
            Ok(()) => true,
            Err(EmailError::Disabled) => {
                tracing::debug!(to = to_email, "Welcome email skipped; mail disabled");
                false
            }
            Err(e) => {
                tracing::warn!(to = to_email, error = %e, "Welcome email failed");
                false
            }
        }
    }

    async fn deliver_welcome(&self, to_email: &str) -> Result<(), EmailError> {
        let config = self.config.as_ref().ok_or(EmailError::Disabled)?;
        let email = build_welcome_message(config, to_email)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, "Welcome email sent");
        Ok(())
    }
}

/// Assemble the welcome message without sending it.
pub fn build_welcome_message(config: &EmailConfig, to_email: &str) -> Result<Message, EmailError> {
    let recipient: Address = to_email.parse()?;
    let body = format!(
        "<p>Hello,</p><p>Your account for <b>{to_email}</b> is ready. You can sign in now.</p>"
    );

    Message::builder()
        .from(config.sender()?)
        .to(Mailbox::new(None, recipient))
        .subject(WELCOME_SUBJECT)
        .header(ContentType::TEXT_HTML)
        .body(body)
        .map_err(|e| EmailError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
