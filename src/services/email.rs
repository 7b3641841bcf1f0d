// src/services/email.rs
//! Outbound email.
//!
//! [`EmailService`] hands every message to a detached task: callers never
//! wait for delivery and never see a delivery error. A send that is still in
//! flight when the process exits is lost.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::common::config::SmtpConfig;
use crate::common::helpers::{escape_html, safe_email_log};

const SMTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Delivers through an SMTP relay using STARTTLS and login credentials
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let from = format!("Auth API <{}>", config.email).parse::<Mailbox>()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.email.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Used when no SMTP relay is configured; writes the email to the log instead
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        info!(
            to = %safe_email_log(&email.to),
            subject = %email.subject,
            "SMTP not configured, email not delivered"
        );
        debug!(body = %email.html_body, "Undelivered email body");
        Ok(())
    }
}

/// Fire-and-forget dispatcher for the account emails
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub fn send_welcome_email(&self, to: &str, name: &str) {
        self.dispatch(OutgoingEmail {
            to: to.to_string(),
            subject: "Welcome to Auth API!".to_string(),
            html_body: welcome_email_body(name),
        });
    }

    pub fn send_reset_password_email(&self, to: &str, reset_link: &str) {
        self.dispatch(OutgoingEmail {
            to: to.to_string(),
            subject: "Reset Your Password".to_string(),
            html_body: reset_password_email_body(reset_link),
        });
    }

    fn dispatch(&self, email: OutgoingEmail) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let to = safe_email_log(&email.to);
            let subject = email.subject.clone();
            match mailer.send(email).await {
                Ok(()) => debug!(to = %to, subject = %subject, "Email sent"),
                Err(e) => warn!(error = %e, to = %to, subject = %subject, "Email delivery failed"),
            }
        });
    }
}

pub fn welcome_email_body(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #4F46E5; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Hello {}!</h1>
        </div>
        <div class="content">
            <p>Welcome to our platform. We are glad to have you.</p>
        </div>
    </div>
</body>
</html>"#,
        escape_html(name)
    )
}

pub fn reset_password_email_body(reset_link: &str) -> String {
    let link = escape_html(reset_link);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #4F46E5; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <p>We received a request to reset your password.</p>
        <p><a class="button" href="{}">Reset password</a></p>
        <p>If the button does not work, copy this link into your browser:<br>{}</p>
        <p>This link expires in 1 hour. If you did not ask for a reset, you can ignore this email.</p>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        link, link
    )
}
