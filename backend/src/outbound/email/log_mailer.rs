//! Structured-log [`Mailer`] adapter.
//!
//! Emits each token as a structured event instead of sending real mail. An
//! operator (or a local developer) reads the token out of the log stream;
//! swapping in an SMTP-backed adapter is a wiring change only.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Mailer, MailerError};

/// Delivers tokens to the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailerError> {
        info!(email, token, "email verification token issued");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailerError> {
        info!(email, token, "password reset token issued");
        Ok(())
    }
}
