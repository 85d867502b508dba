//! Port for out-of-band token delivery.

use async_trait::async_trait;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by mailer adapters.
    pub enum MailerError {
        /// The message could not be handed to the delivery channel.
        Delivery { message: String } =>
            "mail delivery failed: {message}",
    }
}

/// Port for delivering verification and reset tokens to an address.
///
/// Delivery is best-effort from the account service's perspective: a failure
/// is logged but never fails registration or a reset request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver an e-mail verification token.
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailerError>;

    /// Deliver a password reset token.
    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailerError>;
}
