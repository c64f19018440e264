pub mod push;
pub mod smtp;

use async_trait::async_trait;

use crate::error::DeliveryError;

pub use push::{HttpPushGateway, PushGateway};
pub use smtp::SmtpMailer;

/// The narrow send contract every layer of the mail pipeline implements.
///
/// The innermost implementation talks to an SMTP server; the chunking,
/// retry and failover layers each wrap another `MailSender`.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError>;
}
