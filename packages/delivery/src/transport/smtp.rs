use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use common::config::SmtpServerConfig;

use crate::error::DeliveryError;

use super::MailSender;

/// SMTP transport for one provider. Recipients are placed in BCC so a batch
/// is one message; the From address doubles as the visible To header.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpServerConfig, from: &str) -> Result<Self, DeliveryError> {
        let from: Mailbox = from
            .parse()
            .map_err(|_| DeliveryError::Address(from.to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DeliveryError::Provider(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.from.clone())
            .subject(subject);

        for recipient in recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|_| DeliveryError::Address(recipient.clone()))?;
            builder = builder.bcc(mailbox);
        }

        builder
            .body(body.to_string())
            .map_err(|e| DeliveryError::Provider(e.to_string()))
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let message = self.build_message(recipients, subject, body)?;

        match self.transport.send(message).await {
            Ok(_) => Ok(()),
            // 5xx rejections carry the provider's reason (quota strings live
            // here); timeouts, 4xx and connection errors are retryable.
            Err(e) if e.is_permanent() => Err(DeliveryError::Provider(e.to_string())),
            Err(e) => Err(DeliveryError::Transient(e.to_string())),
        }
    }
}
