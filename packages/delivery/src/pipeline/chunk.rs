use std::sync::Arc;

use crate::error::DeliveryError;
use crate::transport::MailSender;

use super::SuccessHandler;

/// Splits an oversized recipient list into provider-sized batches and sends
/// them in order. The first failing batch aborts the remaining ones and
/// propagates; untouched recipients stay in the outbox for the next sweep.
pub struct ChunkedSender {
    delegate: Arc<dyn MailSender>,
    max_batch_size: usize,
    success: Arc<dyn SuccessHandler>,
}

impl ChunkedSender {
    pub fn new(
        delegate: Arc<dyn MailSender>,
        max_batch_size: usize,
        success: Arc<dyn SuccessHandler>,
    ) -> Self {
        assert!(max_batch_size > 0, "max_batch_size must be positive");
        Self {
            delegate,
            max_batch_size,
            success,
        }
    }

    pub async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        for batch in recipients.chunks(self.max_batch_size) {
            self.delegate.send(batch, subject, body).await?;

            // Positive handoff for everyone in the batch.
            for recipient in batch {
                self.success.confirm(recipient, subject, body).await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingSender {
        batches: Mutex<Vec<Vec<String>>>,
        fail_on_batch: Option<usize>,
    }

    #[async_trait]
    impl MailSender for RecordingSender {
        async fn send(
            &self,
            recipients: &[String],
            _subject: &str,
            _body: &str,
        ) -> Result<(), DeliveryError> {
            let mut batches = self.batches.lock().unwrap();
            if self.fail_on_batch == Some(batches.len()) {
                return Err(DeliveryError::Transient("connection reset".into()));
            }
            batches.push(recipients.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSuccess {
        confirmed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SuccessHandler for RecordingSuccess {
        async fn confirm(&self, recipient: &str, _subject: &str, _body: &str) {
            self.confirmed.lock().unwrap().push(recipient.to_string());
        }
    }

    fn addresses(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("guest{i}@example.com")).collect()
    }

    async fn send_chunked(
        recipients: &[String],
        max_batch_size: usize,
    ) -> (Arc<RecordingSender>, Result<(), DeliveryError>) {
        let delegate = Arc::new(RecordingSender::default());
        let sender = ChunkedSender::new(
            delegate.clone(),
            max_batch_size,
            Arc::new(RecordingSuccess::default()),
        );
        let result = sender.send(recipients, "Reminder", "See you there").await;
        (delegate, result)
    }

    #[tokio::test]
    async fn list_within_limit_is_one_batch() {
        let (delegate, result) = send_chunked(&addresses(30), 50).await;
        assert!(result.is_ok());
        assert_eq!(delegate.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn oversized_list_is_split_in_order() {
        let recipients = addresses(120);
        let (delegate, result) = send_chunked(&recipients, 50).await;
        assert!(result.is_ok());

        let batches = delegate.batches.lock().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 50);
        assert_eq!(batches[1].len(), 50);
        assert_eq!(batches[2].len(), 20);
        assert_eq!(batches[0][0], recipients[0]);
        assert_eq!(batches[2][19], recipients[119]);
    }

    #[tokio::test]
    async fn empty_list_sends_nothing() {
        let (delegate, result) = send_chunked(&[], 50).await;
        assert!(result.is_ok());
        assert!(delegate.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exact_multiple_has_no_trailing_batch() {
        let (delegate, result) = send_chunked(&addresses(100), 50).await;
        assert!(result.is_ok());
        assert_eq!(delegate.batches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn batch_failure_aborts_remaining_batches() {
        let delegate = Arc::new(RecordingSender {
            batches: Mutex::new(Vec::new()),
            fail_on_batch: Some(1),
        });
        let success = Arc::new(RecordingSuccess::default());
        let sender = ChunkedSender::new(delegate.clone(), 50, success.clone());

        let result = sender.send(&addresses(120), "Reminder", "Body").await;
        assert!(result.is_err());

        // First batch went out and was confirmed; nothing after the failure.
        assert_eq!(delegate.batches.lock().unwrap().len(), 1);
        assert_eq!(success.confirmed.lock().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn successful_batches_confirm_every_recipient() {
        let recipients = addresses(30);
        let delegate = Arc::new(RecordingSender::default());
        let success = Arc::new(RecordingSuccess::default());
        let sender = ChunkedSender::new(delegate, 50, success.clone());

        sender.send(&recipients, "Reminder", "Body").await.unwrap();
        assert_eq!(*success.confirmed.lock().unwrap(), recipients);
    }
}
