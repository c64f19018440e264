use sea_orm::DbErr;
use thiserror::Error;

/// Failure taxonomy of the delivery pipeline.
///
/// The retry layer only retries [`DeliveryError::Transient`]; everything else
/// passes through on the first occurrence so the failover layer can inspect
/// the original provider message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transient transport failure (timeout, connection reset). Retryable.
    #[error("transient transport failure: {0}")]
    Transient(String),

    /// The provider accepted the connection but rejected the send. Not
    /// retried locally; checked against the breaker's quota signature.
    #[error("provider rejected send: {0}")]
    Provider(String),

    /// Push gateway request or response handling failed.
    #[error("push gateway error: {0}")]
    Gateway(String),

    /// A recipient address could not be parsed into a mailbox.
    #[error("invalid mail address: {0}")]
    Address(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl DeliveryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
