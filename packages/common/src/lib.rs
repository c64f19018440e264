pub mod backoff;
pub mod config;
pub mod push;

pub use push::{MulticastResponse, PushErrorCode, PushPayload, SendOutcome};
