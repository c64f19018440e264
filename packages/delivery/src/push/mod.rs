pub mod classifier;
pub mod service;

pub use classifier::{Classification, classify};
pub use service::{PushService, TokenStore};
