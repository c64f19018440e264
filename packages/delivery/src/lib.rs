pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod outbox;
pub mod pipeline;
pub mod push;
pub mod transport;

pub use error::DeliveryError;
