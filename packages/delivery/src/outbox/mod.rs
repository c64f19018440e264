pub mod store;
pub mod sweeper;
pub mod txn;

pub use store::{OutboxStore, OutboxSuccessHandler};
pub use sweeper::{run_recovery_sweeper, sweep_once};
pub use txn::OutboxTransaction;
