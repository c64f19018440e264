pub mod outbox_entry;
pub mod outbox_recipient;
