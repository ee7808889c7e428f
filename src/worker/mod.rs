//! Background worker threads for services.
//!
//! Workers are the only code that runs off the loop thread. They communicate
//! solely through the owning service's outbound queue and are started and
//! stopped through the service lifecycle.
//!
//! # Architecture
//!
//! - `messages`: the inbox protocol, with span propagation across threads
//! - `handler`: the [`Job`] trait, the [`Worker`] thread and its [`Mailbox`]

pub mod handler;
pub mod messages;

pub use handler::{failure_tag, Job, Mailbox, Worker};
pub use messages::Envelope;
