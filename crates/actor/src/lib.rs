//! In-process actor runtime.
//!
//! An actor is user state plus [`Handler`] implementations, started on a
//! [`Runtime`] under one [`ExecutionStrategy`] and reached through a
//! cloneable [`Addr`]. Each actor owns one bounded FIFO mailbox; messages are
//! enqueued without blocking the caller and each produces a [`Request`]
//! resolving exactly once to the handler result or a [`SendError`].
//!
//! * [`ExecutionStrategy::Blocking`]: one instance on the runtime thread;
//!   waits inside handlers stall that thread.
//! * [`ExecutionStrategy::Suspending`]: one instance on the runtime thread;
//!   waits inside handlers yield to other tasks.
//! * [`ExecutionStrategy::Pool`]: `worker_count` instances on dedicated
//!   threads sharing one mailbox; completion order follows handler latency.
//!
//! Actors stop only when asked to, via [`Addr::stop`], [`Addr::shutdown`],
//! [`Runtime::shutdown`] or dropping the [`Runtime`].

mod actor;
mod address;
mod config;
mod envelope;
mod error;
mod executor;
mod lifecycle;
mod mailbox;
mod message;
mod pending;
mod registry;
mod runtime;
mod spawn;
mod strategy;


use std::any::Any;

pub use actor::{Actor, ActorSpec, Context};
pub use address::Addr;
pub use config::{ActorConfig, DEFAULT_MAILBOX_CAPACITY, FullMailboxPolicy};
pub use error::{ConfigError, SendError, StartError};
pub use lifecycle::{ShutdownMode, ShutdownReport};
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender};
pub use message::{Handler, Message};
pub use pending::Request;
pub use registry::{ActorRecord, ActorRegistry};
pub use runtime::{Runtime, RuntimeHandle};
pub use strategy::ExecutionStrategy;

/// Extracts a readable message from a panic payload.
///
/// Handles the `&'static str` and `String` payloads produced by `panic!`;
/// anything else reports as an opaque panic.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"<non-string panic payload>".to_string()
	}
}
