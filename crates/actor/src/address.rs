use std::sync::Arc;

use crate::actor::Actor;
use crate::config::FullMailboxPolicy;
use crate::envelope::{Envelope, envelope};
use crate::error::SendError;
use crate::lifecycle::{Lifecycle, ShutdownMode, ShutdownReport};
use crate::mailbox::{MailboxSendError, MailboxSender};
use crate::message::{Handler, Message};
use crate::pending::{Request, Responder};
use crate::strategy::ExecutionStrategy;

/// Cloneable handle used to send messages to one actor.
///
/// Dropping every address does not stop the actor; use [`Addr::stop`] or
/// [`Addr::shutdown`].
pub struct Addr<A>
where
	A: Actor,
{
	name: Arc<str>,
	strategy: ExecutionStrategy,
	policy: FullMailboxPolicy,
	tx: MailboxSender<Envelope<A>>,
	lifecycle: Arc<Lifecycle>,
}

impl<A> Clone for Addr<A>
where
	A: Actor,
{
	fn clone(&self) -> Self {
		Self {
			name: Arc::clone(&self.name),
			strategy: self.strategy,
			policy: self.policy,
			tx: self.tx.clone(),
			lifecycle: Arc::clone(&self.lifecycle),
		}
	}
}

impl<A> std::fmt::Debug for Addr<A>
where
	A: Actor,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Addr")
			.field("name", &self.name)
			.field("strategy", &self.strategy)
			.field("pending", &self.tx.len())
			.field("closed", &self.tx.is_closed())
			.finish()
	}
}

impl<A> Addr<A>
where
	A: Actor,
{
	pub(crate) fn new(
		name: Arc<str>,
		strategy: ExecutionStrategy,
		policy: FullMailboxPolicy,
		tx: MailboxSender<Envelope<A>>,
		lifecycle: Arc<Lifecycle>,
	) -> Self {
		Self {
			name,
			strategy,
			policy,
			tx,
			lifecycle,
		}
	}

	/// Actor name.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		Arc::clone(&self.name)
	}

	pub fn strategy(&self) -> ExecutionStrategy {
		self.strategy
	}

	pub fn policy(&self) -> FullMailboxPolicy {
		self.policy
	}

	/// Sends a message and returns a handle resolving to the handler result.
	///
	/// The message is enqueued before this returns and the calling thread
	/// never blocks. When the mailbox is full the outcome follows the
	/// configured [`FullMailboxPolicy`]: under `Wait` the message is parked
	/// behind earlier sends and admitted in order as capacity frees.
	/// Dropping the returned request, or letting it time out, never recalls
	/// the message.
	pub fn send<M>(&self, msg: M) -> Request<M::Result>
	where
		A: Handler<M>,
		M: Message,
	{
		let (responder, rx) = Responder::channel();
		let envelope = envelope::<A, M>(msg, responder);
		let sent = match self.policy {
			FullMailboxPolicy::Wait => self.tx.park(envelope),
			FullMailboxPolicy::Reject | FullMailboxPolicy::Drop => self.tx.try_send(envelope),
		};
		match sent {
			Ok(()) => Request::pending(rx),
			Err(MailboxSendError::Closed(_)) => Request::failed(SendError::MailboxClosed),
			Err(MailboxSendError::Full(_)) => {
				if self.policy == FullMailboxPolicy::Reject {
					tracing::warn!(actor = %self.name, capacity = self.tx.capacity(), "actor.send.rejected");
				} else {
					tracing::trace!(actor = %self.name, "actor.send.rejected");
				}
				Request::failed(SendError::MailboxFull)
			}
		}
	}

	/// Fire-and-forget send. Never reports failure to the caller; a message
	/// that cannot be enqueued is dropped and logged per policy.
	pub fn do_send<M>(&self, msg: M)
	where
		A: Handler<M>,
		M: Message,
	{
		let Err(err) = self.tx.try_send(envelope::<A, M>(msg, Responder::detached())) else {
			return;
		};
		let reason = if err.is_full() { "full" } else { "closed" };
		match self.policy {
			FullMailboxPolicy::Drop => tracing::trace!(actor = %self.name, reason, "actor.do_send.dropped"),
			FullMailboxPolicy::Wait | FullMailboxPolicy::Reject => {
				tracing::warn!(actor = %self.name, reason, "actor.do_send.dropped");
			}
		}
	}

	/// Enqueues only if capacity is available right now. Never suspends and
	/// leaves the mailbox untouched on failure. The handler result is
	/// discarded.
	pub fn try_send<M>(&self, msg: M) -> Result<(), SendError>
	where
		A: Handler<M>,
		M: Message,
	{
		self.tx.try_send(envelope::<A, M>(msg, Responder::detached())).map_err(|err| match err {
			MailboxSendError::Full(_) => SendError::MailboxFull,
			MailboxSendError::Closed(_) => SendError::MailboxClosed,
		})
	}

	/// Closes the mailbox. Queued messages are still handled, then every
	/// instance runs `on_stop` and exits. Later sends fail with
	/// [`SendError::MailboxClosed`].
	pub fn stop(&self) {
		self.lifecycle.close();
	}

	/// Stops the actor and waits for its instances per `mode`.
	pub async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		self.lifecycle.shutdown(mode).await
	}

	/// Waits until every instance has exited.
	pub async fn stopped(&self) {
		self.lifecycle.join().await;
	}

	/// Number of messages not yet dequeued, parked ones included.
	pub fn len(&self) -> usize {
		self.tx.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tx.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.tx.capacity()
	}

	/// Returns whether the mailbox still accepts messages.
	pub fn connected(&self) -> bool {
		!self.tx.is_closed()
	}

	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}

	/// Number of instances that have not exited yet.
	pub fn running_instances(&self) -> usize {
		self.lifecycle.running()
	}
}
