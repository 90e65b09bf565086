use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::actor::Actor;
use crate::envelope::Envelope;
use crate::error::SendError;
use crate::mailbox::MailboxSender;
use crate::strategy::ExecutionStrategy;

/// Shutdown mode for an actor.
#[derive(Debug, Clone, Copy)]
pub enum ShutdownMode {
	/// Cancel instances at their next await point and fail everything still
	/// queued with [`SendError::MailboxClosed`].
	Immediate,
	/// Close the mailbox, let instances drain it, and escalate to
	/// `Immediate` if they have not exited within `timeout`.
	Graceful { timeout: Duration },
}

/// Outcome of one shutdown request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
	pub(crate) completed: bool,
	pub(crate) timed_out: bool,
}

impl ShutdownReport {
	/// All instances exited before the call returned.
	pub fn completed(&self) -> bool {
		self.completed
	}

	/// A graceful shutdown hit its deadline and was escalated.
	pub fn timed_out(&self) -> bool {
		self.timed_out
	}

	pub(crate) fn merge(self, other: Self) -> Self {
		Self {
			completed: self.completed && other.completed,
			timed_out: self.timed_out || other.timed_out,
		}
	}
}

impl Default for ShutdownReport {
	fn default() -> Self {
		Self {
			completed: true,
			timed_out: false,
		}
	}
}

/// Mailbox operations the lifecycle needs without knowing the actor type.
pub(crate) trait MailboxControl: Send + Sync {
	fn close(&self);
	/// Closes and fails every queued envelope with `MailboxClosed`.
	fn close_and_reject(&self) -> usize;
	fn len(&self) -> usize;
	fn capacity(&self) -> usize;
	fn is_closed(&self) -> bool;
}

impl<A> MailboxControl for MailboxSender<Envelope<A>>
where
	A: Actor,
{
	fn close(&self) {
		MailboxSender::close(self);
	}

	fn close_and_reject(&self) -> usize {
		let drained = self.close_and_drain();
		let count = drained.len();
		for envelope in drained {
			envelope.reject(SendError::MailboxClosed);
		}
		count
	}

	fn len(&self) -> usize {
		MailboxSender::len(self)
	}

	fn capacity(&self) -> usize {
		MailboxSender::capacity(self)
	}

	fn is_closed(&self) -> bool {
		MailboxSender::is_closed(self)
	}
}

/// Instance accounting and stop coordination for one started actor.
///
/// Shared by every address, every instance and the runtime registry. When
/// the last instance exits the mailbox is closed and drained so that no
/// sender waits on an actor that will never answer.
pub(crate) struct Lifecycle {
	name: Arc<str>,
	strategy: ExecutionStrategy,
	instances: usize,
	running: AtomicUsize,
	cancel: CancellationToken,
	done: Notify,
	mailbox: Box<dyn MailboxControl>,
}

impl Lifecycle {
	pub(crate) fn new(name: Arc<str>, strategy: ExecutionStrategy, instances: usize, mailbox: Box<dyn MailboxControl>) -> Self {
		Self {
			name,
			strategy,
			instances,
			running: AtomicUsize::new(instances),
			cancel: CancellationToken::new(),
			done: Notify::new(),
			mailbox,
		}
	}

	pub(crate) fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn strategy(&self) -> ExecutionStrategy {
		self.strategy
	}

	pub(crate) fn instances(&self) -> usize {
		self.instances
	}

	pub(crate) fn running(&self) -> usize {
		self.running.load(Ordering::Acquire)
	}

	pub(crate) fn is_finished(&self) -> bool {
		self.running() == 0
	}

	pub(crate) fn cancel_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	pub(crate) fn mailbox(&self) -> &dyn MailboxControl {
		self.mailbox.as_ref()
	}

	/// Graceful stop request: close the mailbox and let instances drain it.
	pub(crate) fn close(&self) {
		self.mailbox.close();
	}

	/// Immediate stop request; does not wait for instances.
	pub(crate) fn cancel(&self) {
		self.cancel.cancel();
		let rejected = self.mailbox.close_and_reject();
		if rejected > 0 {
			tracing::debug!(actor = %self.name, rejected, "actor.mailbox.rejected");
		}
	}

	/// Records one instance exit.
	pub(crate) fn instance_exited(&self) {
		let previous = self.running.fetch_sub(1, Ordering::AcqRel);
		if previous == 1 {
			let rejected = self.mailbox.close_and_reject();
			tracing::debug!(actor = %self.name, strategy = self.strategy.as_str(), rejected, "actor.stopped");
			self.done.notify_waiters();
		}
	}

	/// Waits until every instance has exited.
	pub(crate) async fn join(&self) {
		loop {
			// Register before checking so a concurrent final exit is not missed.
			let notified = self.done.notified();
			if self.is_finished() {
				return;
			}
			notified.await;
		}
	}

	/// Joins with a deadline. Returns `true` if every instance exited in time.
	pub(crate) async fn join_with_timeout(&self, timeout: Duration) -> bool {
		tokio::time::timeout(timeout, self.join()).await.is_ok()
	}

	pub(crate) async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		match mode {
			ShutdownMode::Immediate => {
				self.cancel();
				self.join().await;
				ShutdownReport {
					completed: true,
					timed_out: false,
				}
			}
			ShutdownMode::Graceful { timeout } => {
				self.close();
				if self.join_with_timeout(timeout).await {
					return ShutdownReport {
						completed: true,
						timed_out: false,
					};
				}
				tracing::warn!(actor = %self.name, timeout_ms = timeout.as_millis() as u64, "actor.shutdown.timeout");
				self.cancel();
				ShutdownReport {
					completed: self.is_finished(),
					timed_out: true,
				}
			}
		}
	}
}

/// Decrements the running count when an instance exits, including by panic
/// in a lifecycle hook or a failed worker thread spawn.
pub(crate) struct InstanceGuard {
	lifecycle: Arc<Lifecycle>,
}

impl InstanceGuard {
	pub(crate) fn new(lifecycle: Arc<Lifecycle>) -> Self {
		Self { lifecycle }
	}

	pub(crate) fn cancel_token(&self) -> CancellationToken {
		self.lifecycle.cancel_token()
	}
}

impl Drop for InstanceGuard {
	fn drop(&mut self) {
		self.lifecycle.instance_exited();
	}
}
