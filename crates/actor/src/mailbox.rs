use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Enqueue failure. The rejected message is handed back to the caller.
#[derive(Clone, PartialEq, Eq)]
pub enum MailboxSendError<T> {
	/// Mailbox is closed.
	Closed(T),
	/// Queue is at capacity and a non-waiting send was used.
	Full(T),
}

impl<T> MailboxSendError<T> {
	/// Returns the message that could not be enqueued.
	pub fn into_inner(self) -> T {
		match self {
			Self::Closed(msg) | Self::Full(msg) => msg,
		}
	}

	pub fn is_full(&self) -> bool {
		matches!(self, Self::Full(_))
	}

	pub fn is_closed(&self) -> bool {
		matches!(self, Self::Closed(_))
	}
}

impl<T> std::fmt::Debug for MailboxSendError<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Closed(_) => f.write_str("Closed(..)"),
			Self::Full(_) => f.write_str("Full(..)"),
		}
	}
}

struct MailboxState<T> {
	queue: VecDeque<T>,
	/// Parked items admitted in order as the queue frees. Non-empty only
	/// while `queue` is at capacity.
	parked: VecDeque<T>,
	closed: bool,
}

struct MailboxInner<T> {
	capacity: usize,
	state: Mutex<MailboxState<T>>,
	notify_recv: Notify,
	notify_send: Notify,
}

/// Multi-producer mailbox sender.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver. Clones share the queue, so several consumers can pull
/// from one mailbox; each item is delivered to exactly one of them.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Bounded FIFO mailbox shared between producers and actor instances.
pub struct Mailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Clone for MailboxReceiver<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Mailbox<T> {
	/// Creates a bounded mailbox.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero. [`crate::ActorConfig::validate`] rejects
	/// that before any actor mailbox is built.
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		Self {
			inner: Arc::new(MailboxInner {
				capacity,
				state: Mutex::new(MailboxState {
					queue: VecDeque::with_capacity(capacity),
					parked: VecDeque::new(),
					closed: false,
				}),
				notify_recv: Notify::new(),
				notify_send: Notify::new(),
			}),
		}
	}

	/// Returns a sender handle.
	pub fn sender(&self) -> MailboxSender<T> {
		MailboxSender {
			inner: Arc::clone(&self.inner),
		}
	}

	/// Returns a receiver handle.
	pub fn receiver(&self) -> MailboxReceiver<T> {
		MailboxReceiver {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> MailboxInner<T> {
	fn close(&self) {
		self.state.lock().closed = true;
		self.notify_recv.notify_waiters();
		self.notify_send.notify_waiters();
	}

	fn close_and_drain(&self) -> Vec<T> {
		let drained = {
			let mut state = self.state.lock();
			state.closed = true;
			let parked = std::mem::take(&mut state.parked);
			state.queue.drain(..).chain(parked).collect()
		};
		self.notify_recv.notify_waiters();
		self.notify_send.notify_waiters();
		drained
	}

	fn len(&self) -> usize {
		let state = self.state.lock();
		state.queue.len() + state.parked.len()
	}

	fn is_closed(&self) -> bool {
		self.state.lock().closed
	}
}

impl<T> MailboxSender<T> {
	/// Closes the mailbox. Receivers drain existing items then return `None`.
	pub fn close(&self) {
		self.inner.close();
	}

	/// Closes the mailbox and removes every queued item, returning them in
	/// FIFO order.
	pub fn close_and_drain(&self) -> Vec<T> {
		self.inner.close_and_drain()
	}

	/// Non-blocking enqueue; never waits for capacity.
	///
	/// Reports `Full` while parked items are pending, so nothing overtakes
	/// them.
	pub fn try_send(&self, msg: T) -> Result<(), MailboxSendError<T>> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(MailboxSendError::Closed(msg));
		}
		if state.queue.len() >= self.inner.capacity || !state.parked.is_empty() {
			return Err(MailboxSendError::Full(msg));
		}
		state.queue.push_back(msg);
		drop(state);
		self.inner.notify_recv.notify_one();
		Ok(())
	}

	/// Enqueues now, parking the item behind earlier ones when the queue is
	/// full. Parked items are admitted in FIFO order as receivers free
	/// capacity and count towards [`Self::len`]. Fails only when closed.
	pub fn park(&self, msg: T) -> Result<(), MailboxSendError<T>> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(MailboxSendError::Closed(msg));
		}
		if state.queue.len() < self.inner.capacity && state.parked.is_empty() {
			state.queue.push_back(msg);
			drop(state);
			self.inner.notify_recv.notify_one();
		} else {
			state.parked.push_back(msg);
		}
		Ok(())
	}

	/// Enqueues, waiting for capacity when the queue is full.
	///
	/// Returns `Closed` if the mailbox closes before capacity frees. Never
	/// returns `Full`.
	pub async fn send(&self, msg: T) -> Result<(), MailboxSendError<T>> {
		let mut msg = msg;
		loop {
			// Register before checking capacity so a concurrent pop or close
			// between the check and the await is not lost.
			let notified = self.inner.notify_send.notified();
			match self.try_send(msg) {
				Ok(()) => return Ok(()),
				Err(MailboxSendError::Full(back)) => msg = back,
				Err(closed) => return Err(closed),
			}
			notified.await;
		}
	}

	/// Returns the number of pending items, parked ones included.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns queue capacity.
	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	pub fn is_closed(&self) -> bool {
		self.inner.is_closed()
	}
}

impl<T> MailboxReceiver<T> {
	/// Receives one message. Returns `None` once mailbox is closed and drained.
	pub async fn recv(&self) -> Option<T> {
		loop {
			let notified = self.inner.notify_recv.notified();
			{
				let mut state = self.inner.state.lock();
				if let Some(msg) = state.queue.pop_front() {
					if let Some(parked) = state.parked.pop_front() {
						state.queue.push_back(parked);
					}
					drop(state);
					self.inner.notify_send.notify_one();
					return Some(msg);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}

	/// Closes the mailbox from the consuming side.
	pub fn close(&self) {
		self.inner.close();
	}

	/// Closes the mailbox and removes every queued item.
	pub fn close_and_drain(&self) -> Vec<T> {
		self.inner.close_and_drain()
	}

	/// Returns the number of pending items, parked ones included.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
