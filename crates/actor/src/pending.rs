//! Single-resolution result cells linking one sent message to its sender.
//!
//! A [`Responder`] is the write side and travels inside the envelope to the
//! handler. A [`Request`] is the read side returned by [`crate::Addr::send`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::error::SendError;

type Outcome<R> = Result<R, SendError>;

/// Write side of a pending result.
///
/// Resolves at most once. Later attempts are ignored and report `false`, so
/// the sender always observes the first outcome. A responder dropped while
/// unresolved fails its request with [`SendError::Cancelled`].
pub struct Responder<R> {
	tx: Option<oneshot::Sender<Outcome<R>>>,
	resolved: bool,
}

impl<R> Responder<R> {
	pub(crate) fn channel() -> (Self, oneshot::Receiver<Outcome<R>>) {
		let (tx, rx) = oneshot::channel();
		(Self { tx: Some(tx), resolved: false }, rx)
	}

	/// Responder whose outcome nobody observes (`do_send`, `try_send`).
	pub(crate) fn detached() -> Self {
		Self { tx: None, resolved: false }
	}

	/// Resolves with a handler result.
	pub fn resolve(&mut self, value: R) -> bool {
		self.complete(Ok(value))
	}

	/// Fails with a delivery or handler error.
	pub fn fail(&mut self, err: SendError) -> bool {
		self.complete(Err(err))
	}

	pub fn is_resolved(&self) -> bool {
		self.resolved
	}

	/// Returns whether the sender stopped waiting for this result.
	pub fn is_abandoned(&self) -> bool {
		self.tx.as_ref().is_some_and(oneshot::Sender::is_closed)
	}

	fn complete(&mut self, outcome: Outcome<R>) -> bool {
		if self.resolved {
			return false;
		}
		self.resolved = true;
		if let Some(tx) = self.tx.take() {
			// Receiver gone means the caller abandoned interest.
			let _ = tx.send(outcome);
		}
		true
	}
}

impl<R> Drop for Responder<R> {
	fn drop(&mut self) {
		if !self.resolved
			&& let Some(tx) = self.tx.take()
		{
			let _ = tx.send(Err(SendError::Cancelled));
		}
	}
}

/// Read side of a pending result, returned by [`crate::Addr::send`].
///
/// The message is already enqueued (possibly parked behind a full mailbox)
/// when this value is created. Dropping it, or timing it out, abandons
/// interest without recalling the message.
#[must_use = "requests resolve only when awaited; use `do_send` for fire-and-forget"]
pub struct Request<R> {
	fut: BoxFuture<'static, Outcome<R>>,
}

impl<R> Request<R>
where
	R: Send + 'static,
{
	pub(crate) fn pending(rx: oneshot::Receiver<Outcome<R>>) -> Self {
		Self {
			fut: async move { rx.await.unwrap_or(Err(SendError::MailboxClosed)) }.boxed(),
		}
	}

	pub(crate) fn failed(err: SendError) -> Self {
		Self {
			fut: futures::future::ready(Err(err)).boxed(),
		}
	}

	/// Abandons interest after `timeout`, resolving [`SendError::Cancelled`].
	///
	/// The message itself stays queued and is still handled.
	pub fn timeout(self, timeout: Duration) -> Request<R> {
		Self {
			fut: async move { tokio::time::timeout(timeout, self).await.unwrap_or(Err(SendError::Cancelled)) }.boxed(),
		}
	}
}

impl<R> Future for Request<R> {
	type Output = Outcome<R>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.fut.as_mut().poll(cx)
	}
}

impl<R> std::fmt::Debug for Request<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Request").finish_non_exhaustive()
	}
}
