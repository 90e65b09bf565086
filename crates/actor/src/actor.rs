//! Actor trait, execution context and start spec.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::address::Addr;
use crate::config::{ActorConfig, FullMailboxPolicy};
use crate::strategy::ExecutionStrategy;

/// User state plus lifecycle hooks. Message handling lives in
/// [`crate::Handler`] implementations.
#[async_trait]
pub trait Actor: Send + Sized + 'static {
	/// Runs once per instance before its first message is dequeued.
	async fn on_start(&mut self, _ctx: &mut Context<Self>) {}

	/// Runs once per instance after it will dequeue no further messages.
	async fn on_stop(&mut self, _ctx: &mut Context<Self>) {}
}

/// Execution context handed to hooks and handlers of one actor instance.
///
/// The waits it offers follow the actor's [`ExecutionStrategy`], so the same
/// handler code blocks or suspends depending on how the actor was started.
pub struct Context<A>
where
	A: Actor,
{
	name: Arc<str>,
	strategy: ExecutionStrategy,
	worker: Option<usize>,
	address: Addr<A>,
	cancel: CancellationToken,
	stopping: bool,
}

impl<A> Context<A>
where
	A: Actor,
{
	pub(crate) fn new(address: Addr<A>, worker: Option<usize>, cancel: CancellationToken) -> Self {
		Self {
			name: address.name_arc(),
			strategy: address.strategy(),
			worker,
			address,
			cancel,
			stopping: false,
		}
	}

	/// Actor name.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn strategy(&self) -> ExecutionStrategy {
		self.strategy
	}

	/// Pool worker index of this instance; `None` on the cooperative thread.
	pub fn worker(&self) -> Option<usize> {
		self.worker
	}

	/// Returns an address to this actor, e.g. for self-sends.
	pub fn address(&self) -> Addr<A> {
		self.address.clone()
	}

	/// Stops this instance once the current handler returns.
	///
	/// Under the pool only the calling worker exits; the actor as a whole
	/// stops when its last instance does.
	pub fn stop(&mut self) {
		self.stopping = true;
	}

	pub fn is_stopping(&self) -> bool {
		self.stopping
	}

	/// Returns whether immediate shutdown was requested for the actor.
	///
	/// Long-running pool handlers can poll this to bail out early, since a
	/// worker thread cannot be interrupted mid-handler.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Waits for `duration` the way this strategy waits.
	///
	/// `Suspending` yields the thread to other tasks until the timer fires.
	/// `Blocking` parks the runtime thread, stalling every task on it, and
	/// `Pool` parks only this worker's thread.
	pub async fn sleep(&self, duration: Duration) {
		match self.strategy {
			ExecutionStrategy::Suspending => tokio::time::sleep(duration).await,
			ExecutionStrategy::Blocking | ExecutionStrategy::Pool => std::thread::sleep(duration),
		}
	}

	/// Awaits `fut` cooperatively, e.g. a request to another actor.
	///
	/// The instance dequeues nothing until the handler returns, so a future
	/// waiting on a request to this same actor never resolves.
	pub async fn wait<F>(&self, fut: F) -> F::Output
	where
		F: Future + Send,
	{
		fut.await
	}
}

type Factory<A> = dyn Fn() -> A + Send + Sync;

/// Builder spec for starting one actor.
pub struct ActorSpec<A>
where
	A: Actor,
{
	pub(crate) name: String,
	pub(crate) strategy: ExecutionStrategy,
	pub(crate) config: ActorConfig,
	pub(crate) factory: Arc<Factory<A>>,
}

impl<A> ActorSpec<A>
where
	A: Actor,
{
	/// Creates a spec from a factory invoked once per instance.
	pub fn new(name: impl Into<String>, factory: impl Fn() -> A + Send + Sync + 'static) -> Self {
		Self {
			name: name.into(),
			strategy: ExecutionStrategy::default(),
			config: ActorConfig::default(),
			factory: Arc::new(factory),
		}
	}

	/// Creates a spec named after the actor type.
	pub fn from_factory(factory: impl Fn() -> A + Send + Sync + 'static) -> Self {
		Self::new(short_type_name::<A>(), factory)
	}

	#[must_use]
	pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	/// Replaces the whole configuration.
	#[must_use]
	pub fn config(mut self, config: ActorConfig) -> Self {
		self.config = config;
		self
	}

	#[must_use]
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.config.mailbox_capacity = capacity;
		self
	}

	/// Sets the pool size. Ignored by cooperative strategies.
	#[must_use]
	pub fn workers(mut self, count: usize) -> Self {
		self.config.worker_count = count;
		self
	}

	#[must_use]
	pub fn policy(mut self, policy: FullMailboxPolicy) -> Self {
		self.config.full_mailbox_policy = policy;
		self
	}

	/// Number of instances this spec starts.
	pub(crate) fn instances(&self) -> usize {
		if self.strategy.is_cooperative() {
			1
		} else {
			self.config.worker_count
		}
	}
}

fn short_type_name<A>() -> String {
	let full = std::any::type_name::<A>();
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Arithmetic;

	impl Actor for Arithmetic {}

	#[test]
	fn spec_defaults_to_type_name_and_single_instance() {
		let spec = ActorSpec::from_factory(|| Arithmetic);
		assert_eq!(spec.name, "Arithmetic");
		assert_eq!(spec.strategy, ExecutionStrategy::Blocking);
		assert_eq!(spec.instances(), 1);
	}

	#[test]
	fn worker_count_only_applies_to_pool() {
		let spec = ActorSpec::new("math", || Arithmetic).workers(3);
		assert_eq!(spec.instances(), 1);
		let spec = spec.strategy(ExecutionStrategy::Pool);
		assert_eq!(spec.instances(), 3);
	}
}
