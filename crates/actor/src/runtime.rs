use std::future::Future;
use std::sync::Arc;

use crate::actor::{Actor, ActorSpec, Context};
use crate::address::Addr;
use crate::config::ActorConfig;
use crate::envelope::Envelope;
use crate::error::StartError;
use crate::executor::{Instance, launch};
use crate::lifecycle::{InstanceGuard, Lifecycle, ShutdownMode, ShutdownReport};
use crate::mailbox::Mailbox;
use crate::registry::ActorRegistry;
use crate::strategy::ExecutionStrategy;

/// Process-level owner of the single cooperative thread.
///
/// Built on a current-thread scheduler: actors started with the `Blocking`
/// or `Suspending` strategy, and every future passed to [`Runtime::block_on`],
/// share the thread that calls `block_on`. Pool actors run on their own
/// threads and keep running between `block_on` calls.
///
/// Dropping the runtime cancels every actor it started.
#[derive(Debug)]
pub struct Runtime {
	rt: tokio::runtime::Runtime,
	handle: RuntimeHandle,
}

impl Runtime {
	/// Creates a runtime with an empty registry.
	pub fn new() -> std::io::Result<Self> {
		let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
		let handle = RuntimeHandle::from_tokio(rt.handle().clone());
		Ok(Self { rt, handle })
	}

	/// Returns a cloneable handle for starting actors from async code.
	pub fn handle(&self) -> &RuntimeHandle {
		&self.handle
	}

	/// Drives `fut` and every cooperative actor on the calling thread until
	/// `fut` completes.
	pub fn block_on<F>(&self, fut: F) -> F::Output
	where
		F: Future,
	{
		self.rt.block_on(fut)
	}

	/// Starts an actor. See [`RuntimeHandle::start`].
	pub fn start<A, F>(&self, factory: F, strategy: ExecutionStrategy, config: ActorConfig) -> Result<Addr<A>, StartError>
	where
		A: Actor,
		F: Fn() -> A + Send + Sync + 'static,
	{
		self.handle.start(factory, strategy, config)
	}

	/// Starts an actor from a spec. See [`RuntimeHandle::spawn`].
	pub fn spawn<A>(&self, spec: ActorSpec<A>) -> Result<Addr<A>, StartError>
	where
		A: Actor,
	{
		self.handle.spawn(spec)
	}

	/// Returns the registry of actors started through this runtime.
	pub fn registry(&self) -> &ActorRegistry {
		&self.handle.registry
	}

	/// Shuts down every actor started through this runtime, then drops it.
	pub fn shutdown(self, mode: ShutdownMode) -> ShutdownReport {
		let handle = self.handle.clone();
		self.block_on(async move { handle.shutdown_all(mode).await })
	}
}

impl Drop for Runtime {
	fn drop(&mut self) {
		self.handle.registry.cancel_all();
	}
}

/// Handle for starting actors onto a runtime thread.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
	tokio: tokio::runtime::Handle,
	registry: ActorRegistry,
}

impl RuntimeHandle {
	fn from_tokio(tokio: tokio::runtime::Handle) -> Self {
		Self {
			tokio,
			registry: ActorRegistry::new(),
		}
	}

	/// Wraps the tokio runtime the caller is running on, with a fresh
	/// registry. Cooperative actors are single-threaded only when that
	/// runtime is a current-thread scheduler.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime. See [`Self::try_current`].
	pub fn current() -> Self {
		Self::from_tokio(tokio::runtime::Handle::current())
	}

	/// Like [`Self::current`], returning `None` outside a tokio runtime.
	pub fn try_current() -> Option<Self> {
		tokio::runtime::Handle::try_current().ok().map(Self::from_tokio)
	}

	/// Starts an actor named after its type.
	///
	/// `factory` is invoked once per instance: once for cooperative
	/// strategies, `config.worker_count` times for the pool.
	pub fn start<A, F>(&self, factory: F, strategy: ExecutionStrategy, config: ActorConfig) -> Result<Addr<A>, StartError>
	where
		A: Actor,
		F: Fn() -> A + Send + Sync + 'static,
	{
		self.spawn(ActorSpec::from_factory(factory).strategy(strategy).config(config))
	}

	/// Starts an actor from a spec.
	pub fn spawn<A>(&self, spec: ActorSpec<A>) -> Result<Addr<A>, StartError>
	where
		A: Actor,
	{
		spec.config.validate()?;

		let name: Arc<str> = Arc::from(spec.name.as_str());
		let strategy = spec.strategy;
		let count = spec.instances();
		let mailbox = Mailbox::<Envelope<A>>::new(spec.config.mailbox_capacity);
		let tx = mailbox.sender();
		let lifecycle = Arc::new(Lifecycle::new(Arc::clone(&name), strategy, count, Box::new(tx.clone())));
		let addr = Addr::new(name, strategy, spec.config.full_mailbox_policy, tx, Arc::clone(&lifecycle));

		let instances: Vec<Instance<A>> = (0..count)
			.map(|index| {
				let worker = (!strategy.is_cooperative()).then_some(index);
				Instance {
					actor: (spec.factory)(),
					ctx: Context::new(addr.clone(), worker, lifecycle.cancel_token()),
					rx: mailbox.receiver(),
					guard: InstanceGuard::new(Arc::clone(&lifecycle)),
				}
			})
			.collect();

		self.registry.register(Arc::clone(&lifecycle));
		launch(&self.tokio, &lifecycle, instances)?;

		tracing::debug!(
			actor = %addr.name(),
			strategy = strategy.as_str(),
			instances = count,
			capacity = spec.config.mailbox_capacity,
			policy = spec.config.full_mailbox_policy.as_str(),
			"actor.started"
		);
		Ok(addr)
	}

	/// Returns the registry of actors started through this handle.
	pub fn registry(&self) -> &ActorRegistry {
		&self.registry
	}

	/// Shuts down every actor started through this handle.
	pub async fn shutdown_all(&self, mode: ShutdownMode) -> ShutdownReport {
		self.registry.shutdown_all(mode).await
	}
}
