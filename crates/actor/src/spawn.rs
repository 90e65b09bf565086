use std::future::Future;

use tokio::task::JoinHandle;

use crate::strategy::ExecutionStrategy;

/// Spawns a cooperative actor instance onto the runtime thread.
pub(crate) fn spawn_instance<F>(handle: &tokio::runtime::Handle, strategy: ExecutionStrategy, actor: &str, fut: F) -> JoinHandle<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	tracing::trace!(actor, strategy = strategy.as_str(), "actor.spawn");
	handle.spawn(fut)
}

/// Spawns a dedicated named OS thread for one pool worker.
pub(crate) fn spawn_worker_thread<F>(name: String, f: F) -> std::io::Result<std::thread::JoinHandle<()>>
where
	F: FnOnce() + Send + 'static,
{
	tracing::trace!(thread = %name, strategy = ExecutionStrategy::Pool.as_str(), "actor.spawn_thread");
	std::thread::Builder::new().name(name).spawn(f)
}
