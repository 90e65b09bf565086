//! Instance loop shared by every execution strategy, plus the code that
//! places instances on the runtime thread or on pool worker threads.
//!
//! Every strategy runs the same protocol per instance: `on_start`, then
//! dequeue, dispatch and resolve until the mailbox is closed and drained,
//! the actor is cancelled, or the instance asks to stop; then `on_stop`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::actor::{Actor, Context};
use crate::envelope::Envelope;
use crate::lifecycle::{InstanceGuard, Lifecycle};
use crate::mailbox::MailboxReceiver;
use crate::spawn::{spawn_instance, spawn_worker_thread};

/// Why one instance stopped dequeuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InstanceExit {
	/// The instance called [`Context::stop`].
	Stopped,
	/// Mailbox closed and drained.
	MailboxClosed,
	/// Immediate shutdown.
	Cancelled,
}

/// One actor instance ready to run.
pub(crate) struct Instance<A>
where
	A: Actor,
{
	pub(crate) actor: A,
	pub(crate) ctx: Context<A>,
	pub(crate) rx: MailboxReceiver<Envelope<A>>,
	pub(crate) guard: InstanceGuard,
}

impl<A> Instance<A>
where
	A: Actor,
{
	pub(crate) async fn run(self) -> InstanceExit {
		let Self { mut actor, mut ctx, rx, guard } = self;
		let cancel = guard.cancel_token();
		let exit = run_instance(&mut actor, &mut ctx, &rx, &cancel).await;
		tracing::debug!(
			actor = %ctx.name(),
			strategy = ctx.strategy().as_str(),
			worker = ctx.worker(),
			exit = ?exit,
			"actor.instance.exit"
		);
		drop(actor);
		drop(guard);
		exit
	}
}

async fn run_instance<A>(actor: &mut A, ctx: &mut Context<A>, rx: &MailboxReceiver<Envelope<A>>, cancel: &CancellationToken) -> InstanceExit
where
	A: Actor,
{
	tracing::debug!(actor = %ctx.name(), strategy = ctx.strategy().as_str(), worker = ctx.worker(), "actor.instance.start");

	let started = tokio::select! {
		biased;
		_ = cancel.cancelled() => false,
		_ = actor.on_start(ctx) => true,
	};
	if !started {
		return InstanceExit::Cancelled;
	}

	let exit = loop {
		if ctx.is_stopping() {
			break InstanceExit::Stopped;
		}

		let envelope = tokio::select! {
			biased;
			_ = cancel.cancelled() => break InstanceExit::Cancelled,
			msg = rx.recv() => {
				let Some(envelope) = msg else {
					break InstanceExit::MailboxClosed;
				};
				envelope
			}
		};

		// Dropping a preempted dispatch drops its responder, which resolves
		// the waiter with `Cancelled`.
		tokio::select! {
			biased;
			_ = cancel.cancelled() => break InstanceExit::Cancelled,
			() = envelope.dispatch(actor, ctx) => {}
		}
	};

	actor.on_stop(ctx).await;
	exit
}

/// Starts every instance for `strategy`.
///
/// Cooperative strategies spawn one task on `handle`. The pool spawns one
/// named OS thread per instance, each driving its own current-thread
/// scheduler. If a worker thread fails to spawn, the instances already
/// started are cancelled and the error is returned.
pub(crate) fn launch<A>(handle: &tokio::runtime::Handle, lifecycle: &Arc<Lifecycle>, instances: Vec<Instance<A>>) -> std::io::Result<()>
where
	A: Actor,
{
	if lifecycle.strategy().is_cooperative() {
		for instance in instances {
			spawn_instance(handle, lifecycle.strategy(), lifecycle.name(), async move {
				instance.run().await;
			});
		}
		return Ok(());
	}

	for (index, instance) in instances.into_iter().enumerate() {
		let thread_name = format!("{}-worker-{index}", lifecycle.name());
		if let Err(err) = spawn_worker_thread(thread_name, move || run_on_worker_thread(instance)) {
			tracing::error!(actor = %lifecycle.name(), worker = index, error = %err, "actor.worker.spawn_failed");
			// Instances not yet spawned release their slot as the
			// iterator drops.
			lifecycle.cancel();
			return Err(err);
		}
	}
	Ok(())
}

fn run_on_worker_thread<A>(instance: Instance<A>)
where
	A: Actor,
{
	let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();
	match runtime {
		Ok(runtime) => {
			runtime.block_on(instance.run());
		}
		Err(err) => {
			tracing::error!(actor = %instance.ctx.name(), worker = instance.ctx.worker(), error = %err, "actor.worker.runtime_failed");
		}
	}
}
