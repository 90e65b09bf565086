use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::actor::{Actor, Context};
use crate::error::SendError;
use crate::message::{Handler, Message};
use crate::pending::Responder;

/// Type-erased message bound for actor `A`.
pub(crate) trait Dispatch<A: Actor>: Send {
	/// Runs the matching handler and resolves the responder. A handler panic
	/// resolves [`SendError::HandlerFault`] instead of unwinding the instance.
	fn dispatch<'a>(self: Box<Self>, actor: &'a mut A, ctx: &'a mut Context<A>) -> BoxFuture<'a, ()>;

	/// Fails the responder without running the handler.
	fn reject(self: Box<Self>, err: SendError);
}

pub(crate) type Envelope<A> = Box<dyn Dispatch<A>>;

struct Payload<M>
where
	M: Message,
{
	msg: M,
	responder: Responder<M::Result>,
}

pub(crate) fn envelope<A, M>(msg: M, responder: Responder<M::Result>) -> Envelope<A>
where
	A: Handler<M>,
	M: Message,
{
	Box::new(Payload { msg, responder })
}

impl<A, M> Dispatch<A> for Payload<M>
where
	A: Handler<M>,
	M: Message,
{
	fn dispatch<'a>(self: Box<Self>, actor: &'a mut A, ctx: &'a mut Context<A>) -> BoxFuture<'a, ()> {
		let Payload { msg, mut responder } = *self;
		async move {
			let outcome = AssertUnwindSafe(actor.handle(msg, ctx)).catch_unwind().await;
			match outcome {
				Ok(value) => {
					if responder.is_abandoned() {
						tracing::trace!(actor = %ctx.name(), "actor.reply.abandoned");
					}
					responder.resolve(value);
				}
				Err(payload) => {
					let message = crate::panic_message(payload.as_ref());
					tracing::warn!(
						actor = %ctx.name(),
						strategy = ctx.strategy().as_str(),
						worker = ctx.worker(),
						panic = %message,
						"actor.handler.fault"
					);
					responder.fail(SendError::HandlerFault(message));
				}
			}
		}
		.boxed()
	}

	fn reject(self: Box<Self>, err: SendError) {
		let Payload { mut responder, .. } = *self;
		responder.fail(err);
	}
}
