//! Message typing and per-message handler routing.

use async_trait::async_trait;

use crate::actor::{Actor, Context};

/// A typed message with a declared result type.
///
/// ```
/// use courier_actor::Message;
///
/// struct Square {
/// 	input: i64,
/// }
///
/// impl Message for Square {
/// 	type Result = i64;
/// }
/// ```
pub trait Message: Send + 'static {
	/// Value a handler produces for this message.
	type Result: Send + 'static;
}

/// Handling of one message kind by one actor type.
///
/// Implemented once per `(actor, message)` pair; dispatch is resolved at
/// compile time through the envelope that carries `M`.
#[async_trait]
pub trait Handler<M>: Actor
where
	M: Message,
{
	async fn handle(&mut self, msg: M, ctx: &mut Context<Self>) -> M::Result;
}
