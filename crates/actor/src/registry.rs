use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::lifecycle::{Lifecycle, ShutdownMode, ShutdownReport};
use crate::strategy::ExecutionStrategy;

/// Snapshot of one started actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRecord {
	pub id: u64,
	pub name: String,
	pub strategy: ExecutionStrategy,
	pub instances: usize,
	pub running: usize,
	pub pending: usize,
	pub capacity: usize,
	pub closed: bool,
}

/// Registry of actors started through one runtime.
///
/// Holds lifecycles only; it never keeps an actor alive by itself and is
/// what runtime-wide shutdown walks.
#[derive(Default, Clone)]
pub struct ActorRegistry {
	next_id: Arc<AtomicU64>,
	inner: Arc<RwLock<HashMap<u64, Arc<Lifecycle>>>>,
}

impl std::fmt::Debug for ActorRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActorRegistry").field("actors", &self.inner.read().len()).finish()
	}
}

impl ActorRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a lifecycle, pruning actors that have fully stopped.
	pub(crate) fn register(&self, lifecycle: Arc<Lifecycle>) -> u64 {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
		let mut guard = self.inner.write();
		guard.retain(|_, entry| !entry.is_finished());
		guard.insert(id, lifecycle);
		id
	}

	/// Number of registered actors that still have running instances.
	pub fn live(&self) -> usize {
		self.inner.read().values().filter(|entry| !entry.is_finished()).count()
	}

	/// Returns snapshots sorted by name, then registration order.
	pub fn snapshots(&self) -> Vec<ActorRecord> {
		let guard = self.inner.read();
		let mut records: Vec<_> = guard
			.iter()
			.map(|(id, entry)| ActorRecord {
				id: *id,
				name: entry.name().to_string(),
				strategy: entry.strategy(),
				instances: entry.instances(),
				running: entry.running(),
				pending: entry.mailbox().len(),
				capacity: entry.mailbox().capacity(),
				closed: entry.mailbox().is_closed(),
			})
			.collect();
		records.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
		records
	}

	/// Requests immediate cancellation of every actor without waiting.
	pub fn cancel_all(&self) {
		for entry in self.entries() {
			entry.cancel();
		}
	}

	/// Shuts down every registered actor concurrently and waits per `mode`.
	pub async fn shutdown_all(&self, mode: ShutdownMode) -> ShutdownReport {
		let entries = self.entries();
		let reports = futures::future::join_all(entries.iter().map(|entry| entry.shutdown(mode))).await;
		reports.into_iter().fold(ShutdownReport::default(), ShutdownReport::merge)
	}

	fn entries(&self) -> Vec<Arc<Lifecycle>> {
		self.inner.read().values().cloned().collect()
	}
}
