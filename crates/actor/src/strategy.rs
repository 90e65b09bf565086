/// Execution strategy used to dispatch mailbox items to actor instances.
///
/// The strategy is fixed when the actor is started. Actor and message code
/// is identical under every strategy; only [`crate::Context`] behavior,
/// thread assignment and completion ordering change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
	/// One instance on the runtime's cooperative thread. Waits requested
	/// through the context park the thread, stalling everything on it.
	#[default]
	Blocking,
	/// One instance on the runtime's cooperative thread. Waits requested
	/// through the context suspend the handler and yield the thread.
	Suspending,
	/// `worker_count` instances, one per dedicated OS thread, sharing one
	/// mailbox. Results surface in completion order.
	Pool,
}

impl ExecutionStrategy {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Blocking => "blocking",
			Self::Suspending => "suspending",
			Self::Pool => "pool",
		}
	}

	/// Returns whether this strategy runs instances on the runtime thread.
	pub const fn is_cooperative(self) -> bool {
		matches!(self, Self::Blocking | Self::Suspending)
	}
}

impl std::fmt::Display for ExecutionStrategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for ExecutionStrategy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"blocking" => Ok(Self::Blocking),
			"suspending" => Ok(Self::Suspending),
			"pool" => Ok(Self::Pool),
			other => Err(format!("unknown execution strategy '{other}' (expected blocking, suspending or pool)")),
		}
	}
}
