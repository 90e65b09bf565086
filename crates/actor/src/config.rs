//! Actor mailbox and pool configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 128;

/// Behavior applied when a send finds the mailbox at capacity.
///
/// `try_send` ignores the policy and always fails fast with
/// [`crate::SendError::MailboxFull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FullMailboxPolicy {
	/// `send` parks the message behind earlier ones until capacity frees.
	/// `do_send` drops and logs.
	#[default]
	Wait,
	/// `send` fails with `MailboxFull`. `do_send` drops and logs a warning.
	Reject,
	/// `send` fails with `MailboxFull`. `do_send` drops silently.
	Drop,
}

impl FullMailboxPolicy {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Wait => "wait",
			Self::Reject => "reject",
			Self::Drop => "drop",
		}
	}
}

impl std::fmt::Display for FullMailboxPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for FullMailboxPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"wait" => Ok(Self::Wait),
			"reject" => Ok(Self::Reject),
			"drop" => Ok(Self::Drop),
			other => Err(format!("unknown full-mailbox policy '{other}' (expected wait, reject or drop)")),
		}
	}
}

/// Recognized actor options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActorConfig {
	pub mailbox_capacity: usize,
	/// Number of instances and threads; only read by the pool strategy.
	pub worker_count: usize,
	pub full_mailbox_policy: FullMailboxPolicy,
}

impl Default for ActorConfig {
	fn default() -> Self {
		Self {
			mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
			worker_count: 1,
			full_mailbox_policy: FullMailboxPolicy::default(),
		}
	}
}

impl ActorConfig {
	/// Creates a config with the given mailbox capacity and defaults elsewhere.
	#[must_use]
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			mailbox_capacity: capacity,
			..Self::default()
		}
	}

	/// Sets the pool worker count.
	#[must_use]
	pub fn workers(mut self, count: usize) -> Self {
		self.worker_count = count;
		self
	}

	/// Sets the full-mailbox policy.
	#[must_use]
	pub fn policy(mut self, policy: FullMailboxPolicy) -> Self {
		self.full_mailbox_policy = policy;
		self
	}

	/// Checks the invariants `start` relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.mailbox_capacity == 0 {
			return Err(ConfigError::ZeroCapacity);
		}
		if self.worker_count == 0 {
			return Err(ConfigError::ZeroWorkers);
		}
		Ok(())
	}

	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = ActorConfig::from_toml_str("").unwrap();
		assert_eq!(config, ActorConfig::default());
	}

	#[test]
	fn parses_all_recognized_options() {
		let config = ActorConfig::from_toml_str(
			r#"
mailbox_capacity = 2
worker_count = 3
full_mailbox_policy = "reject"
"#,
		)
		.unwrap();
		assert_eq!(config.mailbox_capacity, 2);
		assert_eq!(config.worker_count, 3);
		assert_eq!(config.full_mailbox_policy, FullMailboxPolicy::Reject);
	}

	#[test]
	fn rejects_zero_capacity_and_workers() {
		assert!(matches!(ActorConfig::with_capacity(0).validate(), Err(ConfigError::ZeroCapacity)));
		assert!(matches!(ActorConfig::default().workers(0).validate(), Err(ConfigError::ZeroWorkers)));
		assert!(matches!(ActorConfig::from_toml_str("mailbox_capacity = 0"), Err(ConfigError::ZeroCapacity)));
	}

	#[test]
	fn policy_names_match_config_keys() {
		for policy in [FullMailboxPolicy::Wait, FullMailboxPolicy::Reject, FullMailboxPolicy::Drop] {
			assert_eq!(policy.as_str().parse::<FullMailboxPolicy>(), Ok(policy));
			let config = ActorConfig::from_toml_str(&format!("full_mailbox_policy = \"{policy}\"")).unwrap();
			assert_eq!(config.full_mailbox_policy, policy);
		}
		assert!("block".parse::<FullMailboxPolicy>().is_err());
	}

	#[test]
	fn rejects_unknown_keys() {
		assert!(matches!(ActorConfig::from_toml_str("capacity = 4"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn load_reports_missing_file_path() {
		let err = ActorConfig::load("/nonexistent/courier.toml").unwrap_err();
		let ConfigError::Io { path, .. } = err else {
			panic!("expected Io error, got {err:?}");
		};
		assert_eq!(path, std::path::PathBuf::from("/nonexistent/courier.toml"));
	}
}
