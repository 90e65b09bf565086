//! Error types for message delivery, configuration and actor startup.

use std::path::PathBuf;

use thiserror::Error;

/// Error observed by a sender when a message could not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
	/// The target actor no longer accepts messages.
	#[error("actor mailbox closed")]
	MailboxClosed,
	/// The mailbox was at capacity and the send did not wait.
	#[error("actor mailbox full")]
	MailboxFull,
	/// The request was abandoned before it resolved, either by the waiter
	/// timing out or by the actor being terminated mid-handler.
	#[error("request cancelled before resolution")]
	Cancelled,
	/// The handler panicked while processing this message.
	#[error("handler fault: {0}")]
	HandlerFault(String),
}

/// Errors produced while building or loading an actor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// `mailbox_capacity` must be at least one.
	#[error("mailbox capacity must be > 0")]
	ZeroCapacity,

	/// `worker_count` must be at least one for the pool strategy.
	#[error("worker count must be > 0")]
	ZeroWorkers,

	/// TOML syntax or schema error.
	#[error("config parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Errors returned by [`crate::RuntimeHandle::start`].
#[derive(Debug, Error)]
pub enum StartError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A pool worker thread could not be spawned.
	#[error("failed to spawn worker thread: {0}")]
	Spawn(#[from] std::io::Error),
}
