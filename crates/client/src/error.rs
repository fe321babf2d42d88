//! Error types for fabric and storage operations.

use thiserror::Error;

/// Errors surfaced by the fabric client or local storage.
#[derive(Debug, Error)]
pub enum ClientError {
	/// The addressed content object does not exist.
	#[error("object not found: {0}")]
	NotFound(String),

	/// A write referenced a token with no open transaction behind it.
	#[error("no open write transaction for token: {0}")]
	UnknownWriteToken(String),

	/// The remote call failed; the message is whatever the transport surfaced.
	#[error("remote call failed: {0}")]
	Remote(String),

	/// Local storage could not read or write a blob.
	#[error("storage error: {0}")]
	Storage(String),

	/// A stored or transferred blob failed to (de)serialize.
	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
