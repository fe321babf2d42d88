//! Durable local key/value storage contract.
//!
//! Models the browser's storage surface: JSON-serializable blobs keyed by a
//! string, scoped to session or local persistence, optionally base64-encoded
//! at rest. The coordinator uses the local scope as a durable log for
//! pending write transactions.

use serde_json::Value;

use crate::error::Result;

/// Persistence scope of a stored blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
	/// Cleared when the session ends.
	Session,
	/// Survives process restarts.
	Local,
}

/// Encoding of a blob at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	/// Stored as plain JSON text.
	Plain,
	/// Stored as base64-encoded JSON text.
	Base64,
}

/// Durable key/value storage for JSON blobs.
pub trait KeyStorage: Send + Sync {
	/// Stores `value` under `key`, replacing any previous blob.
	fn set(&self, scope: StorageScope, key: &str, value: &Value, encoding: Encoding) -> Result<()>;

	/// Loads the blob under `key`; `Ok(None)` when the key is absent.
	///
	/// `encoding` must match what the blob was stored with.
	fn get(&self, scope: StorageScope, key: &str, encoding: Encoding) -> Result<Option<Value>>;

	/// Removes the blob under `key`. Removing an absent key is a no-op.
	fn remove(&self, scope: StorageScope, key: &str);
}
