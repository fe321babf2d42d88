//! The remote content-fabric contract.
//!
//! Writes follow a transaction protocol: [`FabricClient::edit_content_object`]
//! opens a draft and returns a [`WriteTransaction`], metadata mutations are
//! issued against its `write_token`, and [`FabricClient::finalize_content_object`]
//! commits the draft as a new version. A draft that is never finalized is
//! simply abandoned; tokens are single-use and become invalid after commit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Parameters for a metadata read.
///
/// The target is addressed either by `object_id` (latest version) or by an
/// explicit `version_hash`; `library_id` is advisory routing information.
#[derive(Debug, Clone, Default)]
pub struct MetadataReadRequest {
	/// Library containing the object, if known.
	pub library_id: Option<String>,
	/// Object id; resolves against the latest version.
	pub object_id: Option<String>,
	/// Pinned version hash; takes precedence over `object_id`.
	pub version_hash: Option<String>,
	/// Slash-separated subtree path; empty reads the whole document.
	pub metadata_subtree: String,
}

/// Parameters for replacing a metadata subtree inside an open transaction.
#[derive(Debug, Clone)]
pub struct ReplaceMetadataRequest {
	/// Library containing the object.
	pub library_id: String,
	/// Object being written.
	pub object_id: String,
	/// Token of the open write transaction.
	pub write_token: String,
	/// Slash-separated subtree path; empty replaces the whole document.
	pub metadata_subtree: String,
	/// The new value for the subtree.
	pub metadata: Value,
}

/// Parameters for committing an open write transaction.
#[derive(Debug, Clone)]
pub struct FinalizeRequest {
	/// Library containing the object.
	pub library_id: String,
	/// Object being committed.
	pub object_id: String,
	/// Token of the transaction to commit.
	pub write_token: String,
}

/// Handle to an open write transaction.
///
/// Serializable so the coordinator can persist it across a process restart
/// and resume (or discard) the draft later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteTransaction {
	/// Draft token all writes in this transaction are issued against.
	pub write_token: String,
	/// Node the draft lives on; writes must route to the same node.
	pub node_url: String,
}

/// The remote content store.
///
/// Object safe so stores and the coordinator can hold `&dyn FabricClient`.
#[async_trait]
pub trait FabricClient: Send + Sync {
	/// Reads a metadata subtree; `Ok(None)` when the subtree is absent.
	async fn content_object_metadata(&self, request: MetadataReadRequest) -> Result<Option<Value>>;

	/// Replaces a metadata subtree inside an open write transaction.
	async fn replace_metadata(&self, request: ReplaceMetadataRequest) -> Result<()>;

	/// Resolves the hash of the object's latest committed version.
	async fn latest_version_hash(&self, object_id: &str) -> Result<String>;

	/// Opens a write transaction against the object's latest version.
	async fn edit_content_object(
		&self,
		library_id: &str,
		object_id: &str,
	) -> Result<WriteTransaction>;

	/// Commits an open write transaction as a new object version.
	async fn finalize_content_object(&self, request: FinalizeRequest) -> Result<()>;
}
