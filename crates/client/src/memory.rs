//! In-memory fabric and storage backends.
//!
//! Complete implementations of [`FabricClient`] and [`KeyStorage`] with no
//! I/O, used by the test suites and by local development where no fabric
//! node is reachable. The fabric keeps every committed version so that
//! version-hash reads keep working after later commits, mirroring the
//! immutable-version behavior of the real store.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::fabric::{
	FabricClient, FinalizeRequest, MetadataReadRequest, ReplaceMetadataRequest, WriteTransaction,
};
use crate::storage::{Encoding, KeyStorage, StorageScope};

const NODE_URL: &str = "memory://node-1";

#[derive(Default)]
struct FabricObject {
	library_id: String,
	/// Committed metadata documents, oldest first. Version N is `versions[N - 1]`.
	versions: Vec<Value>,
}

struct Draft {
	library_id: String,
	object_id: String,
	metadata: Value,
}

#[derive(Default)]
struct FabricState {
	objects: FxHashMap<String, FabricObject>,
	drafts: FxHashMap<String, Draft>,
	next_token: u64,
	fail_finalize: FxHashSet<String>,
}

/// In-memory [`FabricClient`].
#[derive(Default)]
pub struct MemoryFabric {
	state: Mutex<FabricState>,
}

impl MemoryFabric {
	/// Creates an empty fabric.
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds a content object with an initial committed version.
	pub fn add_object(&self, library_id: &str, object_id: &str, metadata: Value) {
		let mut state = self.state.lock();
		state.objects.insert(
			object_id.to_owned(),
			FabricObject {
				library_id: library_id.to_owned(),
				versions: vec![metadata],
			},
		);
	}

	/// Makes the next finalize of `object_id` fail. Consumed on use.
	pub fn fail_next_finalize(&self, object_id: &str) {
		self.state.lock().fail_finalize.insert(object_id.to_owned());
	}

	/// Returns the latest committed metadata document, if the object exists.
	pub fn committed_metadata(&self, object_id: &str) -> Option<Value> {
		let state = self.state.lock();
		state
			.objects
			.get(object_id)
			.and_then(|object| object.versions.last().cloned())
	}

	/// Returns `true` if `write_token` still has an open draft behind it.
	pub fn has_draft(&self, write_token: &str) -> bool {
		self.state.lock().drafts.contains_key(write_token)
	}

	fn version_hash(object_id: &str, version: usize) -> String {
		format!("hq__{object_id}@{version}")
	}

	/// Inverse of [`Self::version_hash`].
	fn parse_version_hash(hash: &str) -> Option<(&str, usize)> {
		let rest = hash.strip_prefix("hq__")?;
		let (object_id, version) = rest.rsplit_once('@')?;
		Some((object_id, version.parse().ok()?))
	}
}

#[async_trait::async_trait]
impl FabricClient for MemoryFabric {
	async fn content_object_metadata(&self, request: MetadataReadRequest) -> Result<Option<Value>> {
		let state = self.state.lock();
		let document = if let Some(hash) = &request.version_hash {
			let (object_id, version) = Self::parse_version_hash(hash)
				.ok_or_else(|| ClientError::NotFound(hash.clone()))?;
			state
				.objects
				.get(object_id)
				.and_then(|object| object.versions.get(version.checked_sub(1)?))
				.ok_or_else(|| ClientError::NotFound(hash.clone()))?
		} else if let Some(object_id) = &request.object_id {
			state
				.objects
				.get(object_id)
				.and_then(|object| object.versions.last())
				.ok_or_else(|| ClientError::NotFound(object_id.clone()))?
		} else {
			return Err(ClientError::Remote(
				"metadata read needs an object id or version hash".to_owned(),
			));
		};

		let segments = curator_document::segments(&request.metadata_subtree);
		Ok(curator_document::get(document, &segments).cloned())
	}

	async fn replace_metadata(&self, request: ReplaceMetadataRequest) -> Result<()> {
		let mut state = self.state.lock();
		let draft = state
			.drafts
			.get_mut(&request.write_token)
			.ok_or_else(|| ClientError::UnknownWriteToken(request.write_token.clone()))?;
		if draft.object_id != request.object_id {
			return Err(ClientError::Remote(format!(
				"write token {} is not open for {}",
				request.write_token, request.object_id
			)));
		}

		let segments = curator_document::segments(&request.metadata_subtree);
		curator_document::set(&mut draft.metadata, &segments, request.metadata);
		Ok(())
	}

	async fn latest_version_hash(&self, object_id: &str) -> Result<String> {
		let state = self.state.lock();
		let object = state
			.objects
			.get(object_id)
			.ok_or_else(|| ClientError::NotFound(object_id.to_owned()))?;
		Ok(Self::version_hash(object_id, object.versions.len()))
	}

	async fn edit_content_object(
		&self,
		library_id: &str,
		object_id: &str,
	) -> Result<WriteTransaction> {
		let mut state = self.state.lock();
		let metadata = state
			.objects
			.get(object_id)
			.and_then(|object| object.versions.last().cloned())
			.ok_or_else(|| ClientError::NotFound(object_id.to_owned()))?;

		state.next_token += 1;
		let write_token = format!("tqw__{}", state.next_token);
		state.drafts.insert(
			write_token.clone(),
			Draft {
				library_id: library_id.to_owned(),
				object_id: object_id.to_owned(),
				metadata,
			},
		);

		Ok(WriteTransaction {
			write_token,
			node_url: NODE_URL.to_owned(),
		})
	}

	async fn finalize_content_object(&self, request: FinalizeRequest) -> Result<()> {
		let mut state = self.state.lock();
		if state.fail_finalize.remove(&request.object_id) {
			return Err(ClientError::Remote(format!(
				"finalize failed for {}",
				request.object_id
			)));
		}

		let Draft {
			library_id,
			object_id,
			metadata,
		} = state
			.drafts
			.remove(&request.write_token)
			.ok_or_else(|| ClientError::UnknownWriteToken(request.write_token.clone()))?;
		let object = state.objects.entry(object_id).or_insert_with(|| FabricObject {
			library_id,
			..Default::default()
		});
		object.versions.push(metadata);
		Ok(())
	}
}

/// In-memory [`KeyStorage`].
#[derive(Default)]
pub struct MemoryStorage {
	blobs: Mutex<FxHashMap<(StorageScope, String), String>>,
}

impl MemoryStorage {
	/// Creates empty storage.
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyStorage for MemoryStorage {
	fn set(&self, scope: StorageScope, key: &str, value: &Value, encoding: Encoding) -> Result<()> {
		let text = serde_json::to_string(value)?;
		let blob = match encoding {
			Encoding::Plain => text,
			Encoding::Base64 => BASE64.encode(text),
		};
		self.blobs.lock().insert((scope, key.to_owned()), blob);
		Ok(())
	}

	fn get(&self, scope: StorageScope, key: &str, encoding: Encoding) -> Result<Option<Value>> {
		let blobs = self.blobs.lock();
		let Some(blob) = blobs.get(&(scope, key.to_owned())) else {
			return Ok(None);
		};
		let text = match encoding {
			Encoding::Plain => blob.clone(),
			Encoding::Base64 => {
				let bytes = BASE64
					.decode(blob)
					.map_err(|error| ClientError::Storage(error.to_string()))?;
				String::from_utf8(bytes).map_err(|error| ClientError::Storage(error.to_string()))?
			}
		};
		Ok(Some(serde_json::from_str(&text)?))
	}

	fn remove(&self, scope: StorageScope, key: &str) {
		self.blobs.lock().remove(&(scope, key.to_owned()));
	}
}
