//! Boundary contracts between the edit engine and the outside world.
//!
//! The action stack engine and the save coordinator never speak a wire
//! protocol directly. They depend on two seams defined here:
//!
//! * [`FabricClient`]: the remote content store — metadata reads, the
//!   version-hash resolver used for links, and the write-transaction
//!   lifecycle (`edit_content_object` / `replace_metadata` /
//!   `finalize_content_object`).
//! * [`KeyStorage`]: durable local key/value storage used to persist the
//!   pending-transaction map across process restarts.
//!
//! [`MemoryFabric`] and [`MemoryStorage`] are complete in-memory
//! implementations used by tests and local development.

/// Client error types.
pub mod error;
/// The remote content-fabric contract.
pub mod fabric;
/// In-memory fabric and storage backends.
pub mod memory;
/// Durable local key/value storage contract.
pub mod storage;

pub use error::{ClientError, Result};
pub use fabric::{
	FabricClient, FinalizeRequest, MetadataReadRequest, ReplaceMetadataRequest, WriteTransaction,
};
pub use memory::{MemoryFabric, MemoryStorage};
pub use storage::{Encoding, KeyStorage, StorageScope};
