//! The edit/save coordinator.
//!
//! Holds the one piece of cross-session shared state in the system: the map
//! from entity id to its pending [`WriteTransaction`]. The map is treated as
//! a durable log — persisted on every mutation, loaded on construction —
//! so an interrupted process can resume an open transaction or safely
//! discard it on restart.

use std::sync::Arc;

use curator_actions::{Action, ChangeList, MessageTemplates, MetadataStore, StoreKind, changelist};
use curator_client::{
	Encoding, FabricClient, FinalizeRequest, KeyStorage, StorageScope, WriteTransaction,
};
use rustc_hash::FxHashMap;
use tracing::{error, trace, warn};

use crate::error::SaveError;

const PENDING_WRITES_KEY: &str = "curator-pending-writes";

/// Summary of one modified entity, for the save-review UI.
#[derive(Debug, Clone)]
pub struct StoreChangeList {
	/// Entity kind.
	pub kind: StoreKind,
	/// The store's id→entity map key, for view-layer lookups.
	pub store_key: &'static str,
	/// The entity's display name.
	pub name: String,
	/// The entity's id.
	pub object_id: String,
	/// The raw recorded actions (before rebasing and pruning), in
	/// chronological order.
	pub actions: Vec<Action>,
	/// The formatted changelist.
	pub change_list: ChangeList,
}

/// Per-entity outcome of a batch save.
#[derive(Debug, Default)]
pub struct SaveReport {
	/// Entities committed and cleared.
	pub saved: Vec<String>,
	/// Entities that failed, with their errors. Their action stacks are
	/// kept so the edits remain undoable and re-saveable.
	pub failed: Vec<(String, SaveError)>,
}

/// Cross-store orchestrator for reviewing and committing edits.
pub struct EditCoordinator {
	storage: Arc<dyn KeyStorage>,
	messages: MessageTemplates,
	pending: FxHashMap<String, WriteTransaction>,
}

impl EditCoordinator {
	/// Creates a coordinator, resuming any pending write transactions
	/// persisted by an earlier process.
	pub fn new(storage: Arc<dyn KeyStorage>) -> Self {
		let pending = match storage.get(StorageScope::Local, PENDING_WRITES_KEY, Encoding::Base64) {
			Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|error| {
				warn!(%error, "discarding unreadable pending-write record");
				FxHashMap::default()
			}),
			Ok(None) => FxHashMap::default(),
			Err(error) => {
				warn!(%error, "failed to load pending write transactions");
				FxHashMap::default()
			}
		};
		Self {
			storage,
			messages: MessageTemplates::default(),
			pending,
		}
	}

	/// Replaces the message templates used for changelist rendering.
	pub fn with_messages(mut self, messages: MessageTemplates) -> Self {
		self.messages = messages;
		self
	}

	/// The pending write transaction for an entity, if one is open.
	pub fn pending_write(&self, object_id: &str) -> Option<&WriteTransaction> {
		self.pending.get(object_id)
	}

	/// Summarizes every entity with unsaved edits across all stores.
	pub fn change_lists(&self, stores: &[&MetadataStore]) -> Vec<StoreChangeList> {
		let mut summaries = Vec::new();
		for store in stores {
			for object in store.modified_objects() {
				let actions = store.actions(&object.object_id);
				summaries.push(StoreChangeList {
					kind: store.kind(),
					store_key: store.kind().objects_map_key(),
					name: object.name.clone(),
					object_id: object.object_id.clone(),
					change_list: changelist::build(actions, &self.messages),
					actions: actions.to_vec(),
				});
			}
		}
		summaries
	}

	/// Saves the selected entities, one write transaction each.
	///
	/// For every selected entity with a non-empty changelist: open or resume
	/// its transaction, replay the recorded writes, finalize, and clear its
	/// stacks. A failure discards that entity's transaction handle and keeps
	/// its action stack, then the batch continues with the next entity.
	/// Entities outside the selection are left untouched, pending
	/// transactions included.
	pub async fn save(
		&mut self,
		client: &dyn FabricClient,
		stores: &mut [&mut MetadataStore],
		selected: &[String],
	) -> SaveReport {
		let mut report = SaveReport::default();

		for object_id in selected {
			let Some(position) = stores
				.iter()
				.position(|store| store.object(object_id).is_some())
			else {
				warn!(%object_id, "selected entity not found in any store");
				continue;
			};
			let store = &mut *stores[position];

			if changelist::build(store.actions(object_id), &self.messages).is_empty() {
				continue;
			}

			match self.save_entity(client, store, object_id).await {
				Ok(()) => {
					store.clear_actions(object_id);
					trace!(%object_id, "saved and cleared");
					report.saved.push(object_id.clone());
				}
				Err(save_error) => {
					// The remote draft may hold partial writes; the handle
					// must not be reused.
					error!(%object_id, error = %save_error, "save failed, discarding write transaction");
					self.discard_write(object_id);
					report.failed.push((object_id.clone(), save_error));
				}
			}
		}

		report
	}

	async fn save_entity(
		&mut self,
		client: &dyn FabricClient,
		store: &MetadataStore,
		object_id: &str,
	) -> Result<(), SaveError> {
		let Some(library_id) = store.object(object_id).map(|object| object.library_id.clone())
		else {
			return Ok(());
		};

		let transaction = self.initialize_write(client, &library_id, object_id).await?;
		store.save(client, object_id, &transaction.write_token).await?;
		self.finalize(client, &library_id, object_id, &transaction).await?;
		Ok(())
	}

	/// Opens a write transaction, reusing one resumed from storage if
	/// present, and persists its handle.
	async fn initialize_write(
		&mut self,
		client: &dyn FabricClient,
		library_id: &str,
		object_id: &str,
	) -> Result<WriteTransaction, SaveError> {
		if let Some(existing) = self.pending.get(object_id) {
			trace!(%object_id, write_token = %existing.write_token, "resuming pending write transaction");
			return Ok(existing.clone());
		}
		let transaction = client.edit_content_object(library_id, object_id).await?;
		self.pending.insert(object_id.to_owned(), transaction.clone());
		self.persist_pending();
		Ok(transaction)
	}

	/// Commits the transaction remotely, then drops the local handle.
	async fn finalize(
		&mut self,
		client: &dyn FabricClient,
		library_id: &str,
		object_id: &str,
		transaction: &WriteTransaction,
	) -> Result<(), SaveError> {
		client
			.finalize_content_object(FinalizeRequest {
				library_id: library_id.to_owned(),
				object_id: object_id.to_owned(),
				write_token: transaction.write_token.clone(),
			})
			.await?;
		self.discard_write(object_id);
		Ok(())
	}

	/// Drops an entity's persisted transaction handle.
	pub fn discard_write(&mut self, object_id: &str) {
		if self.pending.remove(object_id).is_some() {
			self.persist_pending();
		}
	}

	fn persist_pending(&self) {
		let value = match serde_json::to_value(&self.pending) {
			Ok(value) => value,
			Err(persist_error) => {
				warn!(error = %persist_error, "failed to serialize pending write transactions");
				return;
			}
		};
		if let Err(persist_error) =
			self.storage
				.set(StorageScope::Local, PENDING_WRITES_KEY, &value, Encoding::Base64)
		{
			warn!(error = %persist_error, "failed to persist pending write transactions");
		}
	}
}
