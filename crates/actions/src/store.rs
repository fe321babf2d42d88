//! Per-entity stores.
//!
//! A [`MetadataStore`] owns one entity kind's id→object map and records
//! every mutation through its [`ActionLog`]. The UI never touches a
//! metadata document directly; it goes through the action-producing calls
//! here, which is what makes every edit undoable and reviewable.
//!
//! One store exists per [`StoreKind`]; they are deliberately thin and
//! uniform, differing only in which objects the load path puts in them.

use curator_client::{FabricClient, MetadataReadRequest};
use curator_document as document;
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::error;

use crate::action::{Action, ActionId, ActionInfo, ActionOp, ActionType, Label, WriteScope};
use crate::error::ActionError;
use crate::log::ActionLog;

/// The entity kinds the console edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
	Marketplace,
	Tenant,
	Site,
	ItemTemplate,
	MediaProperty,
	MediaCatalog,
	Pocket,
}

impl StoreKind {
	/// The property name holding this store's id→entity map, as exposed to
	/// the view layer.
	pub const fn objects_map_key(self) -> &'static str {
		match self {
			StoreKind::Marketplace => "marketplaces",
			StoreKind::Tenant => "tenants",
			StoreKind::Site => "sites",
			StoreKind::ItemTemplate => "itemTemplates",
			StoreKind::MediaProperty => "mediaProperties",
			StoreKind::MediaCatalog => "mediaCatalogs",
			StoreKind::Pocket => "pockets",
		}
	}

	/// Human-readable kind name.
	pub const fn label(self) -> &'static str {
		match self {
			StoreKind::Marketplace => "Marketplace",
			StoreKind::Tenant => "Tenant",
			StoreKind::Site => "Site",
			StoreKind::ItemTemplate => "Item Template",
			StoreKind::MediaProperty => "Media Property",
			StoreKind::MediaCatalog => "Media Catalog",
			StoreKind::Pocket => "Pocket",
		}
	}
}

/// A content object and its metadata document.
///
/// Owned exclusively by its store; exclusive `&mut` access is what
/// guarantees no parallel mutation of the document.
#[derive(Debug, Clone)]
pub struct ContentObject {
	/// Opaque object id.
	pub object_id: String,
	/// Library the object lives in.
	pub library_id: String,
	/// Display name.
	pub name: String,
	/// The nested metadata document.
	pub metadata: Value,
}

/// How a link's in-memory representation is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkType {
	/// Resolve a metadata snapshot from the target.
	#[default]
	Meta,
	/// Wrap a file URL on the target.
	File,
}

/// Parameters for [`MetadataStore::set_metadata`].
#[derive(Debug, Clone, Default)]
pub struct SetMetadataParams {
	/// Mutation kind; defaults to [`ActionType::ModifyField`].
	pub action_type: Option<ActionType>,
	/// Entity to mutate.
	pub object_id: String,
	/// UI page the edit occurred on.
	pub page: String,
	/// Base path inside the metadata document.
	pub path: String,
	/// Field name, joined onto `path`.
	pub field: String,
	/// The new value.
	pub value: Value,
	/// Changelist category.
	pub category: Option<Label>,
	/// Changelist subcategory.
	pub subcategory: Option<Label>,
	/// Display label for the field.
	pub label: Option<Label>,
	/// The underlying boolean's display meaning is flipped.
	pub inverted: bool,
}

/// Parameters for [`MetadataStore::set_link`].
#[derive(Debug, Clone, Default)]
pub struct SetLinkParams {
	/// Entity to mutate.
	pub object_id: String,
	/// UI page the edit occurred on.
	pub page: String,
	/// Base path inside the metadata document.
	pub path: String,
	/// Field name, joined onto `path`.
	pub field: String,
	/// Target object; `None` clears the link.
	pub link_object_id: Option<String>,
	/// How the in-memory representation is resolved.
	pub link_type: LinkType,
	/// Path inside the target (metadata subtree or file path).
	pub link_path: String,
	/// Changelist category.
	pub category: Option<Label>,
	/// Changelist subcategory.
	pub subcategory: Option<Label>,
	/// Display label for the field.
	pub label: Option<Label>,
}

/// Parameters for the list mutation operations.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
	/// Entity to mutate.
	pub object_id: String,
	/// UI page the edit occurred on.
	pub page: String,
	/// Base path inside the metadata document.
	pub path: String,
	/// Field holding the list, joined onto `path`.
	pub field: String,
	/// Element index (insert position, removal target, move source).
	pub index: Option<usize>,
	/// Move destination.
	pub new_index: Option<usize>,
	/// Element value for inserts.
	pub value: Value,
	/// Changelist category.
	pub category: Option<Label>,
	/// Changelist subcategory.
	pub subcategory: Option<Label>,
	/// Display label for the element.
	pub label: Option<Label>,
}

/// One entity kind's store: metadata cache plus action log.
#[derive(Debug)]
pub struct MetadataStore {
	kind: StoreKind,
	objects: IndexMap<String, ContentObject>,
	log: ActionLog,
}

impl MetadataStore {
	/// Creates an empty store for one entity kind.
	pub fn new(kind: StoreKind) -> Self {
		Self {
			kind,
			objects: IndexMap::new(),
			log: ActionLog::new(),
		}
	}

	/// The entity kind this store holds.
	pub fn kind(&self) -> StoreKind {
		self.kind
	}

	/// Puts an object into the cache. The load path calls this after
	/// fetching the object's metadata.
	pub fn add_object(&mut self, object: ContentObject) {
		self.objects.insert(object.object_id.clone(), object);
	}

	/// Drops an object from the cache along with its recorded actions.
	pub fn remove_object(&mut self, object_id: &str) -> Option<ContentObject> {
		self.log.clear(object_id);
		self.objects.shift_remove(object_id)
	}

	/// Looks up a cached object.
	pub fn object(&self, object_id: &str) -> Option<&ContentObject> {
		self.objects.get(object_id)
	}

	/// Cached objects in insertion order.
	pub fn objects(&self) -> impl Iterator<Item = &ContentObject> {
		self.objects.values()
	}

	/// Cached objects with a non-empty action stack.
	pub fn modified_objects(&self) -> impl Iterator<Item = &ContentObject> {
		self.objects
			.values()
			.filter(|object| self.log.has_actions(&object.object_id))
	}

	/// The entity's recorded actions in chronological order.
	pub fn actions(&self, object_id: &str) -> &[Action] {
		self.log.actions(object_id)
	}

	/// Returns `true` if the entity has unsaved edits.
	pub fn has_changes(&self, object_id: &str) -> bool {
		self.log.has_actions(object_id)
	}

	/// Resolves `path` + `field` against the entity's metadata document.
	///
	/// No side effects; `None` when the object or the path is absent.
	pub fn get_metadata(&self, object_id: &str, path: &str, field: &str) -> Option<Value> {
		let object = self.objects.get(object_id)?;
		let segments = document::segments(&document::join(path, field));
		document::get(&object.metadata, &segments).cloned()
	}

	/// Applies a pre-built action through the stacking protocol.
	///
	/// All mutation entry points funnel through here; the mutation is
	/// visible synchronously. A missing object id is a programming error:
	/// logged, not propagated.
	pub fn apply_action(&mut self, action: Action) {
		let Some(object) = self.objects.get_mut(&action.object_id) else {
			error!(object_id = %action.object_id, path = %action.path, "action on unknown object");
			return;
		};
		self.log.apply(&mut object.metadata, action);
	}

	/// Records a field edit. The in-memory document mutates synchronously.
	pub fn set_metadata(&mut self, params: SetMetadataParams) {
		let full_path = document::join(&params.path, &params.field);
		let Some(object) = self.objects.get(&params.object_id) else {
			error!(object_id = %params.object_id, path = %full_path, "set_metadata on unknown object");
			return;
		};

		let segments = document::segments(&full_path);
		let original = document::get(&object.metadata, &segments).cloned();
		let cleared = params.value.is_null() || params.value.as_str().is_some_and(str::is_empty);

		let action = Action {
			id: ActionId::generate(),
			action_type: params.action_type.unwrap_or(ActionType::ModifyField),
			object_id: params.object_id,
			page: params.page,
			path: full_path,
			base_path: None,
			category: params.category,
			subcategory: params.subcategory,
			label: params.label,
			info: ActionInfo {
				cleared,
				inverted: params.inverted,
				..Default::default()
			},
			op: ActionOp::SetField {
				value: params.value,
				original,
			},
		};
		self.apply_action(action);
	}

	/// Seeds a field's initial value without it appearing as a user edit.
	pub fn set_default_value(&mut self, params: SetMetadataParams) {
		self.set_metadata(SetMetadataParams {
			action_type: Some(ActionType::SetDefault),
			..params
		});
	}

	/// Records a link edit.
	///
	/// Resolves the target's latest version hash, then builds two
	/// representations: the in-memory resolved value (a metadata snapshot,
	/// or a file-URL wrapper for [`LinkType::File`]) and the
	/// version-qualified link structure used only for the remote write.
	/// A `link_object_id` of `None` clears the link and sets `info.cleared`.
	pub async fn set_link(
		&mut self,
		client: &dyn FabricClient,
		params: SetLinkParams,
	) -> Result<(), ActionError> {
		let full_path = document::join(&params.path, &params.field);
		if !self.objects.contains_key(&params.object_id) {
			error!(object_id = %params.object_id, path = %full_path, "set_link on unknown object");
			return Ok(());
		}

		let (resolved, link, cleared) = match &params.link_object_id {
			None => (None, None, true),
			Some(target) => {
				let hash = client.latest_version_hash(target).await?;
				let link_path = document::normalize(&params.link_path);
				match params.link_type {
					LinkType::Meta => {
						let snapshot = client
							.content_object_metadata(MetadataReadRequest {
								version_hash: Some(hash.clone()),
								metadata_subtree: link_path.clone(),
								..Default::default()
							})
							.await?;
						let link = json!({"/": format!("/qfab/{hash}/meta/{link_path}")});
						(snapshot, Some(link), false)
					}
					LinkType::File => {
						let url = format!("/qfab/{hash}/files/{link_path}");
						(Some(json!({"url": url})), Some(json!({"/": url})), false)
					}
				}
			}
		};

		let Some(object) = self.objects.get(&params.object_id) else {
			return Ok(());
		};
		let segments = document::segments(&full_path);
		let original = document::get(&object.metadata, &segments).cloned();

		let action = Action {
			id: ActionId::generate(),
			action_type: ActionType::SetLink,
			object_id: params.object_id,
			page: params.page,
			path: full_path,
			base_path: None,
			category: params.category,
			subcategory: params.subcategory,
			label: params.label,
			info: ActionInfo {
				cleared,
				target: params.link_object_id,
				..Default::default()
			},
			op: ActionOp::SetLink {
				resolved,
				link,
				original,
			},
		};
		self.apply_action(action);
		Ok(())
	}

	/// Inserts a list element: appends when `index` is absent, splices
	/// otherwise.
	pub fn insert_list_element(&mut self, params: ListParams) -> Result<(), ActionError> {
		self.list_action(ActionType::InsertListElement, params)
	}

	/// Removes the list element at `index`.
	pub fn remove_list_element(&mut self, params: ListParams) -> Result<(), ActionError> {
		self.list_action(ActionType::RemoveListElement, params)
	}

	/// Moves the list element at `index` to `new_index`.
	pub fn move_list_element(&mut self, params: ListParams) -> Result<(), ActionError> {
		self.list_action(ActionType::MoveListElement, params)
	}

	/// Shared list mutation: validates indices, builds the post-mutation
	/// list, and records an action that writes the list wholesale.
	///
	/// Range violations abort before anything mutates, leaving the document
	/// and the stacks untouched.
	fn list_action(
		&mut self,
		action_type: ActionType,
		mut params: ListParams,
	) -> Result<(), ActionError> {
		let full_path = document::join(&params.path, &params.field);
		let Some(object) = self.objects.get(&params.object_id) else {
			error!(object_id = %params.object_id, path = %full_path, "list action on unknown object");
			return Ok(());
		};

		let segments = document::segments(&full_path);
		let original = document::get(&object.metadata, &segments).cloned();
		let mut list = original
			.as_ref()
			.and_then(Value::as_array)
			.cloned()
			.unwrap_or_default();
		let len = list.len();

		let mut info = ActionInfo::default();
		match action_type {
			ActionType::InsertListElement => {
				let index = params.index.unwrap_or(len).min(len);
				list.insert(index, params.value);
				info.index = Some(index);
			}
			ActionType::RemoveListElement => {
				let index = params.index.ok_or(ActionError::MissingIndex {
					operation: "remove list element",
				})?;
				if index >= len {
					return Err(ActionError::IndexOutOfRange { index, len });
				}
				// Deferred categories must see the element while it still
				// exists; the label stays deferred for render time.
				params.category = params.category.map(|label| label.resolved());
				params.subcategory = params.subcategory.map(|label| label.resolved());
				list.remove(index);
				info.index = Some(index);
			}
			ActionType::MoveListElement => {
				let index = params.index.ok_or(ActionError::MissingIndex {
					operation: "move list element",
				})?;
				let new_index = params.new_index.ok_or(ActionError::MissingIndex {
					operation: "move list element",
				})?;
				if index >= len {
					return Err(ActionError::IndexOutOfRange { index, len });
				}
				if new_index >= len {
					return Err(ActionError::IndexOutOfRange {
						index: new_index,
						len,
					});
				}
				let element = list.remove(index);
				list.insert(new_index, element);
				info.index = Some(index);
				info.new_index = Some(new_index);
			}
			other => unreachable!("{other:?} is not a list action"),
		}

		let action = Action {
			id: ActionId::generate(),
			action_type,
			object_id: params.object_id,
			page: params.page,
			path: full_path.clone(),
			base_path: Some(full_path),
			category: params.category,
			subcategory: params.subcategory,
			label: params.label,
			info,
			op: ActionOp::ReplaceList { list, original },
		};
		self.apply_action(action);
		Ok(())
	}

	/// The undoable actions for `object_id` on `page`, most recent first.
	pub fn undo_queue(&self, object_id: &str, page: &str) -> Vec<&Action> {
		self.log.undo_queue(object_id, page)
	}

	/// The redoable actions for `object_id` on `page`, most recent first.
	pub fn redo_queue(&self, object_id: &str, page: &str) -> Vec<&Action> {
		self.log.redo_queue(object_id, page)
	}

	/// Undoes the most recent edit made on `page`. No-op when there is none.
	pub fn undo_action(&mut self, object_id: &str, page: &str) -> bool {
		let Some(object) = self.objects.get_mut(object_id) else {
			error!(%object_id, "undo on unknown object");
			return false;
		};
		self.log.undo(&mut object.metadata, object_id, page)
	}

	/// Redoes the most recently undone edit made on `page`.
	pub fn redo_action(&mut self, object_id: &str, page: &str) -> bool {
		let Some(object) = self.objects.get_mut(object_id) else {
			error!(%object_id, "redo on unknown object");
			return false;
		};
		self.log.redo(&mut object.metadata, object_id, page)
	}

	/// Replays every recorded action's remote write against the given open
	/// transaction, in original chronological order.
	///
	/// Order matters: later writes to the same path supersede earlier ones
	/// server-side as a natural consequence of sequential replay.
	pub async fn save(
		&self,
		client: &dyn FabricClient,
		object_id: &str,
		write_token: &str,
	) -> Result<(), ActionError> {
		let Some(object) = self.objects.get(object_id) else {
			error!(%object_id, "save on unknown object");
			return Ok(());
		};
		let scope = WriteScope {
			library_id: object.library_id.clone(),
			object_id: object_id.to_owned(),
			write_token: write_token.to_owned(),
		};
		for action in self.log.actions(object_id) {
			action.write(client, &scope).await?;
		}
		Ok(())
	}

	/// Empties both stacks for the entity, after a successful save or an
	/// explicit discard.
	pub fn clear_actions(&mut self, object_id: &str) {
		self.log.clear(object_id);
	}
}
