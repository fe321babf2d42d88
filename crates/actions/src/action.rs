//! Action records.
//!
//! An [`Action`] is an immutable record of one mutation attempt. Where the
//! original console captured apply/undo/write as closures, the op here is an
//! enum carrying the before/after state explicitly — [`ActionOp`] — so an
//! action can be applied, reverted, and replayed against a remote write
//! transaction at any later point without borrowing the store.

use std::fmt;
use std::sync::Arc;

use curator_client::{FabricClient, ReplaceMetadataRequest, Result as ClientResult};
use curator_document as document;
use serde_json::Value;
use uuid::Uuid;

/// Unique token identifying one recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionId(String);

impl ActionId {
	/// Generates a fresh id.
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	/// The id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// The fixed enumeration of mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
	/// Free-text style field edit; collapses with immediate predecessors.
	ModifyField,
	/// Discrete selection edit (dropdown and the like); never collapsed.
	ModifyFieldUnstackable,
	/// Boolean toggle; display wording accounts for inverted semantics.
	ToggleField,
	/// Seeds a field's initial value; excluded from the changelist.
	SetDefault,
	/// Reference/attachment edit.
	SetLink,
	/// Structural list insert.
	InsertListElement,
	/// Structural list removal.
	RemoveListElement,
	/// Structural list reorder.
	MoveListElement,
}

/// Per-type behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFlags {
	/// Collapses with a contiguous run of matching predecessors.
	pub stackable: bool,
	/// Reserved; no current behavior.
	pub collapsible: bool,
	/// Excluded from the user-facing changelist.
	pub invisible: bool,
}

impl ActionType {
	/// The flags driving stacking and display for this type.
	pub const fn flags(self) -> ActionFlags {
		match self {
			ActionType::ModifyField => ActionFlags {
				stackable: true,
				collapsible: true,
				invisible: false,
			},
			ActionType::SetDefault => ActionFlags {
				stackable: false,
				collapsible: false,
				invisible: true,
			},
			_ => ActionFlags {
				stackable: false,
				collapsible: false,
				invisible: false,
			},
		}
	}
}

/// A display string, literal or deferred.
///
/// Deferred labels are resolved lazily, at changelist render time. A list
/// removal's label captures the soon-to-be-deleted item at creation, so the
/// rendered text can still name data that no longer exists in the document.
#[derive(Clone)]
pub enum Label {
	/// A literal string.
	Text(String),
	/// A closure resolved at render time.
	Deferred(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Label {
	/// Resolves the label to its display string.
	pub fn resolve(&self) -> String {
		match self {
			Label::Text(text) => text.clone(),
			Label::Deferred(resolve) => resolve(),
		}
	}

	/// Collapses a deferred label to its resolved text.
	pub fn resolved(&self) -> Label {
		Label::Text(self.resolve())
	}
}

impl fmt::Debug for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Label::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Label::Deferred(_) => f.write_str("Deferred(..)"),
		}
	}
}

impl From<&str> for Label {
	fn from(text: &str) -> Self {
		Label::Text(text.to_owned())
	}
}

impl From<String> for Label {
	fn from(text: String) -> Self {
		Label::Text(text)
	}
}

/// Action-specific metadata used by display and rebasing.
#[derive(Debug, Clone, Default)]
pub struct ActionInfo {
	/// A field or link edit that cleared the value.
	pub cleared: bool,
	/// The underlying boolean's meaning is flipped for display.
	pub inverted: bool,
	/// List element index (insert/remove, and move source).
	pub index: Option<usize>,
	/// Move destination index.
	pub new_index: Option<usize>,
	/// Target object of a link edit.
	pub target: Option<String>,
}

/// The apply/undo/write payload of an action.
///
/// `original` is always the value at the action's path before the mutation,
/// `None` meaning absent; undo restores it exactly, including absence. List
/// mutations carry the whole post-mutation list and are written wholesale,
/// never as deltas.
#[derive(Debug, Clone)]
pub enum ActionOp {
	/// Replace the value at the path.
	SetField {
		/// The new value.
		value: Value,
		/// The value before the edit.
		original: Option<Value>,
	},
	/// Replace the value at the path with a resolved link.
	SetLink {
		/// In-memory resolved representation; `None` clears the field.
		resolved: Option<Value>,
		/// Version-qualified link structure used only for the remote write.
		link: Option<Value>,
		/// The value before the edit.
		original: Option<Value>,
	},
	/// Replace the whole list at the path.
	ReplaceList {
		/// The post-mutation list.
		list: Vec<Value>,
		/// The list value before the mutation, `None` if the key was absent.
		original: Option<Value>,
	},
}

impl ActionOp {
	fn original(&self) -> Option<&Value> {
		match self {
			ActionOp::SetField { original, .. }
			| ActionOp::SetLink { original, .. }
			| ActionOp::ReplaceList { original, .. } => original.as_ref(),
		}
	}

	fn set_original(&mut self, new_original: Option<Value>) {
		match self {
			ActionOp::SetField { original, .. }
			| ActionOp::SetLink { original, .. }
			| ActionOp::ReplaceList { original, .. } => *original = new_original,
		}
	}
}

/// Target transaction for a save replay.
#[derive(Debug, Clone)]
pub struct WriteScope {
	/// Library containing the object.
	pub library_id: String,
	/// Object being written.
	pub object_id: String,
	/// Token of the open write transaction.
	pub write_token: String,
}

/// An immutable record of one mutation attempt.
#[derive(Debug, Clone)]
pub struct Action {
	/// Unique token, generated when the action is built.
	pub id: ActionId,
	/// Mutation kind.
	pub action_type: ActionType,
	/// Entity the action mutates.
	pub object_id: String,
	/// UI route/context the edit occurred on; scopes undo/redo.
	pub page: String,
	/// Normalized full path, field included.
	pub path: String,
	/// Normalized list path for list operations.
	pub base_path: Option<String>,
	/// Top-level changelist grouping.
	pub category: Option<Label>,
	/// Second-level changelist grouping.
	pub subcategory: Option<Label>,
	/// Display label for the changed field.
	pub label: Option<Label>,
	/// Display and rebasing metadata.
	pub info: ActionInfo,
	/// Apply/undo/write payload.
	pub op: ActionOp,
}

impl Action {
	/// Applies the mutation to the in-memory document.
	pub fn apply_to(&self, doc: &mut Value) {
		let segments = document::segments(&self.path);
		match &self.op {
			ActionOp::SetField { value, .. } => document::set(doc, &segments, value.clone()),
			ActionOp::SetLink { resolved, .. } => match resolved {
				Some(value) => document::set(doc, &segments, value.clone()),
				None => {
					document::remove(doc, &segments);
				}
			},
			ActionOp::ReplaceList { list, .. } => {
				document::set(doc, &segments, Value::Array(list.clone()));
			}
		}
	}

	/// Reverts the mutation, restoring the recorded original exactly.
	///
	/// For a stack-collapsed action the original is the value before the
	/// oldest collapsed sibling, not the immediate predecessor.
	pub fn undo_on(&self, doc: &mut Value) {
		let segments = document::segments(&self.path);
		match self.op.original() {
			Some(original) => document::set(doc, &segments, original.clone()),
			None => {
				document::remove(doc, &segments);
			}
		}
	}

	/// Replays the mutation against an open remote write transaction.
	pub async fn write(&self, client: &dyn FabricClient, scope: &WriteScope) -> ClientResult<()> {
		let metadata = match &self.op {
			ActionOp::SetField { value, .. } => value.clone(),
			ActionOp::SetLink { link, .. } => link.clone().unwrap_or(Value::Null),
			ActionOp::ReplaceList { list, .. } => Value::Array(list.clone()),
		};
		client
			.replace_metadata(ReplaceMetadataRequest {
				library_id: scope.library_id.clone(),
				object_id: scope.object_id.clone(),
				write_token: scope.write_token.clone(),
				metadata_subtree: self.path.clone(),
				metadata,
			})
			.await
	}

	/// The recorded value before the mutation, `None` meaning absent.
	pub fn original(&self) -> Option<&Value> {
		self.op.original()
	}

	/// Adopts the original of the oldest member of a collapsed run, so one
	/// undo reverts the whole run.
	pub(crate) fn adopt_original(&mut self, oldest: &Action) {
		self.op.set_original(oldest.original().cloned());
	}

	/// Matches the stacking key: same entity, kind, page, and path.
	pub(crate) fn stacks_with(&self, other: &Action) -> bool {
		self.object_id == other.object_id
			&& self.action_type == other.action_type
			&& self.page == other.page
			&& self.path == other.path
	}
}
