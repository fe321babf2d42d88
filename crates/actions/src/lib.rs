//! Action stack engine for content-metadata editing.
//!
//! Every edit a user makes goes through a [`MetadataStore`], which owns its
//! entities' metadata documents and records each mutation as an [`Action`]:
//! an immutable description of one change carrying enough state to apply
//! itself, revert itself, and replay itself against a remote write
//! transaction. Actions accumulate in a per-entity [`ActionLog`] with
//! standard linear undo/redo semantics, and the [`changelist`] module turns
//! an entity's raw log into a categorized, human-readable review of net
//! changes before commit.
//!
//! # Stacking
//!
//! Keystroke-level edits would otherwise flood the undo stack, so actions
//! whose type is stackable collapse: a contiguous run of edits to the same
//! field on the same page becomes a single undo step that reverts to the
//! value before the whole run. See [`ActionLog::apply`].

/// Action records: types, flags, labels, and apply/undo/write payloads.
pub mod action;
/// Changelist formatting: index rebasing, pruning, grouping, rendering.
pub mod changelist;
/// Engine error types.
pub mod error;
/// Per-entity undo/redo stacks and the stacking protocol.
pub mod log;
/// Per-entity stores composing a metadata cache with the action log.
pub mod store;

pub use action::{Action, ActionFlags, ActionId, ActionInfo, ActionOp, ActionType, Label, WriteScope};
pub use changelist::{ChangeList, ChangeListElement, ElementKind, MessageTemplates};
pub use error::ActionError;
pub use log::ActionLog;
pub use store::{
	ContentObject, LinkType, ListParams, MetadataStore, SetLinkParams, SetMetadataParams, StoreKind,
};
