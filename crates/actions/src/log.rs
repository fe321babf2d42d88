//! Per-entity undo/redo stacks and the stacking protocol.
//!
//! The log keeps two ordered sequences per entity id: the action stack
//! (applied, undoable) and the redo stack. Insertion order is chronological.
//! Applying any new action clears the entity's redo stack — linear history,
//! no branching timelines.
//!
//! Undo and redo are scoped by `page`: only edits made in the currently
//! viewed context are offered, even though the underlying stack is global
//! per entity.

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::action::Action;

/// Undo and redo stacks keyed by entity id.
#[derive(Debug, Default)]
pub struct ActionLog {
	actions: FxHashMap<String, Vec<Action>>,
	redo: FxHashMap<String, Vec<Action>>,
}

impl ActionLog {
	/// Creates an empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Applies `action` to `doc` and records it — the core stacking protocol.
	///
	/// The mutation is visible synchronously. If the action's type is
	/// stackable, a contiguous run of prior actions matching on entity,
	/// type, page, and path is collapsed into it: the new action adopts the
	/// run's oldest original (so one undo reverts the whole run) and the run
	/// is removed before the push. Finally the entity's redo stack is
	/// cleared.
	pub fn apply(&mut self, doc: &mut Value, mut action: Action) {
		action.apply_to(doc);

		let stack = self.actions.entry(action.object_id.clone()).or_default();
		if action.action_type.flags().stackable {
			let mut run_start = stack.len();
			while run_start > 0 && stack[run_start - 1].stacks_with(&action) {
				run_start -= 1;
			}
			if run_start < stack.len() {
				action.adopt_original(&stack[run_start]);
				trace!(
					path = %action.path,
					collapsed = stack.len() - run_start,
					"collapsed stackable run"
				);
				stack.truncate(run_start);
			}
		}

		let object_id = action.object_id.clone();
		stack.push(action);
		self.redo.remove(&object_id);
	}

	/// The undoable actions for `object_id` on `page`, most recent first.
	pub fn undo_queue(&self, object_id: &str, page: &str) -> Vec<&Action> {
		Self::queue(&self.actions, object_id, page)
	}

	/// The redoable actions for `object_id` on `page`, most recent first.
	pub fn redo_queue(&self, object_id: &str, page: &str) -> Vec<&Action> {
		Self::queue(&self.redo, object_id, page)
	}

	fn queue<'a>(
		stacks: &'a FxHashMap<String, Vec<Action>>,
		object_id: &str,
		page: &str,
	) -> Vec<&'a Action> {
		stacks
			.get(object_id)
			.map(|stack| {
				stack
					.iter()
					.rev()
					.filter(|action| action.page == page)
					.collect()
			})
			.unwrap_or_default()
	}

	/// Undoes the most recent action for `object_id` on `page`.
	///
	/// The action is removed from the action stack, reverted against `doc`,
	/// and pushed onto the redo stack. No-op when the queue is empty.
	pub fn undo(&mut self, doc: &mut Value, object_id: &str, page: &str) -> bool {
		let Some(stack) = self.actions.get_mut(object_id) else {
			return false;
		};
		let Some(position) = stack.iter().rposition(|action| action.page == page) else {
			return false;
		};
		let action = stack.remove(position);
		action.undo_on(doc);
		trace!(path = %action.path, "undid action");
		self.redo.entry(object_id.to_owned()).or_default().push(action);
		true
	}

	/// Redoes the most recently undone action for `object_id` on `page`.
	///
	/// Inverse of [`Self::undo`]: the action is re-applied and moved back
	/// onto the action stack without re-entering the stacking protocol.
	pub fn redo(&mut self, doc: &mut Value, object_id: &str, page: &str) -> bool {
		let Some(stack) = self.redo.get_mut(object_id) else {
			return false;
		};
		let Some(position) = stack.iter().rposition(|action| action.page == page) else {
			return false;
		};
		let action = stack.remove(position);
		action.apply_to(doc);
		trace!(path = %action.path, "redid action");
		self.actions
			.entry(object_id.to_owned())
			.or_default()
			.push(action);
		true
	}

	/// The entity's action stack in chronological order.
	pub fn actions(&self, object_id: &str) -> &[Action] {
		self.actions
			.get(object_id)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// Returns `true` if the entity has recorded actions.
	pub fn has_actions(&self, object_id: &str) -> bool {
		!self.actions(object_id).is_empty()
	}

	/// Entity ids with a non-empty action stack.
	pub fn modified_objects(&self) -> impl Iterator<Item = &str> {
		self.actions
			.iter()
			.filter(|(_, stack)| !stack.is_empty())
			.map(|(object_id, _)| object_id.as_str())
	}

	/// Empties both stacks for the entity. Called after a successful save.
	pub fn clear(&mut self, object_id: &str) {
		self.actions.remove(object_id);
		self.redo.remove(object_id);
	}
}
