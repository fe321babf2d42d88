//! Human-readable rendering of single actions.
//!
//! Rendering is template-driven so the localization store can inject its own
//! wording: templates are keyed by action type and [`Variant`], with a
//! `{label}` placeholder for the field's display label. [`MessageTemplates`]
//! ships English defaults.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::action::{Action, ActionOp, ActionType};

/// Which wording of an action type's message to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
	/// Normal wording naming the field label.
	Labelled,
	/// Wording used when the caller opts out of labels.
	Unlabelled,
	/// The edit cleared the value rather than modifying it.
	Cleared,
	/// Toggle ended up on (after accounting for inverted semantics).
	ToggledOn,
	/// Toggle ended up off.
	ToggledOff,
}

/// Message templates keyed by action type and variant.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
	templates: FxHashMap<(ActionType, Variant), String>,
}

impl Default for MessageTemplates {
	fn default() -> Self {
		use ActionType::*;
		use Variant::*;

		let mut messages = Self {
			templates: FxHashMap::default(),
		};
		messages.insert(ModifyField, Labelled, "Modified {label}");
		messages.insert(ModifyField, Unlabelled, "Modified a field");
		messages.insert(ModifyField, Cleared, "Cleared {label}");
		messages.insert(ModifyFieldUnstackable, Labelled, "Changed {label}");
		messages.insert(ModifyFieldUnstackable, Unlabelled, "Changed a field");
		messages.insert(ModifyFieldUnstackable, Cleared, "Cleared {label}");
		messages.insert(ToggleField, ToggledOn, "Turned on {label}");
		messages.insert(ToggleField, ToggledOff, "Turned off {label}");
		messages.insert(SetLink, Labelled, "Updated {label}");
		messages.insert(SetLink, Unlabelled, "Updated a link");
		messages.insert(SetLink, Cleared, "Cleared {label}");
		messages.insert(InsertListElement, Labelled, "Added {label}");
		messages.insert(InsertListElement, Unlabelled, "Added a list item");
		messages.insert(RemoveListElement, Labelled, "Removed {label}");
		messages.insert(RemoveListElement, Unlabelled, "Removed a list item");
		messages.insert(MoveListElement, Labelled, "Moved {label}");
		messages.insert(MoveListElement, Unlabelled, "Moved a list item");
		// SetDefault is invisible and has no wording on purpose.
		messages
	}
}

impl MessageTemplates {
	/// The English defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets or replaces one template. `{label}` is substituted at render.
	pub fn insert(
		&mut self,
		action_type: ActionType,
		variant: Variant,
		template: impl Into<String>,
	) {
		self.templates.insert((action_type, variant), template.into());
	}

	/// Looks up a template; `None` when the table has no wording for it.
	pub fn template(&self, action_type: ActionType, variant: Variant) -> Option<&str> {
		self.templates
			.get(&(action_type, variant))
			.map(String::as_str)
	}
}

/// Renders one action as a human-readable string.
///
/// Returns `None` when the action cannot be rendered: an action type with no
/// template in the table is skipped silently, and an action whose template
/// needs a label but carries none is skipped with a warning. Both mean the
/// edit drops out of the save-review UI entirely.
pub(crate) fn action_to_string(
	action: &Action,
	messages: &MessageTemplates,
	use_label: bool,
) -> Option<String> {
	let variant = if action.action_type == ActionType::ToggleField {
		// The displayed state is the stored boolean, flipped when the
		// field's meaning is inverted.
		let value = match &action.op {
			ActionOp::SetField { value, .. } => value.as_bool().unwrap_or(false),
			_ => false,
		};
		if value != action.info.inverted {
			Variant::ToggledOn
		} else {
			Variant::ToggledOff
		}
	} else if action.info.cleared {
		Variant::Cleared
	} else if use_label {
		Variant::Labelled
	} else {
		Variant::Unlabelled
	};

	let template = messages.template(action.action_type, variant)?;
	if !template.contains("{label}") {
		return Some(template.to_owned());
	}
	let Some(label) = &action.label else {
		warn!(
			path = %action.path,
			action_type = ?action.action_type,
			"skipping unlabeled action in changelist"
		);
		return None;
	};
	Some(template.replace("{label}", &label.resolve()))
}
