//! Changelist formatting.
//!
//! Turns one entity's raw action stack into a categorized description of
//! net changes suitable for human review before commit. Three passes:
//!
//! 1. **Index rebasing** — list moves and removals shift the positions of
//!    elements that earlier actions referenced; recorded indices (in
//!    `info.index` for list operations, in the path for field edits on list
//!    items) are rewritten so every surviving entry names the element's
//!    final position. Removals are never rebased away: a deletion must
//!    always surface in the final list.
//! 2. **Pruning** — only the most recent net effect per path is shown.
//!    Pairs of toggles on one path cancel; removals are always preserved.
//! 3. **Grouping and rendering** — remaining actions are partitioned by
//!    category and subcategory and emitted as an element tree, a flat
//!    indented string, and a Markdown document.

use curator_document as document;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::action::{Action, ActionType, Label};

mod render;
pub use render::{MessageTemplates, Variant};

#[cfg(test)]
mod tests;

const UNCATEGORIZED: &str = "Uncategorized";

/// Kind of one entry in the rendered element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
	Category,
	Subcategory,
	Field,
}

/// One entry in the rendered element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeListElement {
	/// What the entry is.
	pub kind: ElementKind,
	/// Display text.
	pub value: String,
	/// Nesting depth: categories 0, subcategories 1, fields 1 or 2.
	pub level: usize,
}

/// The formatted changelist in its three equivalent renderings.
#[derive(Debug, Clone, Default)]
pub struct ChangeList {
	/// Nested element list for UI rendering.
	pub elements: Vec<ChangeListElement>,
	/// Flat indented plain-text rendering.
	pub text: String,
	/// Markdown rendering with headers and bullet items.
	pub markdown: String,
}

impl ChangeList {
	/// Returns `true` if nothing is left to review after pruning.
	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}
}

/// Formats one entity's chronological action stack.
pub fn build(actions: &[Action], messages: &MessageTemplates) -> ChangeList {
	let rebased = rebase(actions);
	let pruned = prune(rebased);
	group(&pruned, messages)
}

/// Where an action keeps its list index.
#[derive(Debug, Clone, Copy)]
enum IndexSlot {
	/// A list operation's `info.index`.
	Info,
	/// A path segment at this position (field edits on list items).
	PathSegment(usize),
}

fn list_index(action: &Action, base: &str) -> Option<(IndexSlot, usize)> {
	if action.base_path.as_deref() == Some(base) {
		return action.info.index.map(|index| (IndexSlot::Info, index));
	}
	// Anything else addressing below the list, a list op on a nested list
	// included, keeps its index in the path segment right after the base.
	let below = document::strip_base(&action.path, base)?;
	let index = below.first()?.parse().ok()?;
	Some((IndexSlot::PathSegment(document::segments(base).len()), index))
}

fn set_list_index(action: &mut Action, slot: IndexSlot, index: usize) {
	match slot {
		IndexSlot::Info => action.info.index = Some(index),
		IndexSlot::PathSegment(position) => {
			let mut segments = document::segments(&action.path);
			segments[position] = index.to_string();
			action.path = segments.join("/");
			// List ops keep base_path equal to path.
			if action.base_path.is_some() {
				action.base_path = Some(action.path.clone());
			}
		}
	}
}

/// Pass 1: walk in order; each move/removal rewrites the indices recorded by
/// previously accepted actions under the same list.
fn rebase(actions: &[Action]) -> Vec<Action> {
	let mut accepted: Vec<Action> = Vec::with_capacity(actions.len());

	for action in actions {
		let action = action.clone();
		let shift = match (action.action_type, &action.base_path, action.info.index) {
			(ActionType::RemoveListElement, Some(base), Some(index)) => {
				Some((base.clone(), index, None))
			}
			(ActionType::MoveListElement, Some(base), Some(index)) => action
				.info
				.new_index
				.map(|destination| (base.clone(), index, Some(destination))),
			_ => None,
		};

		if let Some((base, from, destination)) = shift {
			let mut kept = Vec::with_capacity(accepted.len());
			for mut prior in accepted.drain(..) {
				let Some((slot, index)) = list_index(&prior, &base) else {
					kept.push(prior);
					continue;
				};
				match destination {
					// Removal: entries on the removed element are gone with
					// it (removals excepted), later entries shift down.
					None => {
						if index == from {
							if prior.action_type == ActionType::RemoveListElement {
								kept.push(prior);
							}
						} else {
							if index > from {
								set_list_index(&mut prior, slot, index - 1);
							}
							kept.push(prior);
						}
					}
					// Move: entries on the moved element follow it, entries
					// between source and destination shift by one.
					Some(to) => {
						if index == from {
							set_list_index(&mut prior, slot, to);
						} else if index > from && index <= to {
							set_list_index(&mut prior, slot, index - 1);
						} else if index < from && index >= to {
							set_list_index(&mut prior, slot, index + 1);
						}
						kept.push(prior);
					}
				}
			}
			accepted = kept;
		}

		accepted.push(action);
	}

	accepted
}

/// Pass 2: newest-to-oldest dedup. Toggle pairs cancel; any other action
/// sharing an exact path with a later one is superseded; removals always
/// survive.
fn prune(actions: Vec<Action>) -> Vec<Action> {
	let mut toggle_counts: FxHashMap<&str, usize> = FxHashMap::default();
	for action in &actions {
		if action.action_type == ActionType::ToggleField {
			*toggle_counts.entry(action.path.as_str()).or_default() += 1;
		}
	}

	let mut seen_paths: FxHashSet<String> = FxHashSet::default();
	let mut toggles_emitted: FxHashSet<String> = FxHashSet::default();
	let mut kept = Vec::new();

	for action in actions.iter().rev() {
		match action.action_type {
			ActionType::RemoveListElement => {
				seen_paths.insert(action.path.clone());
				kept.push(action.clone());
			}
			ActionType::ToggleField => {
				let count = toggle_counts.get(action.path.as_str()).copied().unwrap_or(0);
				if count % 2 == 1 && toggles_emitted.insert(action.path.clone()) {
					kept.push(action.clone());
				}
			}
			_ => {
				if seen_paths.insert(action.path.clone()) {
					kept.push(action.clone());
				}
			}
		}
	}

	kept.reverse();
	kept
}

#[derive(Default)]
struct CategoryBucket {
	direct: Vec<String>,
	subcategories: IndexMap<String, Vec<String>>,
}

fn resolve_bucket(label: Option<&Label>) -> Option<String> {
	label.map(Label::resolve).filter(|text| !text.is_empty())
}

fn sort_dedup(entries: &mut Vec<String>) {
	entries.sort();
	entries.dedup();
}

/// Pass 3: partition by category/subcategory and emit all three renderings.
fn group(actions: &[Action], messages: &MessageTemplates) -> ChangeList {
	let mut categories: IndexMap<String, CategoryBucket> = IndexMap::new();

	for action in actions {
		if action.action_type.flags().invisible {
			continue;
		}
		let Some(entry) = render::action_to_string(action, messages, true) else {
			continue;
		};
		let category = resolve_bucket(action.category.as_ref())
			.unwrap_or_else(|| UNCATEGORIZED.to_owned());
		let bucket = categories.entry(category).or_default();
		match resolve_bucket(action.subcategory.as_ref()) {
			Some(subcategory) => bucket
				.subcategories
				.entry(subcategory)
				.or_default()
				.push(entry),
			None => bucket.direct.push(entry),
		}
	}

	for bucket in categories.values_mut() {
		sort_dedup(&mut bucket.direct);
		for entries in bucket.subcategories.values_mut() {
			sort_dedup(entries);
		}
	}

	let mut elements = Vec::new();
	let mut text = String::new();
	let mut markdown = String::new();

	for (position, (category, bucket)) in categories.iter().enumerate() {
		if position > 0 {
			text.push('\n');
			markdown.push_str("---\n\n");
		}
		elements.push(ChangeListElement {
			kind: ElementKind::Category,
			value: category.clone(),
			level: 0,
		});
		text.push_str(category);
		text.push('\n');
		markdown.push_str(&format!("### {category}\n\n"));

		for entry in &bucket.direct {
			elements.push(ChangeListElement {
				kind: ElementKind::Field,
				value: entry.clone(),
				level: 1,
			});
			text.push_str(&format!("  {entry}\n"));
			markdown.push_str(&format!("* {entry}\n"));
		}
		if !bucket.direct.is_empty() {
			markdown.push('\n');
		}

		for (subcategory, entries) in &bucket.subcategories {
			elements.push(ChangeListElement {
				kind: ElementKind::Subcategory,
				value: subcategory.clone(),
				level: 1,
			});
			text.push_str(&format!("  {subcategory}\n"));
			markdown.push_str(&format!("#### {subcategory}\n\n"));
			for entry in entries {
				elements.push(ChangeListElement {
					kind: ElementKind::Field,
					value: entry.clone(),
					level: 2,
				});
				text.push_str(&format!("    {entry}\n"));
				markdown.push_str(&format!("* {entry}\n"));
			}
			markdown.push('\n');
		}
	}

	ChangeList {
		elements,
		text,
		markdown,
	}
}
