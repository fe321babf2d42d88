use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::store::{ContentObject, ListParams, MetadataStore, SetMetadataParams, StoreKind};

const PAGE: &str = "general";

fn store_with(metadata: serde_json::Value) -> MetadataStore {
	let mut store = MetadataStore::new(StoreKind::Site);
	store.add_object(ContentObject {
		object_id: "obj1".to_owned(),
		library_id: "ilib1".to_owned(),
		name: "Test Site".to_owned(),
		metadata,
	});
	store
}

fn edit_item_name(store: &mut MetadataStore, index: usize, value: &str) {
	store.set_metadata(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: format!("items/{index}"),
		field: "name".to_owned(),
		value: json!(value),
		category: Some("Items".into()),
		label: Some("Item Name".into()),
		..Default::default()
	});
}

fn remove_item(store: &mut MetadataStore, index: usize) {
	store
		.remove_list_element(ListParams {
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: "/".to_owned(),
			field: "items".to_owned(),
			index: Some(index),
			category: Some("Items".into()),
			label: Some("Item".into()),
			..Default::default()
		})
		.unwrap();
}

#[test]
fn test_field_edit_rebased_after_removal() {
	let mut store = store_with(json!({"items": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}));
	edit_item_name(&mut store, 1, "B2");
	remove_item(&mut store, 0);

	let rebased = rebase(store.actions("obj1"));
	let edit = rebased
		.iter()
		.find(|action| action.action_type == ActionType::ModifyField)
		.unwrap();
	// B shifted down into A's slot; the edit now names its final position.
	assert_eq!(edit.path, "items/0/name");
}

#[test]
fn test_edit_on_removed_element_is_dropped() {
	let mut store = store_with(json!({"items": [{"name": "A"}, {"name": "B"}]}));
	edit_item_name(&mut store, 0, "A2");
	remove_item(&mut store, 0);

	let rebased = rebase(store.actions("obj1"));
	assert_eq!(rebased.len(), 1);
	assert_eq!(rebased[0].action_type, ActionType::RemoveListElement);
}

#[test]
fn test_removal_preserved_with_decremented_edit() {
	let mut store = store_with(json!({"items": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}));
	edit_item_name(&mut store, 2, "C2");
	remove_item(&mut store, 1);

	let rebased = rebase(store.actions("obj1"));
	assert_eq!(rebased.len(), 2);
	let edit = rebased
		.iter()
		.find(|action| action.action_type == ActionType::ModifyField)
		.unwrap();
	assert_eq!(edit.path, "items/1/name");
	assert!(
		rebased
			.iter()
			.any(|action| action.action_type == ActionType::RemoveListElement)
	);
}

#[test]
fn test_move_rewrites_indices() {
	let mut store = store_with(json!({"items": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}));
	edit_item_name(&mut store, 0, "A2");
	store
		.move_list_element(ListParams {
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: "/".to_owned(),
			field: "items".to_owned(),
			index: Some(0),
			new_index: Some(2),
			..Default::default()
		})
		.unwrap();

	let rebased = rebase(store.actions("obj1"));
	let edit = rebased
		.iter()
		.find(|action| action.action_type == ActionType::ModifyField)
		.unwrap();
	// The edited element followed the move to the end of the list.
	assert_eq!(edit.path, "items/2/name");
}

fn insert_subitem(store: &mut MetadataStore, parent_index: usize) {
	store
		.insert_list_element(ListParams {
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: format!("items/{parent_index}"),
			field: "subitems".to_owned(),
			value: json!({"name": "S"}),
			category: Some("Items".into()),
			label: Some("Subitem".into()),
			..Default::default()
		})
		.unwrap();
}

#[test]
fn test_nested_list_op_dropped_when_parent_removed() {
	let mut store = store_with(json!({"items": [{"subitems": []}, {"subitems": []}]}));
	insert_subitem(&mut store, 1);
	remove_item(&mut store, 1);

	// The insert targeted a list inside the removed element; only the
	// removal itself survives.
	let rebased = rebase(store.actions("obj1"));
	assert_eq!(rebased.len(), 1);
	assert_eq!(rebased[0].action_type, ActionType::RemoveListElement);
}

#[test]
fn test_nested_list_op_follows_moved_parent() {
	let mut store = store_with(json!({"items": [{"subitems": []}, {}, {}]}));
	insert_subitem(&mut store, 0);
	store
		.move_list_element(ListParams {
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: "/".to_owned(),
			field: "items".to_owned(),
			index: Some(0),
			new_index: Some(2),
			..Default::default()
		})
		.unwrap();

	let rebased = rebase(store.actions("obj1"));
	let nested = rebased
		.iter()
		.find(|action| action.action_type == ActionType::InsertListElement)
		.unwrap();
	assert_eq!(nested.path, "items/2/subitems");
	assert_eq!(nested.base_path.as_deref(), Some("items/2/subitems"));
}

fn toggle(store: &mut MetadataStore, value: bool) {
	store.set_metadata(SetMetadataParams {
		action_type: Some(ActionType::ToggleField),
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "info".to_owned(),
		field: "featured".to_owned(),
		value: json!(value),
		category: Some("Info".into()),
		label: Some("Featured".into()),
		..Default::default()
	});
}

#[test]
fn test_toggle_pairs_cancel() {
	let mut store = store_with(json!({"info": {"featured": false}}));
	toggle(&mut store, true);
	toggle(&mut store, false);

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.is_empty());
}

#[test]
fn test_odd_toggle_count_keeps_most_recent() {
	let mut store = store_with(json!({"info": {"featured": false}}));
	toggle(&mut store, true);
	toggle(&mut store, false);
	toggle(&mut store, true);

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	let fields: Vec<_> = list
		.elements
		.iter()
		.filter(|element| element.kind == ElementKind::Field)
		.collect();
	assert_eq!(fields.len(), 1);
	assert_eq!(fields[0].value, "Turned on Featured");
}

#[test]
fn test_inverted_toggle_flips_wording() {
	let mut store = store_with(json!({}));
	store.set_metadata(SetMetadataParams {
		action_type: Some(ActionType::ToggleField),
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "info".to_owned(),
		field: "hide_title".to_owned(),
		value: json!(true),
		label: Some("Show Title".into()),
		inverted: true,
		..Default::default()
	});

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.text.contains("Turned off Show Title"));
}

#[test]
fn test_prune_keeps_only_latest_per_path() {
	let mut store = store_with(json!({}));
	for value in ["bronze", "silver"] {
		store.set_metadata(SetMetadataParams {
			action_type: Some(ActionType::ModifyFieldUnstackable),
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: "info".to_owned(),
			field: "tier".to_owned(),
			value: json!(value),
			category: Some("Info".into()),
			label: Some("Tier".into()),
			..Default::default()
		});
	}

	let pruned = prune(rebase(store.actions("obj1")));
	assert_eq!(pruned.len(), 1);
	assert_eq!(
		pruned[0].original().cloned(),
		Some(json!("bronze")),
		"the survivor is the most recent action"
	);
}

#[test]
fn test_end_to_end_modified_title() {
	let mut store = store_with(json!({"title": "Old"}));
	store.set_metadata(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "title".to_owned(),
		value: json!("New"),
		category: Some("Info".into()),
		label: Some("Title".into()),
		..Default::default()
	});
	assert_eq!(store.get_metadata("obj1", "/", "title"), Some(json!("New")));

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert_eq!(
		list.elements,
		vec![
			ChangeListElement {
				kind: ElementKind::Category,
				value: "Info".to_owned(),
				level: 0,
			},
			ChangeListElement {
				kind: ElementKind::Field,
				value: "Modified Title".to_owned(),
				level: 1,
			},
		]
	);
	assert_eq!(list.text, "Info\n  Modified Title\n");
	assert_eq!(list.markdown, "### Info\n\n* Modified Title\n\n");
}

#[test]
fn test_markdown_separates_categories() {
	let mut store = store_with(json!({}));
	for (category, field) in [("Info", "title"), ("Theme", "color")] {
		store.set_metadata(SetMetadataParams {
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: "/".to_owned(),
			field: field.to_owned(),
			value: json!("x"),
			category: Some(category.into()),
			subcategory: Some("Display".into()),
			label: Some(field.to_owned().into()),
			..Default::default()
		});
	}

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.markdown.contains("### Info"));
	assert!(list.markdown.contains("---"));
	assert!(list.markdown.contains("### Theme"));
	assert!(list.markdown.contains("#### Display"));
	let subcategory_fields: Vec<_> = list
		.elements
		.iter()
		.filter(|element| element.level == 2)
		.collect();
	assert_eq!(subcategory_fields.len(), 2);
}

#[test]
fn test_cleared_field_renders_as_cleared() {
	let mut store = store_with(json!({"title": "Old"}));
	store.set_metadata(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "title".to_owned(),
		value: json!(""),
		category: Some("Info".into()),
		label: Some("Title".into()),
		..Default::default()
	});

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.text.contains("Cleared Title"));
}

#[test]
fn test_unlabeled_action_is_skipped() {
	let mut store = store_with(json!({}));
	store.set_metadata(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "title".to_owned(),
		value: json!("x"),
		category: Some("Info".into()),
		..Default::default()
	});

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.is_empty());
}

#[test]
fn test_set_default_is_excluded() {
	let mut store = store_with(json!({}));
	store.set_default_value(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "currency".to_owned(),
		value: json!("USD"),
		label: Some("Currency".into()),
		..Default::default()
	});

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.is_empty());
}

#[test]
fn test_deferred_label_renders_removed_item() {
	let mut store = store_with(json!({"items": [{"name": "Hero Banner"}]}));
	let removed_name = store
		.get_metadata("obj1", "items/0", "name")
		.and_then(|value| value.as_str().map(str::to_owned))
		.unwrap();
	store
		.remove_list_element(ListParams {
			object_id: "obj1".to_owned(),
			page: PAGE.to_owned(),
			path: "/".to_owned(),
			field: "items".to_owned(),
			index: Some(0),
			category: Some("Items".into()),
			label: Some(Label::Deferred(Arc::new(move || removed_name.clone()))),
			..Default::default()
		})
		.unwrap();

	// The item is gone from the document, but the label still names it.
	assert_eq!(store.get_metadata("obj1", "/", "items"), Some(json!([])));
	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert!(list.text.contains("Removed Hero Banner"));
}

#[test]
fn test_uncategorized_bucket_default() {
	let mut store = store_with(json!({}));
	store.set_metadata(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "title".to_owned(),
		value: json!("x"),
		label: Some("Title".into()),
		..Default::default()
	});

	let list = build(store.actions("obj1"), &MessageTemplates::default());
	assert_eq!(list.elements[0].value, UNCATEGORIZED);
}
