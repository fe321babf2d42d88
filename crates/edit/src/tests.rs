use std::sync::Arc;

use curator_actions::{ContentObject, MetadataStore, SetMetadataParams, StoreKind};
use curator_client::{
	Encoding, FabricClient, KeyStorage, MemoryFabric, MemoryStorage, StorageScope,
};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

const PAGE: &str = "general";

fn marketplace_store(objects: &[(&str, serde_json::Value)]) -> MetadataStore {
	let mut store = MetadataStore::new(StoreKind::Marketplace);
	for (object_id, metadata) in objects {
		store.add_object(ContentObject {
			object_id: (*object_id).to_owned(),
			library_id: "ilib1".to_owned(),
			name: format!("Marketplace {object_id}"),
			metadata: metadata.clone(),
		});
	}
	store
}

fn edit_title(store: &mut MetadataStore, object_id: &str, value: &str) {
	store.set_metadata(SetMetadataParams {
		object_id: object_id.to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "title".to_owned(),
		value: json!(value),
		category: Some("Info".into()),
		label: Some("Title".into()),
		..Default::default()
	});
}

fn coordinator() -> EditCoordinator {
	EditCoordinator::new(Arc::new(MemoryStorage::new()))
}

#[test]
fn test_change_lists_cover_modified_entities_across_stores() {
	let mut marketplace = marketplace_store(&[("obj1", json!({})), ("obj2", json!({}))]);
	edit_title(&mut marketplace, "obj1", "New");

	let mut site = MetadataStore::new(StoreKind::Site);
	site.add_object(ContentObject {
		object_id: "site1".to_owned(),
		library_id: "ilib2".to_owned(),
		name: "Main Site".to_owned(),
		metadata: json!({}),
	});
	edit_title(&mut site, "site1", "Renamed");

	let summaries = coordinator().change_lists(&[&marketplace, &site]);
	assert_eq!(summaries.len(), 2);

	let marketplace_summary = &summaries[0];
	assert_eq!(marketplace_summary.kind, StoreKind::Marketplace);
	assert_eq!(marketplace_summary.store_key, "marketplaces");
	assert_eq!(marketplace_summary.object_id, "obj1");
	assert_eq!(marketplace_summary.name, "Marketplace obj1");
	assert_eq!(marketplace_summary.actions.len(), 1);
	assert_eq!(marketplace_summary.actions[0].path, "title");
	assert!(marketplace_summary.change_list.text.contains("Modified Title"));

	assert_eq!(summaries[1].store_key, "sites");
}

#[tokio::test]
async fn test_save_commits_and_clears() {
	let fabric = MemoryFabric::new();
	fabric.add_object("ilib1", "obj1", json!({"title": "Old"}));
	let mut store = marketplace_store(&[("obj1", json!({"title": "Old"}))]);
	edit_title(&mut store, "obj1", "New");

	let mut coordinator = coordinator();
	let report = coordinator
		.save(&fabric, &mut [&mut store], &["obj1".to_owned()])
		.await;

	assert_eq!(report.saved, vec!["obj1".to_owned()]);
	assert!(report.failed.is_empty());
	assert_eq!(
		fabric.committed_metadata("obj1"),
		Some(json!({"title": "New"}))
	);
	assert!(!store.has_changes("obj1"));
	assert!(store.undo_queue("obj1", PAGE).is_empty());
	assert!(coordinator.pending_write("obj1").is_none());
}

#[tokio::test]
async fn test_failed_entity_keeps_stack_and_batch_continues() {
	let fabric = MemoryFabric::new();
	fabric.add_object("ilib1", "obj1", json!({}));
	fabric.add_object("ilib1", "obj2", json!({}));
	fabric.fail_next_finalize("obj1");

	let mut store = marketplace_store(&[("obj1", json!({})), ("obj2", json!({}))]);
	edit_title(&mut store, "obj1", "One");
	edit_title(&mut store, "obj2", "Two");

	let mut coordinator = coordinator();
	let report = coordinator
		.save(
			&fabric,
			&mut [&mut store],
			&["obj1".to_owned(), "obj2".to_owned()],
		)
		.await;

	assert_eq!(report.saved, vec!["obj2".to_owned()]);
	assert_eq!(report.failed.len(), 1);
	assert_eq!(report.failed[0].0, "obj1");

	// The failed entity's edits remain undoable and re-saveable; its
	// discarded transaction must not be reused.
	assert!(store.has_changes("obj1"));
	assert!(coordinator.pending_write("obj1").is_none());
	assert!(!store.has_changes("obj2"));
	assert_eq!(
		fabric.committed_metadata("obj2"),
		Some(json!({"title": "Two"}))
	);
}

#[tokio::test]
async fn test_pending_transaction_survives_restart() {
	let fabric = MemoryFabric::new();
	fabric.add_object("ilib1", "obj1", json!({}));
	let storage = Arc::new(MemoryStorage::new());

	// An earlier process opened a transaction and persisted its handle.
	let transaction = fabric.edit_content_object("ilib1", "obj1").await.unwrap();
	storage
		.set(
			StorageScope::Local,
			"curator-pending-writes",
			&json!({"obj1": {
				"write_token": transaction.write_token,
				"node_url": transaction.node_url,
			}}),
			Encoding::Base64,
		)
		.unwrap();

	let mut coordinator = EditCoordinator::new(storage);
	assert_eq!(
		coordinator.pending_write("obj1"),
		Some(&transaction),
		"handle resumed from storage"
	);

	let mut store = marketplace_store(&[("obj1", json!({}))]);
	edit_title(&mut store, "obj1", "New");
	let report = coordinator
		.save(&fabric, &mut [&mut store], &["obj1".to_owned()])
		.await;

	assert_eq!(report.saved, vec!["obj1".to_owned()]);
	// The resumed draft was the one committed.
	assert!(!fabric.has_draft(&transaction.write_token));
	assert_eq!(
		fabric.committed_metadata("obj1"),
		Some(json!({"title": "New"}))
	);
}

#[tokio::test]
async fn test_unselected_entities_are_untouched() {
	let fabric = MemoryFabric::new();
	fabric.add_object("ilib1", "obj1", json!({}));
	fabric.add_object("ilib1", "obj2", json!({}));

	let mut store = marketplace_store(&[("obj1", json!({})), ("obj2", json!({}))]);
	edit_title(&mut store, "obj1", "One");
	edit_title(&mut store, "obj2", "Two");

	let report = coordinator()
		.save(&fabric, &mut [&mut store], &["obj1".to_owned()])
		.await;

	assert_eq!(report.saved, vec!["obj1".to_owned()]);
	assert!(store.has_changes("obj2"));
	assert_eq!(fabric.committed_metadata("obj2"), Some(json!({})));
}

#[tokio::test]
async fn test_entity_with_empty_changelist_is_skipped() {
	let fabric = MemoryFabric::new();
	fabric.add_object("ilib1", "obj1", json!({}));

	let mut store = marketplace_store(&[("obj1", json!({}))]);
	// No label: the changelist renders empty, so there is nothing to review
	// and the entity is not committed.
	store.set_metadata(SetMetadataParams {
		object_id: "obj1".to_owned(),
		page: PAGE.to_owned(),
		path: "/".to_owned(),
		field: "title".to_owned(),
		value: json!("New"),
		..Default::default()
	});

	let mut coordinator = coordinator();
	let report = coordinator
		.save(&fabric, &mut [&mut store], &["obj1".to_owned()])
		.await;

	assert!(report.saved.is_empty());
	assert!(report.failed.is_empty());
	assert!(store.has_changes("obj1"));
	assert!(coordinator.pending_write("obj1").is_none());
}

#[test]
fn test_end_to_end_review_then_undo() {
	let mut store = marketplace_store(&[("obj1", json!({"title": "Old"}))]);
	edit_title(&mut store, "obj1", "New");
	assert_eq!(store.get_metadata("obj1", "/", "title"), Some(json!("New")));

	let summaries = coordinator().change_lists(&[&store]);
	assert_eq!(summaries.len(), 1);
	assert_eq!(summaries[0].change_list.text, "Info\n  Modified Title\n");

	assert!(store.undo_action("obj1", PAGE));
	assert_eq!(store.get_metadata("obj1", "/", "title"), Some(json!("Old")));
}
