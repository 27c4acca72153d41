//! Database Manager Integration Tests
//!
//! Exercises the record-level facade against a real on-disk store in a
//! temp directory: setup gating, update-or-create semantics, deferred
//! saves, purchases, clears, and shared-cache mirroring.

use std::path::Path;

use shopping_list::storage::shared_cache::SharedCacheStore;
use shopping_list::{AppError, DatabaseManager, Item, StoreConfiguration};

// ============================================================================
// Helpers
// ============================================================================

fn store_in(directory: &Path) -> StoreConfiguration {
    StoreConfiguration {
        store_name: "shopping-list".to_string(),
        directory: Some(directory.to_path_buf()),
        seed_store: None,
    }
}

fn ready_manager(directory: &Path) -> DatabaseManager {
    let manager = DatabaseManager::new(store_in(directory));
    manager
        .set_up_connection(false)
        .expect("Failed to set up test database");
    manager
}

fn names(items: &[Item]) -> Vec<&str> {
    items.iter().filter_map(|i| i.name.as_deref()).collect()
}

// ============================================================================
// Setup gating
// ============================================================================

#[test]
fn test_operations_before_setup_fail_with_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::new(store_in(dir.path()));

    assert!(matches!(
        manager.shopping_cart(),
        Err(AppError::DatabaseNotSetUp)
    ));
    assert!(matches!(
        manager.save(&Item::new("milk", false), true),
        Err(AppError::DatabaseNotSetUp)
    ));
    assert!(matches!(
        manager.lookup("milk"),
        Err(AppError::DatabaseNotSetUp)
    ));
    assert!(matches!(
        manager.clear_database(),
        Err(AppError::DatabaseNotSetUp)
    ));

    // No partial state: completing setup yields an empty, working store.
    manager.set_up_connection(false).unwrap();
    assert!(manager.shopping_cart().unwrap().is_empty());
}

// ============================================================================
// The core scenario
// ============================================================================

#[test]
fn test_save_purchase_clear_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ready_manager(dir.path());

    manager.save(&Item::new("milk", false), true).unwrap();
    let cart = manager.shopping_cart().unwrap();
    assert_eq!(names(&cart), vec!["milk"]);
    assert!(!cart[0].purchased);

    manager.purchase_item("milk");
    let cart = manager.shopping_cart().unwrap();
    assert_eq!(names(&cart), vec!["milk"]);
    assert!(cart[0].purchased);

    manager.clear_database().unwrap();
    assert!(manager.shopping_cart().unwrap().is_empty());
}

#[test]
fn test_duplicate_save_keeps_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ready_manager(dir.path());

    manager.save(&Item::new("milk", false), true).unwrap();
    manager.save(&Item::new("milk", true), true).unwrap();

    let cart = manager.shopping_cart().unwrap();
    assert_eq!(cart.len(), 1);
    assert!(cart[0].purchased, "latest value wins");
}

#[test]
fn test_purchase_missing_item_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ready_manager(dir.path());
    manager.save(&Item::new("bread", false), true).unwrap();

    manager.purchase_item("milk");

    let cart = manager.shopping_cart().unwrap();
    assert_eq!(names(&cart), vec!["bread"]);
    assert!(!cart[0].purchased);
}

#[test]
fn test_lookup_and_availability() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ready_manager(dir.path());
    manager.save(&Item::new("milk", false), true).unwrap();

    assert_eq!(
        manager.lookup("milk").unwrap(),
        Some(Item::new("milk", false))
    );
    assert_eq!(manager.lookup("eggs").unwrap(), None);
    assert!(manager.is_item_available("milk"));
    assert!(!manager.is_item_available("eggs"));
}

// ============================================================================
// Deferred saves and rollback
// ============================================================================

#[test]
fn test_deferred_save_invisible_until_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ready_manager(dir.path());

    manager.save(&Item::new("milk", false), false).unwrap();
    assert!(manager.shopping_cart().unwrap().is_empty());

    manager.save_and_persist().unwrap();
    assert_eq!(names(&manager.shopping_cart().unwrap()), vec!["milk"]);

    // Durable: a second manager over the same directory sees the row.
    let reopened = ready_manager(dir.path());
    assert_eq!(names(&reopened.shopping_cart().unwrap()), vec!["milk"]);
}

#[test]
fn test_discard_drops_staged_changes() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ready_manager(dir.path());

    manager.save(&Item::new("milk", false), false).unwrap();
    manager.discard_all_changes();
    manager.save_and_persist().unwrap();

    assert!(manager.shopping_cart().unwrap().is_empty());
}

#[test]
fn test_discard_before_setup_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::new(store_in(dir.path()));
    manager.discard_all_changes();
}

// ============================================================================
// Shared cache mirroring
// ============================================================================

#[test]
fn test_persisted_mutations_rewrite_the_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let slot = dir.path().join("shared-cart.json");

    let manager = DatabaseManager::new(store_in(dir.path()))
        .with_shared_cache_mirror(SharedCacheStore::with_slot_path(slot.clone()));
    manager.set_up_connection(false).unwrap();

    manager.save(&Item::new("milk", false), true).unwrap();
    let cache = SharedCacheStore::with_slot_path(slot.clone());
    assert_eq!(cache.fetch_item("milk").unwrap().purchased, false);

    manager.purchase_item("milk");
    let cache = SharedCacheStore::with_slot_path(slot.clone());
    assert!(cache.fetch_item("milk").unwrap().purchased);

    manager.clear_database().unwrap();
    let cache = SharedCacheStore::with_slot_path(slot);
    assert!(cache.shopping_cart().is_empty());
}
