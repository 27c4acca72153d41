//! Persisted Item Entity
//!
//! The durable representation of an [`Item`] inside the object graph
//! store, plus the mapping pair between the two shapes. Exactly one
//! entity type exists, so the mapping is a pair of plain functions.

use uuid::Uuid;

use crate::models::Item;

/// Durable row form of a shopping item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntity {
    /// Opaque identity token assigned by the store at creation; used to
    /// re-acquire the same logical row across context boundaries
    pub id: String,
    pub name: Option<String>,
    pub purchased: bool,
}

impl ItemEntity {
    /// Create a fresh entity populated from an item.
    pub fn create_from(item: &Item) -> Self {
        let mut entity = Self {
            id: Uuid::new_v4().to_string(),
            name: None,
            purchased: false,
        };
        apply_item(item, &mut entity);
        entity
    }
}

/// Map an entity back to its plain item form.
pub fn to_item(entity: &ItemEntity) -> Item {
    Item {
        name: entity.name.clone(),
        purchased: entity.purchased,
    }
}

/// Overwrite an entity's mutable fields from an item. The identity token
/// is never touched.
pub fn apply_item(item: &Item, entity: &mut ItemEntity) {
    entity.name = item.name.clone();
    entity.purchased = item.purchased;
}
