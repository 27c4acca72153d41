//! Shopping Item Model

use serde::{Deserialize, Serialize};

/// One shopping-list item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Case-insensitive key; callers lowercase-normalize before persisting
    pub name: Option<String>,
    /// Whether the item has been purchased
    pub purchased: bool,
}

impl Item {
    /// Create a named item
    pub fn new(name: impl Into<String>, purchased: bool) -> Self {
        Self {
            name: Some(name.into()),
            purchased,
        }
    }
}
