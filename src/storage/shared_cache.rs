//! Shared Cache Store
//!
//! Process-shared mirror of the item list for the voice-assistant
//! extension, which cannot afford to open the full object graph store on
//! every short-lived invocation. Backed by a JSON key-value slot file in
//! the shared container; each record is archived by the binary codec and
//! base64-armored into an ordered sequence under the cart key.
//!
//! The slot has no locking. Every mutation re-reads and rewrites the
//! whole file, so of two concurrent writers the last full snapshot wins
//! and the other write is silently lost.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::models::Item;
use crate::storage::codec;
use crate::utils::error::AppResult;
use crate::utils::paths;

/// Well-known slot key holding the encoded cart sequence
pub const CART_KEY: &str = "cart";

/// Lightweight cache over the shared slot
#[derive(Debug)]
pub struct SharedCacheStore {
    slot_path: PathBuf,
    saved_cart: Vec<Item>,
}

impl SharedCacheStore {
    /// Open the cache over the default shared slot.
    pub fn new() -> AppResult<Self> {
        Ok(Self::with_slot_path(paths::shared_slot_path()?))
    }

    /// Open the cache over an explicit slot file. The stored sequence is
    /// loaded once, leniently: entries that fail to decode are skipped.
    pub fn with_slot_path(slot_path: PathBuf) -> Self {
        let saved_cart = load_cart(&slot_path);
        Self {
            slot_path,
            saved_cart,
        }
    }

    /// The in-memory item sequence
    pub fn shopping_cart(&self) -> &[Item] {
        &self.saved_cart
    }

    /// Linear scan by exact name match
    pub fn fetch_item(&self, name: &str) -> Option<&Item> {
        self.saved_cart
            .iter()
            .find(|item| item.name.as_deref() == Some(name))
    }

    /// Append an item and rewrite the full sequence.
    pub fn add(&mut self, item: Item) -> AppResult<()> {
        self.saved_cart.push(item);
        self.persist()
    }

    /// Mark the named item purchased in place, keeping its position. A
    /// miss is a silent no-op.
    pub fn purchase_item(&mut self, name: &str) -> AppResult<()> {
        let Some(index) = self
            .saved_cart
            .iter()
            .position(|item| item.name.as_deref() == Some(name))
        else {
            return Ok(());
        };
        self.saved_cart.remove(index);
        self.saved_cart.insert(index, Item::new(name, true));
        self.persist()
    }

    /// Replace the whole sequence and rewrite. Used by the app's
    /// mirroring path.
    pub fn replace_all(&mut self, items: Vec<Item>) -> AppResult<()> {
        self.saved_cart = items;
        self.persist()
    }

    fn persist(&self) -> AppResult<()> {
        let blobs: Vec<serde_json::Value> = self
            .saved_cart
            .iter()
            .map(|item| serde_json::Value::from(BASE64.encode(codec::encode_item(item))))
            .collect();

        // Read-modify-rewrite of the whole slot; other keys survive, but
        // a concurrent writer's cart update can be overwritten here.
        let mut slot = read_slot(&self.slot_path);
        slot.insert(CART_KEY.to_string(), serde_json::Value::Array(blobs));

        if let Some(parent) = self.slot_path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = serde_json::to_string_pretty(&serde_json::Value::Object(slot))?;
        std::fs::write(&self.slot_path, content)?;
        Ok(())
    }
}

fn read_slot(path: &Path) -> serde_json::Map<String, serde_json::Value> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return serde_json::Map::new();
    };
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

fn load_cart(path: &Path) -> Vec<Item> {
    let slot = read_slot(path);
    let Some(serde_json::Value::Array(blobs)) = slot.get(CART_KEY) else {
        return Vec::new();
    };
    blobs
        .iter()
        .filter_map(|blob| {
            let decoded = blob
                .as_str()
                .and_then(|encoded| BASE64.decode(encoded).ok())
                .and_then(|bytes| codec::decode_item(&bytes));
            if decoded.is_none() {
                tracing::debug!("skipping undecodable cart entry in shared slot");
            }
            decoded
        })
        .collect()
}
