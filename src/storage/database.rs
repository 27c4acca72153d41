//! Database Manager
//!
//! The sole mutation and query surface for shopping items. Every data
//! operation is gated on store setup having completed; writes run against
//! the Worker context and reads against the Main context, with the save
//! chain propagating Worker changes through Main and Root to disk.
//!
//! Managers are constructed explicitly and passed by reference to their
//! call sites; there is no process-wide instance.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use crate::models::Item;
use crate::storage::entity::{self, ItemEntity};
use crate::storage::shared_cache::SharedCacheStore;
use crate::storage::stack::{ContextKind, StackController, StoreConfiguration};
use crate::utils::error::{AppError, AppResult};

/// Repository lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SetupState {
    Uninitialized = 0,
    SettingUp = 1,
    Ready = 2,
}

impl From<u8> for SetupState {
    fn from(v: u8) -> Self {
        match v {
            1 => SetupState::SettingUp,
            2 => SetupState::Ready,
            _ => SetupState::Uninitialized,
        }
    }
}

/// Record-level facade over the object graph store
pub struct DatabaseManager {
    stack: StackController,
    state: AtomicU8,
    /// Shared cache rewritten after every persisted mutation, when the
    /// app is configured to keep the extension's view converged
    mirror: Option<Mutex<SharedCacheStore>>,
}

impl DatabaseManager {
    /// Create a manager over the given store configuration. The store is
    /// not opened until [`set_up_connection`](Self::set_up_connection).
    pub fn new(configuration: StoreConfiguration) -> Self {
        Self {
            stack: StackController::new(configuration),
            state: AtomicU8::new(SetupState::Uninitialized as u8),
            mirror: None,
        }
    }

    /// Mirror every persisted mutation into the given shared cache store.
    pub fn with_shared_cache_mirror(mut self, mirror: SharedCacheStore) -> Self {
        self.mirror = Some(Mutex::new(mirror));
        self
    }

    /// Current lifecycle state
    pub fn setup_state(&self) -> SetupState {
        SetupState::from(self.state.load(Ordering::SeqCst))
    }

    /// Open the store connection. Idempotent once `Ready`; a failed
    /// attempt returns the manager to `Uninitialized`.
    pub fn set_up_connection(&self, prepopulated: bool) -> AppResult<()> {
        if self.setup_state() == SetupState::Ready {
            return Ok(());
        }
        self.state
            .store(SetupState::SettingUp as u8, Ordering::SeqCst);
        match self.stack.setup_connection(prepopulated) {
            Ok(()) => {
                self.state.store(SetupState::Ready as u8, Ordering::SeqCst);
                Ok(())
            }
            Err(err) => {
                self.state
                    .store(SetupState::Uninitialized as u8, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    fn database_set_up_check(&self) -> AppResult<()> {
        match self.setup_state() {
            SetupState::Ready => Ok(()),
            _ => Err(AppError::DatabaseNotSetUp),
        }
    }

    /// Update-or-create by the item's normalized name key. With
    /// `persist`, the save chain runs immediately; otherwise the change
    /// stays staged in the Worker context for a later
    /// [`save_and_persist`](Self::save_and_persist).
    pub fn save(&self, item: &Item, persist: bool) -> AppResult<()> {
        self.database_set_up_check()?;
        let name = Self::required_name(item)?;
        match self.stack.fetch_first_by_name(ContextKind::Main, &name)? {
            Some(existing) => self.update(item, existing, persist),
            None => self.create_and_save(item, persist),
        }
    }

    /// Unconditionally create a new entity for the item. Callers must
    /// have established non-existence themselves.
    pub fn create_and_save(&self, item: &Item, persist: bool) -> AppResult<()> {
        self.database_set_up_check()?;
        Self::required_name(item)?;
        self.stack.perform(ContextKind::Worker, |pending| {
            pending.upsert(ItemEntity::create_from(item))
        });
        if persist {
            self.save_and_persist()?;
        }
        Ok(())
    }

    /// Overwrite an existing entity's mutable fields, re-acquiring it by
    /// identity token inside the Worker's scoped unit.
    fn update(&self, item: &Item, existing: ItemEntity, persist: bool) -> AppResult<()> {
        self.stack.perform(ContextKind::Worker, |pending| {
            let mut editable = existing;
            entity::apply_item(item, &mut editable);
            pending.upsert(editable);
        });
        if persist {
            self.save_and_persist()?;
        }
        Ok(())
    }

    /// Flush staged Worker changes through the context chain to disk.
    pub fn save_and_persist(&self) -> AppResult<()> {
        self.database_set_up_check()?;
        self.stack.save_to_disk(ContextKind::Worker)?;
        self.sync_mirror();
        Ok(())
    }

    /// Fetch the item with the given name, or `None` when absent.
    pub fn lookup(&self, name: &str) -> AppResult<Option<Item>> {
        self.database_set_up_check()?;
        Ok(self
            .stack
            .fetch_first_by_name(ContextKind::Main, name)?
            .map(|e| entity::to_item(&e)))
    }

    /// Whether an item with the given name exists. Errors degrade to
    /// `false`.
    pub fn is_item_available(&self, name: &str) -> bool {
        self.lookup(name).map(|found| found.is_some()).unwrap_or(false)
    }

    /// Full-table fetch on the Main context, mapped to plain items.
    pub fn shopping_cart(&self) -> AppResult<Vec<Item>> {
        self.database_set_up_check()?;
        Ok(self
            .stack
            .fetch_all(ContextKind::Main)?
            .iter()
            .map(entity::to_item)
            .collect())
    }

    /// Mark the named item purchased and persist. A missing item or a
    /// failed update is reported through the log, never to the caller.
    pub fn purchase_item(&self, name: &str) {
        let attempt = (|| -> AppResult<()> {
            self.database_set_up_check()?;
            let existing = self
                .stack
                .fetch_first_by_name(ContextKind::Main, name)?
                .ok_or_else(|| AppError::RecordNotFound(name.to_string()))?;
            self.update(&Item::new(name, true), existing, true)
        })();
        match attempt {
            Ok(()) => {}
            Err(AppError::RecordNotFound(_)) => {
                tracing::warn!(item = name, "failed to purchase: no such item");
            }
            Err(err) => {
                tracing::warn!(item = name, error = %err, "failed to purchase: update error");
            }
        }
    }

    /// Delete every entity and persist. Test and reset flows only.
    pub fn clear_database(&self) -> AppResult<()> {
        self.database_set_up_check()?;
        self.stack
            .perform(ContextKind::Worker, |pending| pending.delete_all());
        self.save_and_persist()
    }

    /// Roll back staged-but-unsaved Worker mutations. A no-op unless the
    /// manager is ready.
    pub fn discard_all_changes(&self) {
        if self.setup_state() != SetupState::Ready {
            return;
        }
        self.stack.discard_changes(ContextKind::Worker);
    }

    fn sync_mirror(&self) {
        let Some(mirror) = &self.mirror else {
            return;
        };
        match self.stack.fetch_all(ContextKind::Main) {
            Ok(entities) => {
                let items = entities.iter().map(entity::to_item).collect();
                if let Err(err) = mirror.lock().unwrap().replace_all(items) {
                    tracing::warn!(error = %err, "failed to rewrite the shared cache mirror");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read items for the shared cache mirror");
            }
        }
    }

    fn required_name(item: &Item) -> AppResult<String> {
        item.name
            .clone()
            .ok_or_else(|| AppError::missing_detail("name"))
    }
}
