//! Object Graph Store
//!
//! Owns the store lifecycle and the context hierarchy over a single
//! on-disk SQLite file. The hierarchy is kept as an explicit list of
//! layers ordered leaf to root: a background Worker layer used for
//! repository writes, the UI-facing Main layer, and the background Root
//! layer holding the connection pool. Saving walks the list and flushes
//! each layer's pending changes into its parent, reaching disk at Root;
//! a layer's staged values trump older values for the same identity.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::storage::entity::ItemEntity;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Store setup parameters
#[derive(Debug, Clone)]
pub struct StoreConfiguration {
    /// Store name; selects the schema and the on-disk file name
    pub store_name: String,
    /// Directory holding the store file; the shared container when `None`
    pub directory: Option<PathBuf>,
    /// Seed store copied into place on first prepopulated setup
    pub seed_store: Option<PathBuf>,
}

impl StoreConfiguration {
    /// The configuration the app ships with
    pub fn default_store_configuration() -> Self {
        Self {
            store_name: "shopping-list".to_string(),
            directory: None,
            seed_store: None,
        }
    }
}

/// Concurrency domain a context layer runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDomain {
    Main,
    Background,
}

/// Identifies one layer of the context hierarchy, leaf first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Worker,
    Main,
    Root,
}

/// Uncommitted mutations staged in one context layer
#[derive(Debug, Default)]
pub struct PendingChanges {
    /// Drop every persisted row before applying the staged upserts
    clear_all: bool,
    /// Staged creates and updates in registration order
    upserts: Vec<ItemEntity>,
}

impl PendingChanges {
    /// Whether anything is staged
    pub fn has_changes(&self) -> bool {
        self.clear_all || !self.upserts.is_empty()
    }

    /// Stage a create or in-place update. The staged values trump any
    /// earlier staged values for the same identity.
    pub fn upsert(&mut self, entity: ItemEntity) {
        if let Some(existing) = self.upserts.iter_mut().find(|e| e.id == entity.id) {
            *existing = entity;
        } else {
            self.upserts.push(entity);
        }
    }

    /// Stage removal of every entity, dropping anything staged so far.
    pub fn delete_all(&mut self) {
        self.clear_all = true;
        self.upserts.clear();
    }

    fn merge_into(self, parent: &mut PendingChanges) {
        if self.clear_all {
            parent.clear_all = true;
            parent.upserts = self.upserts;
        } else {
            for entity in self.upserts {
                parent.upsert(entity);
            }
        }
    }

    fn apply_to(&self, rows: &mut Vec<ItemEntity>) {
        if self.clear_all {
            rows.clear();
        }
        for entity in &self.upserts {
            if let Some(existing) = rows.iter_mut().find(|e| e.id == entity.id) {
                *existing = entity.clone();
            } else {
                rows.push(entity.clone());
            }
        }
    }
}

/// One execution context over a slice of the object graph
struct ContextLayer {
    kind: ContextKind,
    pending: Mutex<PendingChanges>,
}

/// Stack controller owning the context layers and the store connection
#[derive(Clone)]
pub struct StackController {
    inner: Arc<StackInner>,
}

struct StackInner {
    configuration: StoreConfiguration,
    /// Ordered leaf to root
    layers: Vec<ContextLayer>,
    pool: RwLock<Option<DbPool>>,
}

impl StackController {
    /// Create a controller for the given configuration. No I/O happens
    /// until [`setup_connection`](Self::setup_connection).
    pub fn new(configuration: StoreConfiguration) -> Self {
        let layers = vec![
            ContextLayer {
                kind: ContextKind::Worker,
                pending: Mutex::new(PendingChanges::default()),
            },
            ContextLayer {
                kind: ContextKind::Main,
                pending: Mutex::new(PendingChanges::default()),
            },
            ContextLayer {
                kind: ContextKind::Root,
                pending: Mutex::new(PendingChanges::default()),
            },
        ];
        Self {
            inner: Arc::new(StackInner {
                configuration,
                layers,
                pool: RwLock::new(None),
            }),
        }
    }

    /// The configuration this controller was built from
    pub fn configuration(&self) -> &StoreConfiguration {
        &self.inner.configuration
    }

    /// Concurrency domain of a context layer. Root and Worker run on
    /// background domains; Main is the UI-facing layer.
    pub fn domain(context: ContextKind) -> ContextDomain {
        match context {
            ContextKind::Main => ContextDomain::Main,
            ContextKind::Worker | ContextKind::Root => ContextDomain::Background,
        }
    }

    /// Whether the store connection has been opened
    pub fn is_set_up(&self) -> bool {
        self.inner.pool.read().unwrap().is_some()
    }

    /// Open the store: resolve the location, optionally copy the seed
    /// store into place, apply and migrate the schema. Idempotent once
    /// the connection exists.
    pub fn setup_connection(&self, prepopulated: bool) -> AppResult<()> {
        if self.is_set_up() {
            return Ok(());
        }
        let directory = self.store_directory()?;
        paths::ensure_dir(&directory)?;
        if prepopulated {
            self.copy_seed_store_if_needed()?;
        }
        let store_name = &self.inner.configuration.store_name;
        let schema = schema_for(store_name)
            .ok_or_else(|| AppError::SchemaNotFound(store_name.clone()))?;

        let manager = SqliteConnectionManager::file(self.store_path()?);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;
        init_schema(&pool, schema)?;

        *self.inner.pool.write().unwrap() = Some(pool);
        tracing::info!(store = %store_name, "object graph store ready");
        Ok(())
    }

    /// Path of the on-disk store file
    pub fn store_path(&self) -> AppResult<PathBuf> {
        Ok(self
            .store_directory()?
            .join(format!("{}.db", self.inner.configuration.store_name)))
    }

    fn store_directory(&self) -> AppResult<PathBuf> {
        match &self.inner.configuration.directory {
            Some(directory) => Ok(directory.clone()),
            None => paths::shared_container_dir(),
        }
    }

    fn copy_seed_store_if_needed(&self) -> AppResult<()> {
        let destination = self.store_path()?;
        if destination.exists() {
            return Ok(());
        }
        let seed = self
            .inner
            .configuration
            .seed_store
            .clone()
            .ok_or_else(|| AppError::SeedNotFound("no seed store configured".to_string()))?;
        if !seed.exists() {
            return Err(AppError::SeedNotFound(seed.display().to_string()));
        }
        std::fs::copy(&seed, &destination)?;
        tracing::info!(seed = %seed.display(), "copied seed store into place");
        Ok(())
    }

    /// Run a scoped unit against a layer's pending changes while holding
    /// that layer's lock. Units against the same context are serialized;
    /// sibling contexts may run concurrently.
    pub fn perform<R>(&self, context: ContextKind, unit: impl FnOnce(&mut PendingChanges) -> R) -> R {
        let layer = &self.inner.layers[Self::index_of(context)];
        let mut pending = layer.pending.lock().unwrap();
        unit(&mut pending)
    }

    /// Roll back the layer's uncommitted mutations. Does not cascade.
    pub fn discard_changes(&self, context: ContextKind) {
        self.perform(context, |pending| *pending = PendingChanges::default());
    }

    /// Save the context and every ancestor up to Root, blocking the
    /// caller until the whole chain completes.
    pub fn save_to_disk(&self, context: ContextKind) -> AppResult<()> {
        self.save_chain(context)
    }

    /// Schedule the save chain without blocking the calling domain. The
    /// completion is invoked with the chain's result.
    pub fn save_to_disk_async<F>(&self, context: ContextKind, completion: F)
    where
        F: FnOnce(AppResult<()>) + Send + 'static,
    {
        let controller = self.clone();
        std::thread::spawn(move || completion(controller.save_chain(context)));
    }

    /// Fetch every entity visible to the given context: the persisted
    /// rows overlaid with pending changes from Root down to the context.
    /// A context observes its ancestors' staged state, not its children's.
    pub fn fetch_all(&self, context: ContextKind) -> AppResult<Vec<ItemEntity>> {
        let mut rows = self.base_rows()?;
        let start = Self::index_of(context);
        for layer in self.inner.layers[start..].iter().rev() {
            layer.pending.lock().unwrap().apply_to(&mut rows);
        }
        Ok(rows)
    }

    /// Fetch the first entity whose name matches exactly, or `None`.
    pub fn fetch_first_by_name(
        &self,
        context: ContextKind,
        name: &str,
    ) -> AppResult<Option<ItemEntity>> {
        Ok(self
            .fetch_all(context)?
            .into_iter()
            .find(|entity| entity.name.as_deref() == Some(name)))
    }

    fn index_of(context: ContextKind) -> usize {
        match context {
            ContextKind::Worker => 0,
            ContextKind::Main => 1,
            ContextKind::Root => 2,
        }
    }

    fn pool(&self) -> AppResult<DbPool> {
        self.inner
            .pool
            .read()
            .unwrap()
            .clone()
            .ok_or(AppError::DatabaseNotSetUp)
    }

    fn base_rows(&self) -> AppResult<Vec<ItemEntity>> {
        let pool = self.pool()?;
        let conn = pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))?;
        let mut stmt =
            conn.prepare("SELECT id, name, purchased FROM items ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(ItemEntity {
                id: row.get(0)?,
                name: row.get(1)?,
                purchased: row.get::<_, i64>(2)? != 0,
            })
        })?;

        let mut entities = Vec::new();
        for row in rows {
            entities.push(row.map_err(map_row_error)?);
        }
        Ok(entities)
    }

    fn save_chain(&self, start: ContextKind) -> AppResult<()> {
        let layers = &self.inner.layers;
        for index in Self::index_of(start)..layers.len() {
            // A layer with nothing staged still continues the chain.
            let taken = {
                let mut pending = layers[index].pending.lock().unwrap();
                if !pending.has_changes() {
                    continue;
                }
                std::mem::take(&mut *pending)
            };
            if index + 1 < layers.len() {
                let mut parent = layers[index + 1].pending.lock().unwrap();
                taken.merge_into(&mut parent);
            } else if let Err(err) = self.flush_root(&taken) {
                // The failed changes stay staged; anything registered in
                // the meantime trumps them.
                let mut pending = layers[index].pending.lock().unwrap();
                let newer = std::mem::take(&mut *pending);
                let mut restored = taken;
                newer.merge_into(&mut restored);
                *pending = restored;
                return Err(err);
            }
            tracing::debug!(context = ?layers[index].kind, "flushed pending changes");
        }
        Ok(())
    }

    fn flush_root(&self, changes: &PendingChanges) -> AppResult<()> {
        let pool = self.pool()?;
        let mut conn = pool.get().map_err(|e| AppError::save(e.to_string()))?;
        let result: rusqlite::Result<()> = (|| {
            let tx = conn.transaction()?;
            if changes.clear_all {
                tx.execute("DELETE FROM items", [])?;
            }
            let now = chrono::Utc::now().to_rfc3339();
            for entity in &changes.upserts {
                tx.execute(
                    "INSERT INTO items (id, name, purchased, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name,
                         purchased = excluded.purchased, updated_at = ?4",
                    params![entity.id, entity.name, entity.purchased as i64, now],
                )?;
            }
            tx.commit()
        })();
        result.map_err(|e| AppError::save(e.to_string()))
    }
}

/// Look up the schema registered for a store name
fn schema_for(store_name: &str) -> Option<&'static str> {
    match store_name {
        "shopping-list" => Some(ITEMS_SCHEMA),
        _ => None,
    }
}

const ITEMS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    name TEXT,
    purchased INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
)";

/// Apply the schema, run the lightweight migration pass, and validate
/// the resulting table shape
fn init_schema(pool: &DbPool, schema: &str) -> AppResult<()> {
    let conn = pool
        .get()
        .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))?;
    conn.execute_batch(schema)
        .map_err(|e| AppError::schema_invalid(e.to_string()))?;

    // Lightweight migration: stores created before a column existed get
    // it added in place. SQLite has no IF NOT EXISTS for ADD COLUMN, so
    // column presence is checked via PRAGMA first.
    if !table_has_column(&conn, "items", "purchased") {
        conn.execute_batch("ALTER TABLE items ADD COLUMN purchased INTEGER NOT NULL DEFAULT 0")
            .map_err(|e| AppError::schema_invalid(e.to_string()))?;
    }
    for column in ["created_at", "updated_at"] {
        if !table_has_column(&conn, "items", column) {
            conn.execute_batch(&format!("ALTER TABLE items ADD COLUMN {} TEXT", column))
                .map_err(|e| AppError::schema_invalid(e.to_string()))?;
        }
    }

    for column in ["id", "name", "purchased", "created_at", "updated_at"] {
        if !table_has_column(&conn, "items", column) {
            return Err(AppError::schema_invalid(format!(
                "items table is missing column {}",
                column
            )));
        }
    }
    Ok(())
}

/// Check whether a table has a given column (via PRAGMA table_info)
fn table_has_column(conn: &rusqlite::Connection, table: &str, column: &str) -> bool {
    let sql = format!("PRAGMA table_info({})", table);
    if let Ok(mut stmt) = conn.prepare(&sql) {
        if let Ok(rows) = stmt.query_map([], |row| row.get::<_, String>(1)) {
            for row in rows.flatten() {
                if row == column {
                    return true;
                }
            }
        }
    }
    false
}

fn map_row_error(err: rusqlite::Error) -> AppError {
    match err {
        rusqlite::Error::InvalidColumnType(index, name, ty) => AppError::shape_mismatch(
            format!("column {} ({}) has unexpected type {}", index, name, ty),
        ),
        other => AppError::Sqlite(other),
    }
}
