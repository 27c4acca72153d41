//! Shopping List - Persistence Core Library
//!
//! Library shared by the desktop app and the voice-assistant extension
//! processes. It includes:
//! - The object graph store (context hierarchy over SQLite)
//! - The database manager facade used by the app
//! - The cross-process shared cache used by the extension
//! - Data models and utilities

pub mod models;
pub mod storage;
pub mod utils;

pub use models::Item;
pub use storage::config::{AppConfig, ConfigService};
pub use storage::database::{DatabaseManager, SetupState};
pub use storage::shared_cache::SharedCacheStore;
pub use storage::stack::{ContextKind, StackController, StoreConfiguration};
pub use utils::error::{AppError, AppResult};
