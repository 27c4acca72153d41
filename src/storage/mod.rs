//! Storage Layer
//!
//! Handles all data persistence: the object graph store over SQLite, the
//! cross-process shared cache slot, the binary item codec, and the JSON
//! config.

pub mod codec;
pub mod config;
pub mod database;
pub mod entity;
pub mod shared_cache;
pub mod stack;

pub use config::*;
pub use database::*;
pub use shared_cache::*;
pub use stack::*;
