//! Data Models
//!
//! Contains the data structures shared by the app and the extension.

pub mod item;

pub use item::*;
