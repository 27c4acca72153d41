//! Integration Tests Module
//!
//! End-to-end tests for the persistence core: the database manager over a
//! real on-disk store, the context stack lifecycle and save chain, and
//! the cross-process shared cache slot.

// Database manager facade tests
mod repository_test;


// Shared cache slot tests (including the documented lost-update race)
mod shared_cache_test;
