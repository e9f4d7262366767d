//! Storyreel seen-state stores.
//!
//! Concrete `SeenStore` implementations: a JSON file per key for durable
//! storage and an in-memory map for hosts that disable persistence.

pub mod file_seen_store;
pub mod memory_seen_store;

pub use file_seen_store::FileSeenStore;
pub use memory_seen_store::InMemorySeenStore;
