//! # handoff-storage
//!
//! Storage abstraction for the handoff service: the user directory, share,
//! session, and inbox keyspaces behind one TTL-aware key-value trait, with
//! in-memory and RocksDB backends.

#![warn(clippy::all)]

pub mod errors;
pub mod keyspace;
pub mod memory;
pub mod rocksdb_impl;
pub mod traits;

pub use errors::{Result, StorageError};
pub use memory::MemoryStore;
pub use rocksdb_impl::RocksDbStore;
pub use traits::{KvStore, KvStoreExt};
