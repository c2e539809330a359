//! Cairn Storage - In-memory repository for the metadata catalog
//!
//! Provides a versioned, in-memory implementation of
//! `cairn_core::MetadataRepository` with JSON snapshot persistence.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod versioned;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryRepository;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use versioned::{Revision, Versioned};
