//! Filesystem adapters for the mapping store.

pub mod file_store;
pub mod lock;

pub use file_store::{FileMappingStore, MAPPING_FILE};
pub use lock::{LockError, StoreLock};
