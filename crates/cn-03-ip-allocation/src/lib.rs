//! # IP Allocation
//!
//! Static IPv4 addresses for the nodes of a container network, persisted per
//! network so a node keeps its address across restarts.
//!
//! ## Architecture
//!
//! - **Domain Layer:** mapping record and the pure address scan
//! - **Ports Layer:** [`NetworkInspector`], implemented over the container runtime
//! - **Adapters Layer:** JSON mapping store guarded by an `fs2` file lock
//! - **Service Layer:** [`IpAllocator`]
//!
//! ## Concurrency
//!
//! Each read-modify-write of a store holds an advisory lock, which
//! serialises cooperating processes on one host. Processes on different hosts
//! sharing a data directory are not protected.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{FileMappingStore, LockError, StoreLock, MAPPING_FILE};
pub use domain::*;
pub use error::{IpAllocationError, Result};
pub use ports::{InspectorError, NetworkInspector};
pub use service::IpAllocator;
