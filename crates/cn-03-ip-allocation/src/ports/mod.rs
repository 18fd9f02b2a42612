//! Ports required by the allocator.

pub mod outbound;

pub use outbound::{InspectorError, NetworkInspector};
