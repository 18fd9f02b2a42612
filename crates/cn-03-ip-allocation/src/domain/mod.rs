//! Allocation domain: the persisted mapping record and the pure address scan.

pub mod mapping;
pub mod scan;

pub use mapping::IpMappings;
pub use scan::{candidate_blocks, find_free_address, FIRST_HOST_OCTET, LAST_HOST_OCTET};
