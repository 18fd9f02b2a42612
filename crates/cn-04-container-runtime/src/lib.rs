//! # Container Runtime
//!
//! The container-runtime port used by the orchestrator, with a Docker CLI
//! adapter. Networks and containers are addressed by name.
//!
//! ## Architecture
//!
//! - **Domain Layer:** container specs, inspection results, filters
//! - **Ports Layer:** [`ContainerRuntime`]
//! - **Adapters Layer:** [`DockerCli`]
//! - **Test Utilities:** `InMemoryContainerRuntime` (feature `test-utils`)

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::DockerCli;
pub use domain::*;
pub use error::{Result, RuntimeError};
pub use ports::ContainerRuntime;
