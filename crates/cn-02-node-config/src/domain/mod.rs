//! Rendering domain: the Besu configuration file model, role-based API sets
//! and container-side paths.

pub mod api;
pub mod besu_config;
pub mod paths;

pub use api::{api_set, RpcApi};
pub use besu_config::BesuNodeConfig;
pub use paths::ContainerPaths;
