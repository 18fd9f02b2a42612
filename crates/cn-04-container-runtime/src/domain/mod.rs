//! Runtime-agnostic container and network descriptions.

pub mod container;
pub mod network;

pub use container::{
    ContainerFilter, ContainerInfo, ContainerSpec, ContainerState, PortBinding, VolumeMount,
    LABEL_NETWORK, LABEL_NODE, LABEL_ROLE,
};
pub use network::NetworkInfo;
