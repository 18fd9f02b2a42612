//! Ports exposed by this crate.

pub mod runtime;

pub use runtime::ContainerRuntime;
