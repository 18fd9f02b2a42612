//! # Adapters
//!
//! Bridges between the bounded contexts.

pub mod runtime_inspector;

pub use runtime_inspector::RuntimeNetworkInspector;
