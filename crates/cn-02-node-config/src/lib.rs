//! # Node Configuration Rendering
//!
//! Produces each node's Besu `config.toml`: network id, P2P and JSON-RPC
//! settings, role-dependent API set, bootnode list and mining flags.

pub mod domain;
pub mod error;
pub mod renderer;

pub use domain::*;
pub use error::{RenderError, Result};
pub use renderer::ConfigRenderer;

/// Config file name inside a node directory.
pub const CONFIG_FILE: &str = "config.toml";
