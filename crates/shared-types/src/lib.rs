//! # Shared Types Crate
//!
//! Domain entities and value objects shared by every Clique-Net crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: node and network definitions are declared
//!   here once and flow unchanged through genesis, config rendering, address
//!   allocation and the orchestrator.
//! - **Closed Roles**: node behaviour is selected by exhaustive matching on
//!   [`NodeRole`], never by inspecting container names.
//! - **One Backoff**: every bounded wait (readiness, consensus settling) goes
//!   through [`retry::poll_until`].

pub mod entities;
pub mod enode;
pub mod errors;
pub mod lifecycle;
pub mod retry;
pub mod subnet;

pub use entities::*;
pub use enode::Enode;
pub use errors::*;
pub use lifecycle::{NodeLifecycle, NodeState};
pub use retry::{poll_until, RetryExhausted, RetryPolicy};
pub use subnet::Ipv4Subnet;
