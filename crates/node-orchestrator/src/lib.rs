//! # Clique-Net Node Orchestrator
//!
//! Provisions private Besu/Clique networks as containers and keeps their
//! signer set in step with the declared nodes.
//!
//! ## Modules
//!
//! - `orchestrator` - startup sequencing, node addition and removal
//! - `control_plane` - registry-backed entry point used by the CLI
//! - `registry` - networks managed by this process
//! - `layout` - on-disk data layout
//! - `definition` - network and node definition files
//! - `adapters` - bridges between the bounded contexts
//!
//! ## Example
//!
//! ```rust,ignore
//! let orchestrator = NodeLifecycleOrchestrator::new(config, runtime, transport);
//! let plane = ControlPlane::new(orchestrator);
//! plane.load_persisted()?;
//! let report = plane.provision_file(Path::new("net1.toml")).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod control_plane;
pub mod definition;
pub mod error;
pub mod layout;
pub mod orchestrator;
pub mod registry;
pub mod report;

pub use config::{ConfigError, GenesisSettings, OrchestratorConfig};
pub use control_plane::ControlPlane;
pub use definition::{read_network_definition, read_node_definition, write_network_definition};
pub use error::{OrchestratorError, Result};
pub use layout::DataLayout;
pub use orchestrator::{container_name, NodeLifecycleOrchestrator};
pub use registry::NetworkRegistry;
pub use report::{NetworkReport, NetworkStatus, NodeReport, NodeStatus};
