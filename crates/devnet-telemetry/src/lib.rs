//! # Devnet Telemetry
//!
//! Structured logging and Prometheus metrics for the Clique-Net
//! orchestrator.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devnet_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CN_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honored) |
//! | `CN_JSON_LOGS` | `false` | JSON log lines |
//! | `CN_CONSOLE_OUTPUT` | `true` | Write logs to stderr |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, HistogramTimer, CLIQUE_PROPOSALS, CONTAINERS_STARTED,
    IPS_ALLOCATED, NODES_RUNNING, NODE_STARTUP_DURATION, ORCHESTRATOR_ERRORS, READINESS_PROBES,
    SIGNER_CHANGES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the log subscriber.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(&config)
}

