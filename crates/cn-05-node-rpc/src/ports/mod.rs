//! Ports required by the RPC client.

pub mod transport;

pub use transport::RpcTransport;
