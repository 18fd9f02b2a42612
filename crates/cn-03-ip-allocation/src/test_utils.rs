//! Test utilities for address allocation.
//!
//! Enable with the `test-utils` feature flag.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use shared_types::Ipv4Subnet;

use crate::ports::{InspectorError, NetworkInspector};

/// Inspector answering from fixed data.
#[derive(Debug, Clone, Default)]
pub struct StaticNetworkInspector {
    subnet: Option<Ipv4Subnet>,
    in_use: Vec<Ipv4Addr>,
    fail_subnet: bool,
    fail_listing: bool,
}

impl StaticNetworkInspector {
    /// A network with a known subnet and no running containers.
    pub fn new(subnet: Ipv4Subnet) -> Self {
        Self {
            subnet: Some(subnet),
            ..Default::default()
        }
    }

    /// A network whose subnet cannot be determined.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// A network whose subnet lookup errors.
    pub fn failing_subnet() -> Self {
        Self {
            fail_subnet: true,
            ..Default::default()
        }
    }

    pub fn with_in_use(mut self, in_use: Vec<Ipv4Addr>) -> Self {
        self.in_use = in_use;
        self
    }

    /// Make `addresses_in_use` error.
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

#[async_trait]
impl NetworkInspector for StaticNetworkInspector {
    async fn subnet(&self, network: &str) -> Result<Option<Ipv4Subnet>, InspectorError> {
        if self.fail_subnet {
            return Err(InspectorError(format!("no such network: {}", network)));
        }
        Ok(self.subnet)
    }

    async fn addresses_in_use(&self, network: &str) -> Result<Vec<Ipv4Addr>, InspectorError> {
        if self.fail_listing {
            return Err(InspectorError(format!("cannot list containers of {}", network)));
        }
        Ok(self.in_use.clone())
    }
}
