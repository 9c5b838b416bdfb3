//! Network descriptor types
//!
//! The network is an external collaborator's output consumed by the
//! composer: an address space with a subnet set, inside which the
//! gateway allocates its single public address. The composer never
//! carves CIDRs itself.

use crate::domain::scope::Scope;
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};

/// One subnet of the supplied network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Subnet name
    pub name: String,

    /// CIDR block (opaque to the composer)
    pub cidr: String,

    /// Whether the subnet is internet-routable
    pub public: bool,
}

/// Externally supplied network descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Network name
    pub name: String,

    /// Routable address space (opaque to the composer)
    pub address_space: String,

    /// Subnet set; at least one subnet is required to place a gateway
    pub subnets: Vec<Subnet>,
}

impl Network {
    /// Create a network descriptor
    pub fn new(
        name: impl Into<String>,
        address_space: impl Into<String>,
        subnets: Vec<Subnet>,
    ) -> Self {
        Self { name: name.into(), address_space: address_space.into(), subnets }
    }

    /// Validate the descriptor exposes somewhere to place a gateway
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.subnets.is_empty() {
            return Err(ConfigurationError::NoSubnets { network: self.name.clone() });
        }
        Ok(())
    }

    /// Allocate the gateway's public address inside this network.
    ///
    /// The address is a DNS-style name derived deterministically from
    /// the scope and network name, matching how delivery platforms hand
    /// out entry-point hostnames rather than raw IPs.
    pub(crate) fn allocate_public_address(&self, scope: &Scope) -> PublicAddress {
        PublicAddress {
            dns_name: format!("{}.{}.gateway.internal", scope.qualify("gw", ""), self.name),
        }
    }
}

/// The gateway's public network address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAddress {
    /// Publicly resolvable DNS name of the entry point
    pub dns_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> Network {
        Network::new(
            "core",
            "10.0.0.0/16",
            vec![
                Subnet { name: "public-a".into(), cidr: "10.0.1.0/24".into(), public: true },
                Subnet { name: "private-a".into(), cidr: "10.0.2.0/24".into(), public: false },
            ],
        )
    }

    #[test]
    fn valid_network_passes() {
        assert!(network().validate().is_ok());
    }

    #[test]
    fn subnetless_network_rejected() {
        let network = Network::new("empty", "10.0.0.0/16", vec![]);
        assert_eq!(
            network.validate(),
            Err(ConfigurationError::NoSubnets { network: "empty".into() })
        );
    }

    #[test]
    fn public_address_is_deterministic() {
        let scope = Scope::root("prod").unwrap();
        let first = network().allocate_public_address(&scope);
        let second = network().allocate_public_address(&scope);
        assert_eq!(first, second);
        assert_eq!(first.dns_name, "prod-gw.core.gateway.internal");
    }
}
