//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use gatewright::config::CertificateSettings;
use gatewright::dns::{DomainBinding, InMemoryAuthority, InMemoryDns};
use gatewright::domain::{Network, Scope, Subnet, Zone};
use gatewright::gateway::GatewayBuilder;

pub fn scope() -> Scope {
    Scope::root("prod").unwrap()
}

pub fn network() -> Network {
    Network::new(
        "core",
        "10.0.0.0/16",
        vec![
            Subnet { name: "public-a".into(), cidr: "10.0.1.0/24".into(), public: true },
            Subnet { name: "private-a".into(), cidr: "10.0.2.0/24".into(), public: false },
        ],
    )
}

pub fn builder() -> GatewayBuilder {
    GatewayBuilder::new(scope(), network())
}

/// Short timings so paused-clock tests advance quickly.
pub fn certificate_settings() -> CertificateSettings {
    CertificateSettings { validation_timeout_secs: 5, poll_interval_ms: 100 }
}

pub fn binding(authority: Arc<InMemoryAuthority>, dns: Arc<InMemoryDns>) -> DomainBinding {
    DomainBinding::new(
        Zone::new("Z123", "example.com"),
        "example.com",
        authority,
        dns,
        certificate_settings(),
    )
}
