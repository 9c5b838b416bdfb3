//! Domain binding
//!
//! Resolves a DNS zone, drives certificate issuance against it, and
//! publishes the alias record pointing the public name at the gateway's
//! address. Issuance is the one long-running operation in a build: it is
//! awaitable, cancellable by drop, and bounded by the configured
//! timeout.

pub mod authority;

pub use authority::{
    CertificateAuthority, DnsProvider, InMemoryAuthority, InMemoryDns, IssuancePlan,
};

use crate::config::CertificateSettings;
use crate::domain::certificate::{Certificate, CertificateStatus};
use crate::domain::dns::{AliasRecord, RecordName, Zone};
use crate::domain::network::PublicAddress;
use crate::errors::{ProvisioningError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Certificate plus published alias record for one public domain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundDomain {
    /// Issued certificate for the domain
    pub certificate: Certificate,

    /// Alias record mapping the domain at the gateway address
    pub alias: AliasRecord,
}

/// The certificate-issuance + DNS-alias pairing for one public domain.
///
/// Constructed independently of any gateway; a gateway build blocks on
/// [`DomainBinding::bind`] before its secure listener may exist.
/// Binding is idempotent: identical (zone, domain) inputs reuse the
/// existing certificate and record rather than creating duplicates.
pub struct DomainBinding {
    zone: Zone,
    domain_name: String,
    record_name: RecordName,
    authority: Arc<dyn CertificateAuthority>,
    dns: Arc<dyn DnsProvider>,
    settings: CertificateSettings,
}

impl DomainBinding {
    /// Create a binding for `domain_name` validated against `zone`.
    ///
    /// The alias record defaults to the zone apex.
    pub fn new(
        zone: Zone,
        domain_name: impl Into<String>,
        authority: Arc<dyn CertificateAuthority>,
        dns: Arc<dyn DnsProvider>,
        settings: CertificateSettings,
    ) -> Self {
        Self {
            zone,
            domain_name: domain_name.into(),
            record_name: RecordName::Apex,
            authority,
            dns,
            settings,
        }
    }

    /// Publish the alias at a named subdomain instead of the apex
    pub fn with_record_name(mut self, record_name: RecordName) -> Self {
        self.record_name = record_name;
        self
    }

    /// Domain name this binding covers
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Zone the binding validates and publishes into
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Await certificate issuance, then publish the alias record.
    ///
    /// Blocks until the certificate reaches `Issued`, fails with
    /// `ValidationTimeout` when the configured bound expires first, and
    /// propagates an authority-reported `Failed` reason verbatim.
    pub async fn bind(&self, target: &PublicAddress) -> Result<BoundDomain> {
        let certificate = self.await_issuance().await?;

        let alias = self
            .dns
            .upsert_alias(&self.zone, &self.record_name, &target.dns_name)
            .await?;

        info!(
            domain = %self.domain_name,
            zone = %self.zone.id,
            record = %alias.record_name.fqdn(&self.zone.name),
            target = %target.dns_name,
            "domain bound to gateway address"
        );

        Ok(BoundDomain { certificate, alias })
    }

    async fn await_issuance(&self) -> Result<Certificate> {
        let order = self.authority.request(&self.zone, &self.domain_name).await?;
        let timeout = self.settings.validation_timeout();

        let poll_loop = async {
            loop {
                let certificate = self.authority.poll(&order).await?;
                match &certificate.status {
                    CertificateStatus::Issued { .. } => {
                        info!(domain = %self.domain_name, certificate = %certificate.id, "certificate issued");
                        return Ok(certificate);
                    }
                    CertificateStatus::Failed { reason } => {
                        warn!(domain = %self.domain_name, %reason, "certificate validation failed");
                        return Err(ProvisioningError::CertificateFailed {
                            domain: self.domain_name.clone(),
                            reason: reason.clone(),
                        }
                        .into());
                    }
                    _ => tokio::time::sleep(self.settings.poll_interval()).await,
                }
            }
        };

        match tokio::time::timeout(timeout, poll_loop).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(domain = %self.domain_name, timeout_ms = timeout.as_millis() as u64, "certificate validation timed out");
                Err(ProvisioningError::ValidationTimeout {
                    domain: self.domain_name.clone(),
                    waited_ms: timeout.as_millis() as u64,
                }
                .into())
            }
        }
    }
}
