//! Gateway-owned listeners
//!
//! The gateway always carries exactly two: a plaintext listener whose
//! only action is a permanent redirect to the secure scheme/port, and a
//! secure listener that binds the issued certificate and holds the
//! routing table.

use crate::domain::certificate::Certificate;
use crate::domain::id::CertificateId;
use crate::domain::listener::{Protocol, RedirectAction};
use crate::errors::{ProvisioningError, Result};
use crate::routing::{RouteDecision, RoutingTable};
use serde::{Deserialize, Serialize};

/// Plaintext listener with a single unconditional redirect action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectListener {
    /// Scope-qualified listener name
    pub name: String,

    /// Listening port
    pub port: u16,

    /// Entry protocol (always plaintext HTTP)
    pub protocol: Protocol,

    /// The one and only action
    pub action: RedirectAction,
}

impl RedirectListener {
    pub(crate) fn new(name: impl Into<String>, port: u16, secure_port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            protocol: Protocol::Http,
            action: RedirectAction::permanent_to_https(secure_port),
        }
    }
}

/// Secure listener bound to an issued certificate, holding the rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureListener {
    /// Scope-qualified listener name
    pub name: String,

    /// Listening port
    pub port: u16,

    /// Entry protocol (always HTTPS)
    pub protocol: Protocol,

    /// The bound certificate
    pub certificate: CertificateId,

    table: RoutingTable,
}

impl SecureListener {
    /// Bind a certificate and an installed routing table.
    ///
    /// Fails with `CertificateNotValidated` unless the certificate has
    /// completed DNS validation — a secure listener must never exist
    /// with a pending or failed certificate behind it.
    pub fn bind(
        name: impl Into<String>,
        port: u16,
        certificate: &Certificate,
        table: RoutingTable,
    ) -> Result<Self> {
        if !certificate.is_issued() {
            return Err(ProvisioningError::CertificateNotValidated {
                domain: certificate.domain_name.clone(),
                status: certificate.status.to_string(),
            }
            .into());
        }

        Ok(Self {
            name: name.into(),
            port,
            protocol: Protocol::Https,
            certificate: certificate.id.clone(),
            table,
        })
    }

    /// The installed routing table
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Resolve a request path against the installed rules
    pub fn route(&self, path: &str) -> Option<RouteDecision<'_>> {
        self.table.resolve(path)
    }
}
