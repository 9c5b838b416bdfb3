//! Certificate domain types
//!
//! A certificate is requested per gateway and validated via a DNS
//! challenge against its zone. Issuance is a long-running external
//! operation; the state machine here is what the composer observes while
//! polling the authority.

use crate::domain::dns::ZoneId;
use crate::domain::id::CertificateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observable lifecycle of a certificate request.
///
/// `Requested → Validating → Issued | Failed`; the two final states are
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CertificateStatus {
    /// Request accepted, DNS challenge not yet placed
    Requested,

    /// DNS challenge placed, waiting for validation
    Validating,

    /// Validated and issued
    Issued {
        /// Issuance time
        issued_at: DateTime<Utc>,
    },

    /// Validation failed; the reason propagates verbatim to the caller
    Failed {
        /// Authority-reported failure reason
        reason: String,
    },
}

impl CertificateStatus {
    /// Whether the certificate may be bound to a secure listener
    pub fn is_issued(&self) -> bool {
        matches!(self, CertificateStatus::Issued { .. })
    }

    /// Whether the state machine can still progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, CertificateStatus::Issued { .. } | CertificateStatus::Failed { .. })
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateStatus::Requested => write!(f, "requested"),
            CertificateStatus::Validating => write!(f, "validating"),
            CertificateStatus::Issued { .. } => write!(f, "issued"),
            CertificateStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// A certificate request tracked by the composer.
///
/// Identity is the natural key (domain name, validation zone):
/// re-requesting with the same inputs must return the same certificate,
/// never a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Unique certificate id
    pub id: CertificateId,

    /// Domain name the certificate covers
    pub domain_name: String,

    /// Zone the DNS challenge validates against
    pub validation_zone: ZoneId,

    /// Current lifecycle state
    pub status: CertificateStatus,
}

impl Certificate {
    /// Whether the certificate may be bound to a secure listener
    pub fn is_issued(&self) -> bool {
        self.status.is_issued()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(status: CertificateStatus) -> Certificate {
        Certificate {
            id: CertificateId::new(),
            domain_name: "app.example.com".into(),
            validation_zone: ZoneId::from("Z123"),
            status,
        }
    }

    #[test]
    fn only_issued_is_bindable() {
        assert!(!cert(CertificateStatus::Requested).is_issued());
        assert!(!cert(CertificateStatus::Validating).is_issued());
        assert!(cert(CertificateStatus::Issued { issued_at: Utc::now() }).is_issued());
        assert!(!cert(CertificateStatus::Failed { reason: "CAA".into() }).is_issued());
    }

    #[test]
    fn terminal_states() {
        assert!(!CertificateStatus::Requested.is_terminal());
        assert!(!CertificateStatus::Validating.is_terminal());
        assert!(CertificateStatus::Issued { issued_at: Utc::now() }.is_terminal());
        assert!(CertificateStatus::Failed { reason: "CAA".into() }.is_terminal());
    }

    #[test]
    fn failed_display_carries_reason() {
        let status = CertificateStatus::Failed { reason: "CAA record forbids issuance".into() };
        assert_eq!(status.to_string(), "failed: CAA record forbids issuance");
    }
}
