//! External seams for certificate issuance and record publication.
//!
//! The composer never talks to a real certificate authority or DNS host;
//! it drives these traits. The in-memory implementations back the test
//! suites and local development, with scripted issuance behavior.

use crate::domain::certificate::{Certificate, CertificateStatus};
use crate::domain::dns::{AliasRecord, RecordName, Zone};
use crate::domain::id::{CertificateId, RecordId};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Certificate authority seam.
///
/// `request` is idempotent by natural key (zone, domain name): invoking
/// it again for the same pair must return the already-tracked order, so
/// retried builds reuse certificates instead of duplicating them.
#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Request (or re-find) a certificate order for `domain_name`
    /// validated against `zone`
    async fn request(&self, zone: &Zone, domain_name: &str) -> Result<CertificateId>;

    /// Observe the current state of an order
    async fn poll(&self, order: &CertificateId) -> Result<Certificate>;
}

/// DNS host seam.
///
/// `upsert_alias` is idempotent: re-publishing the same (zone, name)
/// updates the record in place and keeps its identity.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Publish (or update) the alias record pointing `record_name` in
    /// `zone` at `target`
    async fn upsert_alias(
        &self,
        zone: &Zone,
        record_name: &RecordName,
        target: &str,
    ) -> Result<AliasRecord>;
}

/// Scripted issuance behavior for [`InMemoryAuthority`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuancePlan {
    /// Issue after this many polls (the first poll moves the order from
    /// Requested to Validating)
    IssueAfterPolls(u32),

    /// Fail terminally after this many polls
    FailAfterPolls {
        /// Polls before the failure is observable
        polls: u32,
        /// Failure reason reported by the authority
        reason: String,
    },

    /// Stay in Validating forever (drives timeout tests)
    NeverComplete,
}

struct OrderEntry {
    certificate: Certificate,
    polls: u32,
}

/// In-memory certificate authority with scripted issuance.
pub struct InMemoryAuthority {
    plan: IssuancePlan,
    orders: Mutex<HashMap<(String, String), OrderEntry>>,
}

impl InMemoryAuthority {
    /// Create an authority following the given issuance plan
    pub fn new(plan: IssuancePlan) -> Self {
        Self { plan, orders: Mutex::new(HashMap::new()) }
    }

    /// Authority that issues promptly (after two polls)
    pub fn issuing() -> Self {
        Self::new(IssuancePlan::IssueAfterPolls(2))
    }

    /// Number of orders ever requested (for idempotence assertions)
    pub fn order_count(&self) -> usize {
        self.orders.lock().expect("authority lock").len()
    }
}

#[async_trait]
impl CertificateAuthority for InMemoryAuthority {
    async fn request(&self, zone: &Zone, domain_name: &str) -> Result<CertificateId> {
        let mut orders = self.orders.lock().expect("authority lock");
        let key = (zone.id.as_str().to_string(), domain_name.to_string());

        let entry = orders.entry(key).or_insert_with(|| OrderEntry {
            certificate: Certificate {
                id: CertificateId::new(),
                domain_name: domain_name.to_string(),
                validation_zone: zone.id.clone(),
                status: CertificateStatus::Requested,
            },
            polls: 0,
        });

        Ok(entry.certificate.id.clone())
    }

    async fn poll(&self, order: &CertificateId) -> Result<Certificate> {
        let mut orders = self.orders.lock().expect("authority lock");
        let entry = orders
            .values_mut()
            .find(|entry| &entry.certificate.id == order)
            .ok_or_else(|| Error::validation(format!("unknown certificate order '{}'", order)))?;

        if entry.certificate.status.is_terminal() {
            return Ok(entry.certificate.clone());
        }

        entry.polls += 1;
        entry.certificate.status = match &self.plan {
            IssuancePlan::IssueAfterPolls(polls) if entry.polls >= *polls => {
                CertificateStatus::Issued { issued_at: Utc::now() }
            }
            IssuancePlan::FailAfterPolls { polls, reason } if entry.polls >= *polls => {
                CertificateStatus::Failed { reason: reason.clone() }
            }
            _ => CertificateStatus::Validating,
        };

        Ok(entry.certificate.clone())
    }
}

/// In-memory DNS host with idempotent alias upserts.
#[derive(Default)]
pub struct InMemoryDns {
    records: Mutex<HashMap<(String, String), AliasRecord>>,
}

impl InMemoryDns {
    /// Create an empty DNS host
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all published records (for assertions)
    pub fn records(&self) -> Vec<AliasRecord> {
        self.records.lock().expect("dns lock").values().cloned().collect()
    }
}

#[async_trait]
impl DnsProvider for InMemoryDns {
    async fn upsert_alias(
        &self,
        zone: &Zone,
        record_name: &RecordName,
        target: &str,
    ) -> Result<AliasRecord> {
        let mut records = self.records.lock().expect("dns lock");
        let key = (zone.id.as_str().to_string(), record_name.fqdn(&zone.name));

        let record = records
            .entry(key)
            .and_modify(|record| record.target = target.to_string())
            .or_insert_with(|| AliasRecord {
                id: RecordId::new(),
                zone: zone.id.clone(),
                record_name: record_name.clone(),
                target: target.to_string(),
            });

        Ok(record.clone())
    }
}
