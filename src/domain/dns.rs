//! DNS domain types
//!
//! The zone is externally supplied and immutable; the composer only ever
//! publishes one alias record into it, mapping the public domain name
//! (apex by default, or a configured subdomain) to the gateway's
//! address.

use crate::domain::id::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally assigned identifier of a hosted DNS zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ZoneId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DNS namespace the gateway's public name lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Externally assigned zone id
    pub id: ZoneId,

    /// Zone apex name (`example.com`)
    pub name: String,
}

impl Zone {
    /// Create a zone descriptor from externally supplied attributes
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Where in the zone the alias record is published
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordName {
    /// The zone apex (`example.com`)
    #[default]
    Apex,

    /// A named subdomain (`www` → `www.example.com`)
    Subdomain(String),
}

impl RecordName {
    /// Fully qualified record name within the given zone
    pub fn fqdn(&self, zone_name: &str) -> String {
        match self {
            RecordName::Apex => zone_name.to_string(),
            RecordName::Subdomain(label) => format!("{}.{}", label, zone_name),
        }
    }
}

/// An alias record pointing a name in the zone at the gateway address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// Unique record id
    pub id: RecordId,

    /// Zone the record lives in
    pub zone: ZoneId,

    /// Position within the zone
    pub record_name: RecordName,

    /// Target address (the gateway's public DNS name)
    pub target: String,
}
