//! Backend endpoint domain types
//!
//! An endpoint is one attachable backend instance: a host (IP or
//! hostname) and a port. Endpoints are supplied by an external compute
//! collaborator after gateway construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Endpoint host (IP or hostname)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostAddress {
    /// IP address (v4 or v6)
    Ip(IpAddr),

    /// Hostname (resolved by the data plane, not the composer)
    Hostname(String),
}

/// A single attachable backend instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host part of the endpoint
    pub host: HostAddress,

    /// Port number
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint from an IP address and port
    pub fn from_ip(ip: IpAddr, port: u16) -> Self {
        Self { host: HostAddress::Ip(ip), port }
    }

    /// Create an endpoint from a hostname and port
    pub fn from_hostname(hostname: impl Into<String>, port: u16) -> Self {
        Self { host: HostAddress::Hostname(hostname.into()), port }
    }

    /// Render as a "host:port" string
    pub fn to_socket_string(&self) -> String {
        match &self.host {
            HostAddress::Ip(IpAddr::V4(ip)) => format!("{}:{}", ip, self.port),
            HostAddress::Ip(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            HostAddress::Hostname(host) => format!("{}:{}", host, self.port),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_socket_string())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("endpoint '{}' is missing a port", s))?;
        let port: u16 =
            port.parse().map_err(|_| format!("endpoint '{}' has an invalid port", s))?;

        if host.is_empty() {
            return Err(format!("endpoint '{}' has an empty host", s));
        }

        let host = host.trim_start_matches('[').trim_end_matches(']');
        match host.parse::<IpAddr>() {
            Ok(ip) => Ok(Self::from_ip(ip, port)),
            Err(_) => Ok(Self::from_hostname(host, port)),
        }
    }
}
