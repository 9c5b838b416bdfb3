//! Listener domain types
//!
//! Shared building blocks for the gateway's two listeners: the entry
//! protocol and the unconditional redirect action the plaintext listener
//! carries. The listener entities themselves live with the gateway,
//! which exclusively owns them.

use serde::{Deserialize, Serialize};

/// Entry protocol of a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Plaintext HTTP
    Http,

    /// HTTP over TLS
    Https,
}

impl Protocol {
    /// Check if this protocol requires a bound certificate
    pub fn requires_certificate(&self) -> bool {
        matches!(self, Protocol::Https)
    }

    /// Conventional port for this protocol
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }

    /// URL scheme string
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Unconditional scheme/port redirect.
///
/// The plaintext listener's only action: send the caller to the secure
/// listener with HTTP 301 semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectAction {
    /// Scheme redirected to
    pub target_protocol: Protocol,

    /// Port redirected to
    pub target_port: u16,

    /// HTTP status code of the redirect
    pub status_code: u16,
}

impl RedirectAction {
    /// Permanent (301) redirect to HTTPS on the given port
    pub fn permanent_to_https(target_port: u16) -> Self {
        Self { target_protocol: Protocol::Https, target_port, status_code: 301 }
    }

    /// Render the redirect location for a given host and path
    pub fn location(&self, host: &str, path: &str) -> String {
        if self.target_port == self.target_protocol.default_port() {
            format!("{}://{}{}", self.target_protocol.scheme(), host, path)
        } else {
            format!("{}://{}:{}{}", self.target_protocol.scheme(), host, self.target_port, path)
        }
    }
}
