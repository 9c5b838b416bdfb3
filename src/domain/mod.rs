//! Domain layer
//!
//! Pure domain entities for the gateway composer with zero
//! infrastructure dependencies. These types represent the topology
//! model: listeners, rules, target groups, certificates, DNS records,
//! and identity providers.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe resource identifiers with NewType pattern
//! - `scope`: Structural naming scheme for composed resources
//! - `endpoint`: Attachable backend endpoints
//! - `target_group`: Backend pools and their typed handles
//! - `rule`: Path patterns, priorities, and (gated) forwarding actions
//! - `listener`: Entry protocols and the redirect action
//! - `certificate`: Certificate request lifecycle
//! - `dns`: Zones and alias records
//! - `identity`: User directories, clients, and secret references
//! - `network`: The externally supplied network descriptor

pub mod certificate;
pub mod dns;
pub mod endpoint;
pub mod id;
pub mod identity;
pub mod listener;
pub mod network;
pub mod rule;
pub mod scope;
pub mod target_group;

// Re-export main types from each module
pub use certificate::{Certificate, CertificateStatus};
pub use dns::{AliasRecord, RecordName, Zone, ZoneId};
pub use endpoint::{Endpoint, HostAddress};
pub use id::{CertificateId, GatewayId, ProviderId, RecordId, TargetGroupId};
pub use identity::{
    mandatory_callback_urls, ClientCredentials, DirectoryOptions, IdentityProvider,
    PasswordPolicy, ProviderHandle, SecretRef, OAUTH_CALLBACK_PATH,
};
pub use listener::{Protocol, RedirectAction};
pub use network::{Network, PublicAddress, Subnet};
pub use rule::{PathPattern, Rule, RuleAction};
pub use scope::Scope;
pub use target_group::{TargetGroup, TargetGroupHandle, TargetProtocol};
