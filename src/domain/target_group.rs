//! Target group domain types
//!
//! A target group is a named pool of backend endpoints that traffic for a
//! matched rule is balanced across. Groups are created empty at gateway
//! build time and filled in later by an external compute collaborator;
//! attachment is additive. Rules never reference groups by bare string:
//! they hold a [`TargetGroupHandle`] minted by the builder that owns the
//! group, so a dangling reference can only mean a handle smuggled in
//! from another gateway, and pre-flight rejects exactly that.

use crate::domain::endpoint::Endpoint;
use crate::domain::id::{GatewayId, TargetGroupId};
use serde::{Deserialize, Serialize};

/// Backend protocol spoken to group members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetProtocol {
    /// Plain HTTP to the backend
    Http,

    /// TLS to the backend
    Https,
}

impl TargetProtocol {
    /// Lowercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetProtocol::Http => "http",
            TargetProtocol::Https => "https",
        }
    }
}

/// A named, mutable pool of backend endpoints owned by one gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetGroup {
    /// Unique group id
    pub id: TargetGroupId,

    /// Owning gateway
    pub gateway: GatewayId,

    /// Scope-qualified group name
    pub name: String,

    /// Protocol spoken to members
    pub protocol: TargetProtocol,

    /// Traffic port on members
    pub port: u16,

    members: Vec<Endpoint>,
}

impl TargetGroup {
    /// Create an empty group owned by `gateway`.
    pub(crate) fn new(
        gateway: GatewayId,
        name: impl Into<String>,
        protocol: TargetProtocol,
        port: u16,
    ) -> Self {
        Self {
            id: TargetGroupId::new(),
            gateway,
            name: name.into(),
            protocol,
            port,
            members: Vec::new(),
        }
    }

    /// Current members, in attachment order
    pub fn members(&self) -> &[Endpoint] {
        &self.members
    }

    /// Whether the group has any routable backend
    pub fn has_members(&self) -> bool {
        !self.members.is_empty()
    }

    /// Attach endpoints to the pool.
    ///
    /// Attachment is additive: repeated calls accumulate members. An
    /// endpoint already present is skipped, so re-attaching the same
    /// instance is a no-op rather than a duplicate. Returns the number of
    /// endpoints actually added.
    pub(crate) fn attach(&mut self, endpoints: impl IntoIterator<Item = Endpoint>) -> usize {
        let mut added = 0;
        for endpoint in endpoints {
            if !self.members.contains(&endpoint) {
                self.members.push(endpoint);
                added += 1;
            }
        }
        added
    }

    /// Handle for referencing this group from rules and attachments
    pub fn handle(&self) -> TargetGroupHandle {
        TargetGroupHandle {
            id: self.id.clone(),
            gateway: self.gateway.clone(),
            name: self.name.clone(),
        }
    }
}

/// Typed reference to a target group, minted by the owning builder.
///
/// Holding a handle is the only way a rule can forward traffic; a handle
/// from a different gateway fails pre-flight with `UnknownTargetGroup`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetGroupHandle {
    id: TargetGroupId,
    gateway: GatewayId,
    name: String,
}

impl TargetGroupHandle {
    /// Id of the referenced group
    pub fn id(&self) -> &TargetGroupId {
        &self.id
    }

    /// Gateway that minted this handle
    pub fn gateway(&self) -> &GatewayId {
        &self.gateway
    }

    /// Scope-qualified group name
    pub fn name(&self) -> &str {
        &self.name
    }
}
