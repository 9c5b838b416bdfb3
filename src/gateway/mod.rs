//! Gateway composition
//!
//! The builder wires the whole topology: it mints target-group handles,
//! runs the pure pre-flight pass over rules and auth wiring, allocates
//! the public address, blocks on domain binding, and only then creates
//! the secure listener. A configuration mistake can never leave a
//! half-built gateway behind, because every configuration check runs
//! before the first side effect.

pub mod listener;

pub use listener::{RedirectListener, SecureListener};

use crate::config::ListenerSettings;
use crate::dns::{BoundDomain, DomainBinding};
use crate::domain::endpoint::Endpoint;
use crate::domain::id::{GatewayId, TargetGroupId};
use crate::domain::identity::{IdentityProvider, ProviderHandle};
use crate::domain::network::{Network, PublicAddress};
use crate::domain::rule::{Rule, RuleAction};
use crate::domain::scope::Scope;
use crate::domain::target_group::{TargetGroup, TargetGroupHandle, TargetProtocol};
use crate::errors::{ConfigurationError, ReferenceError, Result};
use crate::routing::{RouteDecision, RoutingTable};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Builder for a gateway's complete topology.
///
/// Target groups are declared up front; the handles returned are the
/// only way rules can forward to them, which keeps every reference
/// inside the gateway being built.
pub struct GatewayBuilder {
    id: GatewayId,
    scope: Scope,
    network: Network,
    listeners: ListenerSettings,
    identity: Option<IdentityProvider>,
    rules: Vec<Rule>,
    groups: Vec<TargetGroup>,
}

impl GatewayBuilder {
    /// Start composing a gateway inside `network`, named from `scope`
    pub fn new(scope: Scope, network: Network) -> Self {
        Self {
            id: GatewayId::new(),
            scope,
            network,
            listeners: ListenerSettings::default(),
            identity: None,
            rules: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Override listener ports (defaults: 80 and 443)
    pub fn with_listener_settings(mut self, listeners: ListenerSettings) -> Self {
        self.listeners = listeners;
        self
    }

    /// Supply the identity provider gating one rule.
    ///
    /// When set, exactly one rule must use a gated action; when absent,
    /// none may.
    pub fn with_identity(mut self, identity: IdentityProvider) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Declare a target group and mint its handle.
    ///
    /// The group is created empty so an external compute collaborator
    /// can attach endpoints after the build. Declaring the same leaf
    /// name again returns the existing handle instead of a second
    /// group.
    pub fn target_group(
        &mut self,
        name: &str,
        protocol: TargetProtocol,
        port: u16,
    ) -> TargetGroupHandle {
        let qualified = self.scope.qualify("tg", name);
        if let Some(existing) = self.groups.iter().find(|group| group.name == qualified) {
            return existing.handle();
        }

        let group = TargetGroup::new(self.id.clone(), qualified, protocol, port);
        let handle = group.handle();
        self.groups.push(group);
        handle
    }

    /// Add one routing rule
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add several routing rules
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Compose the gateway.
    ///
    /// Order-dependent steps: pure pre-flight (network, listeners, auth
    /// wiring, routing table), public address allocation, plaintext
    /// redirect listener, domain binding (the one blocking step), secure
    /// listener. Errors surface in dependency order and never after a
    /// partial build.
    pub async fn build(self, domain: &DomainBinding) -> Result<BuiltGateway> {
        self.network.validate()?;
        self.check_listeners()?;
        self.check_auth_wiring()?;
        let table = RoutingTable::install(self.rules, &self.id)?;

        let address = self.network.allocate_public_address(&self.scope);
        let redirect = RedirectListener::new(
            self.scope.qualify("listener", "http"),
            self.listeners.http_port,
            self.listeners.https_port,
        );

        let bound = domain.bind(&address).await?;

        let secure = SecureListener::bind(
            self.scope.qualify("listener", "https"),
            self.listeners.https_port,
            &bound.certificate,
            table,
        )?;

        let target_groups: Vec<TargetGroupHandle> =
            self.groups.iter().map(TargetGroup::handle).collect();
        let groups: HashMap<TargetGroupId, TargetGroup> =
            self.groups.into_iter().map(|group| (group.id.clone(), group)).collect();

        info!(
            gateway = %self.id,
            scope = %self.scope,
            address = %address.dns_name,
            domain = %domain.domain_name(),
            target_groups = target_groups.len(),
            gated = self.identity.is_some(),
            "gateway composed"
        );

        Ok(BuiltGateway {
            gateway: Gateway {
                id: self.id,
                scope: self.scope,
                address,
                redirect,
                secure,
                domain: bound,
                identity: self.identity,
                groups,
            },
            target_groups,
        })
    }

    fn check_listeners(&self) -> Result<()> {
        if self.listeners.http_port == self.listeners.https_port {
            return Err(ConfigurationError::InvalidListener {
                reason: format!(
                    "redirect and secure listeners cannot share port {}",
                    self.listeners.http_port
                ),
            }
            .into());
        }
        Ok(())
    }

    fn check_auth_wiring(&self) -> Result<()> {
        let mut gated: Vec<&Rule> =
            self.rules.iter().filter(|rule| rule.action.is_gated()).collect();
        gated.sort_by_key(|rule| rule.priority);

        match (&self.identity, gated.as_slice()) {
            (None, []) => Ok(()),
            (None, [rule, ..]) => {
                Err(ConfigurationError::OrphanAuthProvider { priority: rule.priority }.into())
            }
            (Some(identity), []) => Err(ConfigurationError::NoAuthRuleDefined {
                provider: identity.directory_name.clone(),
            }
            .into()),
            (Some(identity), [rule]) => self.check_gated_provider(identity, rule),
            (Some(_), [first, second, ..]) => Err(ConfigurationError::MultipleAuthRules {
                first: first.priority,
                second: second.priority,
            }
            .into()),
        }
    }

    fn check_gated_provider(&self, identity: &IdentityProvider, rule: &Rule) -> Result<()> {
        if let RuleAction::Gated { provider, .. } = &rule.action {
            if provider.id() != &identity.id {
                return Err(ReferenceError::UnknownIdentityProvider {
                    provider: provider.directory_name().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// A composed gateway plus the handles for external attachment.
#[derive(Debug)]
pub struct BuiltGateway {
    /// The gateway itself
    pub gateway: Gateway,

    /// Handles to every target group created by the build, for the
    /// compute collaborator to attach endpoints to
    pub target_groups: Vec<TargetGroupHandle>,
}

/// The composed public entry point.
///
/// Exclusively owns its two listeners and every target group it
/// created; references (not owns) the identity provider.
#[derive(Debug, Clone, Serialize)]
pub struct Gateway {
    /// Unique gateway id
    pub id: GatewayId,

    /// Naming scope the topology derives from
    pub scope: Scope,

    /// Allocated public address
    pub address: PublicAddress,

    /// Plaintext redirect listener
    pub redirect: RedirectListener,

    /// Secure routing listener
    pub secure: SecureListener,

    /// Certificate and alias record backing the public name
    pub domain: BoundDomain,

    identity: Option<IdentityProvider>,
    groups: HashMap<TargetGroupId, TargetGroup>,
}

impl Gateway {
    /// The gateway's public address, for ingress configuration by
    /// collaborators
    pub fn public_address(&self) -> &PublicAddress {
        &self.address
    }

    /// The referenced identity provider, if any — exposes the client
    /// id/secret pair for services validating sessions independently
    pub fn identity(&self) -> Option<&IdentityProvider> {
        self.identity.as_ref()
    }

    /// All target groups owned by this gateway
    pub fn target_groups(&self) -> impl Iterator<Item = &TargetGroup> {
        self.groups.values()
    }

    /// Look up an owned target group by handle
    pub fn target_group(&self, handle: &TargetGroupHandle) -> Result<&TargetGroup> {
        self.groups.get(handle.id()).ok_or_else(|| {
            ReferenceError::UnknownTargetGroup {
                group: handle.name().to_string(),
                gateway: self.id.to_string(),
            }
            .into()
        })
    }

    /// Attach endpoints to an owned target group.
    ///
    /// Safe to call at any time after construction; attachment is
    /// additive and repeated attachments accumulate. Returns the number
    /// of endpoints added. Concurrent attachers must serialize
    /// externally — this takes `&mut self` on purpose.
    pub fn attach_endpoints(
        &mut self,
        handle: &TargetGroupHandle,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Result<usize> {
        let gateway = self.id.to_string();
        let group = self.groups.get_mut(handle.id()).ok_or(ReferenceError::UnknownTargetGroup {
            group: handle.name().to_string(),
            gateway,
        })?;

        let added = group.attach(endpoints);
        info!(group = %group.name, added, members = group.members().len(), "endpoints attached");
        Ok(added)
    }

    /// Resolve a request path through the secure listener to concrete
    /// backends.
    ///
    /// A matched group with no members yields an empty backend set (the
    /// 503-equivalent), never an error.
    pub fn route(&self, path: &str) -> Option<RouteOutcome<'_>> {
        let decision = self.secure.route(path)?;
        let group = self.groups.get(decision.group().id())?;
        Some(match decision {
            RouteDecision::Forward { .. } => RouteOutcome::Forward(BackendSelection { group }),
            RouteDecision::Authenticate { provider, .. } => RouteOutcome::Authenticate {
                provider,
                then: BackendSelection { group },
            },
        })
    }
}

/// Result of routing a request path to backends.
#[derive(Debug)]
pub enum RouteOutcome<'a> {
    /// Forward directly
    Forward(BackendSelection<'a>),

    /// Authenticate against the provider, then forward
    Authenticate {
        /// Provider gating the request
        provider: &'a ProviderHandle,
        /// Forwarding target after authentication
        then: BackendSelection<'a>,
    },
}

impl<'a> RouteOutcome<'a> {
    /// The selected backend pool, regardless of gating
    pub fn selection(&self) -> &BackendSelection<'a> {
        match self {
            RouteOutcome::Forward(selection) => selection,
            RouteOutcome::Authenticate { then, .. } => then,
        }
    }
}

/// The backend pool chosen for a matched request.
#[derive(Debug)]
pub struct BackendSelection<'a> {
    /// The chosen target group
    pub group: &'a TargetGroup,
}

impl BackendSelection<'_> {
    /// Routable endpoints; empty when nothing has been attached yet
    pub fn endpoints(&self) -> &[Endpoint] {
        self.group.members()
    }

    /// Whether any backend can take the request
    pub fn is_routable(&self) -> bool {
        self.group.has_members()
    }
}
