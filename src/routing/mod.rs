//! Rule-priority routing engine
//!
//! Installs an ordered rule set onto a listener after a pure pre-flight
//! pass, and resolves request paths against it. Nothing here touches an
//! external resource; every failure below is detectable before any side
//! effect occurs.
//!
//! Evaluation semantics: rules are evaluated in strictly ascending
//! priority order (lower value first); the first rule whose pattern set
//! matches the request path wins; the mandatory catch-all rule serves as
//! the fallback when nothing else matches.

use crate::domain::id::GatewayId;
use crate::domain::identity::ProviderHandle;
use crate::domain::rule::{Rule, RuleAction};
use crate::domain::target_group::TargetGroupHandle;
use crate::errors::{ConfigurationError, ReferenceError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An installed, validated, priority-ordered rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    rules: Vec<Rule>,
}

impl RoutingTable {
    /// Validate and install a rule set for the gateway `owner`.
    ///
    /// Pre-flight checks, in order:
    /// 1. every priority is positive;
    /// 2. no two rules share a priority (`ConflictingPriority`);
    /// 3. at most one catch-all rule (`DuplicateDefaultRule`) and at
    ///    least one (`MissingDefaultRule`);
    /// 4. every rule forwards to a target group minted by `owner`
    ///    (`UnknownTargetGroup`).
    pub fn install(rules: Vec<Rule>, owner: &GatewayId) -> Result<Self> {
        let mut rules = rules;
        rules.sort_by_key(|rule| rule.priority);

        for rule in &rules {
            if rule.priority == 0 {
                return Err(ConfigurationError::InvalidPriority { rule: rule.label() }.into());
            }
        }

        for pair in rules.windows(2) {
            if pair[0].priority == pair[1].priority {
                return Err(ConfigurationError::ConflictingPriority {
                    priority: pair[0].priority,
                    first: pair[0].action.group().name().to_string(),
                    second: pair[1].action.group().name().to_string(),
                }
                .into());
            }
        }

        let mut catch_alls = rules.iter().filter(|rule| rule.is_catch_all());
        let first_catch_all = catch_alls.next();
        if let (Some(first), Some(second)) = (first_catch_all, catch_alls.next()) {
            return Err(ConfigurationError::DuplicateDefaultRule {
                first: first.priority,
                second: second.priority,
            }
            .into());
        }
        if first_catch_all.is_none() {
            return Err(ConfigurationError::MissingDefaultRule.into());
        }

        for rule in &rules {
            let group = rule.action.group();
            if group.gateway() != owner {
                return Err(ReferenceError::UnknownTargetGroup {
                    group: group.name().to_string(),
                    gateway: owner.to_string(),
                }
                .into());
            }
        }

        debug!(rules = rules.len(), gateway = %owner, "routing table installed");
        Ok(Self { rules })
    }

    /// Installed rules in ascending priority order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Resolve a request path to the winning rule's decision.
    ///
    /// Returns `None` only for tables whose catch-all was somehow
    /// removed; tables produced by [`RoutingTable::install`] always
    /// resolve.
    pub fn resolve(&self, path: &str) -> Option<RouteDecision<'_>> {
        self.rules.iter().find(|rule| rule.matches(path)).map(|rule| match &rule.action {
            RuleAction::Forward { group } => RouteDecision::Forward { rule, group },
            RuleAction::Gated { provider, group } => {
                RouteDecision::Authenticate { rule, provider, group }
            }
        })
    }
}

/// Outcome of resolving a request path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision<'a> {
    /// Forward to the rule's target group
    Forward {
        /// Winning rule
        rule: &'a Rule,
        /// Forwarding target
        group: &'a TargetGroupHandle,
    },

    /// Authenticate first, then forward.
    ///
    /// Callers with no valid session are redirected to the provider's
    /// login endpoint; the original request resumes on success with the
    /// same forwarding semantics as a plain forward.
    Authenticate {
        /// Winning rule
        rule: &'a Rule,
        /// Provider gating the rule
        provider: &'a ProviderHandle,
        /// Forwarding target after authentication
        group: &'a TargetGroupHandle,
    },
}

impl<'a> RouteDecision<'a> {
    /// The forwarding target, regardless of gating
    pub fn group(&self) -> &'a TargetGroupHandle {
        match self {
            RouteDecision::Forward { group, .. } | RouteDecision::Authenticate { group, .. } => {
                group
            }
        }
    }

    /// The winning rule
    pub fn rule(&self) -> &'a Rule {
        match self {
            RouteDecision::Forward { rule, .. } | RouteDecision::Authenticate { rule, .. } => rule,
        }
    }
}
