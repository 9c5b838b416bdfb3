//! Routing rule domain types
//!
//! A rule is one priority-ordered routing decision on the secure
//! listener: a set of path patterns and an action. Actions are a tagged
//! variant — plain forwarding, or forwarding wrapped in an
//! authentication gate — so "which rule is the auth rule" is structural
//! rather than a convention checked after the fact.

use crate::domain::identity::ProviderHandle;
use crate::domain::target_group::TargetGroupHandle;
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path matching pattern.
///
/// Patterns support an exact full-path match and a single trailing
/// wildcard. `/*` is the catch-all that matches every request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPattern {
    /// Exact path match (`/read` matches only `/read`)
    Exact(String),

    /// Trailing-wildcard match; the stored prefix ends with `/`
    /// (`/api/*` matches `/api/` and `/api/users`, not `/api`)
    Wildcard { prefix: String },
}

impl PathPattern {
    /// Parse a pattern string.
    ///
    /// Accepted forms: `/exact/path` and `/prefix/*`. The wildcard must
    /// be the final character and the only `*` in the pattern.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidPathPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if !raw.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        match raw.match_indices('*').count() {
            0 => Ok(PathPattern::Exact(raw.to_string())),
            1 if raw.ends_with('*') => {
                let prefix = &raw[..raw.len() - 1];
                if !prefix.ends_with('/') {
                    return Err(invalid("wildcard must follow a '/'"));
                }
                Ok(PathPattern::Wildcard { prefix: prefix.to_string() })
            }
            _ => Err(invalid("a single trailing wildcard is the only '*' allowed")),
        }
    }

    /// Check whether this pattern matches a request path
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(pattern) => path == pattern,
            PathPattern::Wildcard { prefix } => path.starts_with(prefix.as_str()),
        }
    }

    /// Whether this pattern matches every request path (`/*`)
    pub fn is_catch_all(&self) -> bool {
        matches!(self, PathPattern::Wildcard { prefix } if prefix == "/")
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(pattern) => write!(f, "{}", pattern),
            PathPattern::Wildcard { prefix } => write!(f, "{}*", prefix),
        }
    }
}

/// What happens to a request matched by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RuleAction {
    /// Forward to a target group
    Forward {
        /// Group to balance matched traffic across
        group: TargetGroupHandle,
    },

    /// Authenticate against an identity provider, then forward.
    ///
    /// Callers without a valid session are redirected to the provider's
    /// login endpoint and the original request resumes on success.
    Gated {
        /// Provider gating the rule
        provider: ProviderHandle,
        /// Group to forward to after authentication
        group: TargetGroupHandle,
    },
}

impl RuleAction {
    /// The forwarding target, regardless of gating
    pub fn group(&self) -> &TargetGroupHandle {
        match self {
            RuleAction::Forward { group } | RuleAction::Gated { group, .. } => group,
        }
    }

    /// Whether this action is authentication-gated
    pub fn is_gated(&self) -> bool {
        matches!(self, RuleAction::Gated { .. })
    }
}

/// One path-matching, priority-ordered routing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Evaluation priority; lower values evaluate first, must be
    /// positive and unique within a listener
    pub priority: u32,

    /// Path patterns; an empty set means the rule is path-unconstrained
    /// and serves as the listener default
    pub patterns: Vec<PathPattern>,

    /// Action taken for matched requests
    pub action: RuleAction,
}

impl Rule {
    /// Create a forwarding rule
    pub fn forward(priority: u32, patterns: Vec<PathPattern>, group: TargetGroupHandle) -> Self {
        Self { priority, patterns, action: RuleAction::Forward { group } }
    }

    /// Create an authentication-gated forwarding rule
    pub fn gated(
        priority: u32,
        patterns: Vec<PathPattern>,
        provider: ProviderHandle,
        group: TargetGroupHandle,
    ) -> Self {
        Self { priority, patterns, action: RuleAction::Gated { provider, group } }
    }

    /// Create a path-unconstrained default rule
    pub fn default_forward(priority: u32, group: TargetGroupHandle) -> Self {
        Self::forward(priority, Vec::new(), group)
    }

    /// Whether the rule carries no path constraint
    pub fn is_unconstrained(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether the rule matches every request path, either because it is
    /// unconstrained or because one of its patterns is `/*`
    pub fn is_catch_all(&self) -> bool {
        self.is_unconstrained() || self.patterns.iter().any(PathPattern::is_catch_all)
    }

    /// Check whether this rule matches a request path
    pub fn matches(&self, path: &str) -> bool {
        self.is_unconstrained() || self.patterns.iter().any(|p| p.matches(path))
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> String {
        format!("priority {} -> {}", self.priority, self.action.group().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::GatewayId;
    use crate::domain::target_group::{TargetGroup, TargetProtocol};

    fn handle(name: &str) -> TargetGroupHandle {
        TargetGroup::new(GatewayId::new(), name, TargetProtocol::Http, 8080).handle()
    }

    #[test]
    fn exact_pattern_matches_only_itself() {
        let pattern = PathPattern::parse("/read").unwrap();
        assert!(pattern.matches("/read"));
        assert!(!pattern.matches("/read/1"));
        assert!(!pattern.matches("/"));
    }

    #[test]
    fn wildcard_pattern_matches_subtree() {
        let pattern = PathPattern::parse("/api/*").unwrap();
        assert!(pattern.matches("/api/"));
        assert!(pattern.matches("/api/users"));
        assert!(!pattern.matches("/api"));
        assert!(!pattern.matches("/app/users"));
    }

    #[test]
    fn slash_star_is_the_catch_all() {
        let pattern = PathPattern::parse("/*").unwrap();
        assert!(pattern.is_catch_all());
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
        assert!(!PathPattern::parse("/api/*").unwrap().is_catch_all());
    }

    #[test]
    fn pattern_rejects_missing_leading_slash() {
        assert!(PathPattern::parse("read").is_err());
        assert!(PathPattern::parse("").is_err());
    }

    #[test]
    fn pattern_rejects_interior_wildcards() {
        assert!(PathPattern::parse("/api/*/users").is_err());
        assert!(PathPattern::parse("/a*/b*").is_err());
        assert!(PathPattern::parse("/api*").is_err());
    }

    #[test]
    fn pattern_display_roundtrips() {
        for raw in ["/read", "/api/*", "/*"] {
            assert_eq!(PathPattern::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn unconstrained_rule_matches_everything() {
        let rule = Rule::default_forward(99, handle("tg-frontend"));
        assert!(rule.is_unconstrained());
        assert!(rule.is_catch_all());
        assert!(rule.matches("/"));
        assert!(rule.matches("/deeply/nested/path"));
    }

    #[test]
    fn catch_all_via_pattern() {
        let rule =
            Rule::forward(99, vec![PathPattern::parse("/*").unwrap()], handle("tg-frontend"));
        assert!(!rule.is_unconstrained());
        assert!(rule.is_catch_all());
    }

    #[test]
    fn action_group_is_reachable_through_gate() {
        let group = handle("tg-frontend");
        let provider = ProviderHandle::for_tests("prod-dir-users");
        let rule = Rule::gated(2, vec![PathPattern::parse("/").unwrap()], provider, group.clone());

        assert!(rule.action.is_gated());
        assert_eq!(rule.action.group(), &group);
    }

    #[test]
    fn rule_label_names_priority_and_target() {
        let rule = Rule::forward(1, vec![PathPattern::parse("/read").unwrap()], handle("tg-api"));
        let label = rule.label();
        assert!(label.contains("priority 1"));
        assert!(label.contains("tg-api"));
    }
}
