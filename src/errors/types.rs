//! # Error Types
//!
//! Error taxonomy for the gateway composer using `thiserror`.

/// Custom result type for composer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the gateway composer.
///
/// The three domain groups map to distinct phases of a build:
/// configuration errors abort before any side effect, provisioning errors
/// abort an in-flight external step, and reference errors flag resources
/// the composing gateway does not own.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Topology errors detected during pure pre-flight validation
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Failures of long-running external steps (certificate issuance,
    /// directory provisioning)
    #[error("provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    /// Cross-resource references to resources not owned by the composing
    /// gateway
    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// Input validation errors (malformed names, ports, URLs)
    #[error("validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Composer settings errors (environment loading, cross-field checks)
    #[error("settings error: {message}")]
    Settings { message: String },
}

impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a settings error
    pub fn settings<S: Into<String>>(message: S) -> Self {
        Self::Settings { message: message.into() }
    }

    /// Whether this error was produced by pre-flight validation, i.e.
    /// before any external resource was created
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::Reference(_) | Error::Validation { .. }
        )
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(message)
    }
}

/// Topology errors caught during pure pre-flight validation.
///
/// None of these may surface after an external resource has been created;
/// the builder validates the complete rule set and auth wiring before it
/// allocates anything.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two rules on the same listener share a priority value
    #[error("rules '{first}' and '{second}' both use priority {priority}")]
    ConflictingPriority { priority: u32, first: String, second: String },

    /// Rule priorities must be positive
    #[error("rule '{rule}' uses priority 0; priorities start at 1")]
    InvalidPriority { rule: String },

    /// More than one rule is a path-unconstrained catch-all
    #[error("both priority {first} and priority {second} are default (catch-all) rules")]
    DuplicateDefaultRule { first: u32, second: u32 },

    /// No catch-all rule exists; every listener needs exactly one
    #[error("rule set has no default (catch-all) rule")]
    MissingDefaultRule,

    /// An identity provider was supplied but no rule is gated by it
    #[error("identity provider '{provider}' supplied but no rule is authentication-gated")]
    NoAuthRuleDefined { provider: String },

    /// A gated rule exists but no identity provider was supplied
    #[error("rule at priority {priority} is authentication-gated but no identity provider was supplied")]
    OrphanAuthProvider { priority: u32 },

    /// At most one gated rule is permitted per listener
    #[error("rules at priorities {first} and {second} are both authentication-gated; only one gated rule is permitted")]
    MultipleAuthRules { first: u32, second: u32 },

    /// Path pattern could not be parsed
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPathPattern { pattern: String, reason: String },

    /// Scope segments carry resource-name constraints
    #[error("invalid scope segment '{segment}': segments are lowercase alphanumeric with interior hyphens, at most 32 characters")]
    InvalidScopeSegment { segment: String },

    /// The network descriptor exposes no subnets to place the gateway in
    #[error("network '{network}' exposes no subnets")]
    NoSubnets { network: String },

    /// Listener port conflicts or invalid port numbers
    #[error("invalid listener configuration: {reason}")]
    InvalidListener { reason: String },
}

/// Failures of the long-running external steps.
///
/// These abort the in-flight build, but resources issued by a prior run
/// (for example an already validated certificate) are reused on retry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    /// DNS validation did not complete within the configured timeout
    #[error("certificate validation for '{domain}' timed out after {waited_ms}ms")]
    ValidationTimeout { domain: String, waited_ms: u64 },

    /// The certificate authority reported a terminal failure
    #[error("certificate validation for '{domain}' failed: {reason}")]
    CertificateFailed { domain: String, reason: String },

    /// A secure listener may only bind a certificate in the Issued state
    #[error("certificate for '{domain}' is not validated (status: {status})")]
    CertificateNotValidated { domain: String, status: String },

    /// The authorization domain prefix is already taken in the
    /// surrounding environment
    #[error("authorization domain prefix '{prefix}' is already taken")]
    PrefixCollision { prefix: String },
}

/// Cross-resource reference errors.
///
/// Rules hold typed handles minted by the builder that owns the resource,
/// so these fire when a handle from a different gateway (or a foreign
/// provider) is wired in.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A rule or attachment references a target group not owned by this
    /// gateway
    #[error("target group '{group}' was not created by gateway '{gateway}'")]
    UnknownTargetGroup { group: String, gateway: String },

    /// A gated rule references a provider other than the one supplied to
    /// the builder
    #[error("gated rule references identity provider '{provider}', which was not supplied to this gateway")]
    UnknownIdentityProvider { provider: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_preflight() {
        let error: Error = ConfigurationError::MissingDefaultRule.into();
        assert!(error.is_preflight());
        assert!(matches!(error, Error::Configuration(_)));
    }

    #[test]
    fn provisioning_errors_are_not_preflight() {
        let error: Error = ProvisioningError::ValidationTimeout {
            domain: "example.com".into(),
            waited_ms: 300_000,
        }
        .into();
        assert!(!error.is_preflight());
    }

    #[test]
    fn reference_errors_are_preflight() {
        let error: Error = ReferenceError::UnknownTargetGroup {
            group: "prod-tg-api".into(),
            gateway: "prod-gw".into(),
        }
        .into();
        assert!(error.is_preflight());
    }

    #[test]
    fn conflicting_priority_message_names_both_rules() {
        let error = ConfigurationError::ConflictingPriority {
            priority: 7,
            first: "frontend".into(),
            second: "backend".into(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("frontend"));
        assert!(rendered.contains("backend"));
        assert!(rendered.contains('7'));
    }

    #[test]
    fn validation_error_with_field() {
        let error = Error::validation_field("must not be empty", "domain_name");
        if let Error::Validation { field, .. } = error {
            assert_eq!(field.as_deref(), Some("domain_name"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn prefix_collision_display() {
        let error = ProvisioningError::PrefixCollision { prefix: "prod-auth-login".into() };
        assert_eq!(
            error.to_string(),
            "authorization domain prefix 'prod-auth-login' is already taken"
        );
    }
}
