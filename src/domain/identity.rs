//! Identity provider domain types
//!
//! A provisioned identity provider is a hosted user directory paired 1:1
//! with a confidential application client, plus an externally reachable
//! authorization domain prefix used for interactive login. Client
//! secrets are never materialized here — only referenced by name into an
//! external secret store.

use crate::domain::id::ProviderId;
use serde::{Deserialize, Serialize};
use url::Url;

/// Path the provider redirects back to after interactive login
pub const OAUTH_CALLBACK_PATH: &str = "/oauth2/idpresponse";

/// Name-only reference into an external secret store.
///
/// Resolved to bytes at deploy time by a collaborator; the composer only
/// carries the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretRef {
    name: String,
}

impl SecretRef {
    /// Create a reference by store key
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The store key
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Confidential client credentials: a public id and a secret reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// Public client identifier
    pub client_id: String,

    /// Reference to the generated client secret
    pub client_secret: SecretRef,
}

/// Password policy applied when the directory is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length
    pub min_length: u32,

    /// Require at least one lowercase character
    pub require_lowercase: bool,

    /// Require at least one uppercase character
    pub require_uppercase: bool,

    /// Require at least one symbol character
    pub require_symbols: bool,

    /// Require at least one digit
    pub require_digits: bool,
}

impl From<&crate::config::PasswordPolicyConfig> for PasswordPolicy {
    fn from(config: &crate::config::PasswordPolicyConfig) -> Self {
        Self {
            min_length: config.min_length,
            require_lowercase: config.require_lowercase,
            require_uppercase: config.require_uppercase,
            require_symbols: config.require_symbols,
            require_digits: config.require_digits,
        }
    }
}

/// Directory creation options handed to the directory service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryOptions {
    /// Allow users to sign themselves up
    pub self_sign_up: bool,

    /// Accept email addresses as sign-in aliases
    pub email_sign_in: bool,

    /// Automatically verify email addresses
    pub auto_verify_email: bool,

    /// Password policy for directory users
    pub password_policy: PasswordPolicy,
}

/// A provisioned identity provider.
///
/// Independently owned; gateways reference it, they never own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProvider {
    /// Unique provider id
    pub id: ProviderId,

    /// Hosted user-directory name (1:1 with the client)
    pub directory_name: String,

    /// Confidential client paired with the directory
    pub credentials: ClientCredentials,

    /// Globally-unique authorization domain prefix for interactive login
    pub domain_prefix: String,

    /// Registered OAuth callback URLs; always includes the gateway's
    /// public HTTPS origin and its OAuth callback path
    pub callback_urls: Vec<Url>,

    /// Whether the authorization-code grant flow is enabled
    pub authorization_code_grant: bool,
}

impl IdentityProvider {
    /// Handle for referencing this provider from gated rules
    pub fn handle(&self) -> ProviderHandle {
        ProviderHandle { id: self.id.clone(), directory_name: self.directory_name.clone() }
    }
}

/// Typed reference to an identity provider for use inside rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderHandle {
    id: ProviderId,
    directory_name: String,
}

impl ProviderHandle {
    /// Id of the referenced provider
    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    /// Directory name of the referenced provider
    pub fn directory_name(&self) -> &str {
        &self.directory_name
    }

    #[cfg(test)]
    pub(crate) fn for_tests(directory_name: &str) -> Self {
        Self { id: ProviderId::new(), directory_name: directory_name.to_string() }
    }
}

/// Derive the two mandatory callback URLs from a public HTTPS origin.
pub fn mandatory_callback_urls(public_origin: &Url) -> Result<Vec<Url>, url::ParseError> {
    let callback = public_origin.join(OAUTH_CALLBACK_PATH)?;
    Ok(vec![public_origin.clone(), callback])
}
