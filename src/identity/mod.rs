//! Identity provider provisioning
//!
//! Builds the hosted user directory, its confidential client, and the
//! globally-unique authorization domain prefix a gated rule redirects
//! to. The surrounding environment is reached through the
//! [`DirectoryService`] seam; prefix reservation can fail there with
//! `PrefixCollision`, which is a real external failure and never
//! assumed away.

use crate::config::PasswordPolicyConfig;
use crate::domain::id::ProviderId;
use crate::domain::identity::{
    mandatory_callback_urls, ClientCredentials, DirectoryOptions, IdentityProvider,
    PasswordPolicy, SecretRef,
};
use crate::domain::scope::Scope;
use crate::errors::{Error, ProvisioningError, Result};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::info;
use url::Url;

/// Seam to the hosted directory environment.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Reserve a globally-unique authorization domain prefix.
    ///
    /// Fails with `PrefixCollision` when the prefix is already taken in
    /// the surrounding environment.
    async fn reserve_domain_prefix(&self, prefix: &str) -> Result<()>;

    /// Create the user directory with the given options
    async fn create_directory(&self, name: &str, options: &DirectoryOptions) -> Result<()>;
}

/// In-memory directory environment for tests and local development.
#[derive(Default)]
pub struct InMemoryDirectory {
    prefixes: Mutex<HashSet<String>>,
    directories: Mutex<Vec<(String, DirectoryOptions)>>,
}

impl InMemoryDirectory {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a prefix as already taken (drives collision tests)
    pub fn preclaim_prefix(&self, prefix: impl Into<String>) {
        self.prefixes.lock().expect("prefix lock").insert(prefix.into());
    }

    /// Directories created so far, with their options
    pub fn directories(&self) -> Vec<(String, DirectoryOptions)> {
        self.directories.lock().expect("directory lock").clone()
    }
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    async fn reserve_domain_prefix(&self, prefix: &str) -> Result<()> {
        let mut prefixes = self.prefixes.lock().expect("prefix lock");
        if !prefixes.insert(prefix.to_string()) {
            return Err(ProvisioningError::PrefixCollision { prefix: prefix.to_string() }.into());
        }
        Ok(())
    }

    async fn create_directory(&self, name: &str, options: &DirectoryOptions) -> Result<()> {
        self.directories
            .lock()
            .expect("directory lock")
            .push((name.to_string(), options.clone()));
        Ok(())
    }
}

/// Provisions identity providers against a directory environment.
pub struct IdentityProvisioner {
    directory: Arc<dyn DirectoryService>,
    password_policy: PasswordPolicyConfig,
}

impl IdentityProvisioner {
    /// Create a provisioner using the configured password policy
    pub fn new(directory: Arc<dyn DirectoryService>, password_policy: PasswordPolicyConfig) -> Self {
        Self { directory, password_policy }
    }

    /// Provision a directory + confidential client + login domain prefix.
    ///
    /// The two mandatory callback URLs are derived from `public_origin`:
    /// the origin itself and its OAuth callback path. The origin must be
    /// HTTPS — interactive login never redirects back over plaintext.
    pub async fn provision(
        &self,
        scope: &Scope,
        name: &str,
        public_origin: &Url,
    ) -> Result<IdentityProvider> {
        if public_origin.scheme() != "https" {
            return Err(Error::validation_field(
                "public origin must be an https URL",
                "public_origin",
            ));
        }

        let directory_name = scope.qualify("dir", name);
        let domain_prefix = scope.qualify("auth", name);
        let callback_urls = mandatory_callback_urls(public_origin)
            .map_err(|e| Error::validation_field(e.to_string(), "public_origin"))?;

        // Reserve the prefix before creating anything else: the prefix
        // is the only part of the provider the environment can refuse.
        self.directory.reserve_domain_prefix(&domain_prefix).await?;

        let options = DirectoryOptions {
            self_sign_up: true,
            email_sign_in: true,
            auto_verify_email: true,
            password_policy: PasswordPolicy::from(&self.password_policy),
        };
        self.directory.create_directory(&directory_name, &options).await?;

        let provider = IdentityProvider {
            id: ProviderId::new(),
            directory_name: directory_name.clone(),
            credentials: ClientCredentials {
                client_id: generate_client_id(),
                client_secret: SecretRef::new(scope.qualify("secret", name)),
            },
            domain_prefix,
            callback_urls,
            authorization_code_grant: true,
        };

        info!(
            directory = %provider.directory_name,
            prefix = %provider.domain_prefix,
            callbacks = provider.callback_urls.len(),
            "identity provider provisioned"
        );

        Ok(provider)
    }
}

/// Opaque lowercase-alphanumeric client id, 26 characters
fn generate_client_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(26)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    fn provisioner(directory: Arc<InMemoryDirectory>) -> IdentityProvisioner {
        IdentityProvisioner::new(directory, PasswordPolicyConfig::default())
    }

    fn scope() -> Scope {
        Scope::root("prod").unwrap()
    }

    fn origin() -> Url {
        Url::parse("https://app.example.com").unwrap()
    }

    #[tokio::test]
    async fn provision_builds_directory_client_and_prefix() {
        let directory = Arc::new(InMemoryDirectory::new());
        let provider =
            provisioner(directory.clone()).provision(&scope(), "users", &origin()).await.unwrap();

        assert_eq!(provider.directory_name, "prod-dir-users");
        assert_eq!(provider.domain_prefix, "prod-auth-users");
        assert_eq!(provider.credentials.client_id.len(), 26);
        assert_eq!(provider.credentials.client_secret.name(), "prod-secret-users");
        assert!(provider.authorization_code_grant);
        assert_eq!(directory.directories().len(), 1);
    }

    #[tokio::test]
    async fn callback_urls_are_derived_from_origin() {
        let directory = Arc::new(InMemoryDirectory::new());
        let provider =
            provisioner(directory).provision(&scope(), "users", &origin()).await.unwrap();

        let callbacks: Vec<&str> =
            provider.callback_urls.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            callbacks,
            vec!["https://app.example.com/", "https://app.example.com/oauth2/idpresponse"]
        );
    }

    #[tokio::test]
    async fn prefix_collision_is_an_external_failure() {
        let directory = Arc::new(InMemoryDirectory::new());
        directory.preclaim_prefix("prod-auth-users");

        let result = provisioner(directory.clone()).provision(&scope(), "users", &origin()).await;
        assert!(matches!(
            result,
            Err(Error::Provisioning(ProvisioningError::PrefixCollision { .. }))
        ));
        // Nothing else may be created when the prefix is refused.
        assert!(directory.directories().is_empty());
    }

    #[tokio::test]
    async fn plaintext_origin_rejected() {
        let directory = Arc::new(InMemoryDirectory::new());
        let origin = Url::parse("http://app.example.com").unwrap();
        let result = provisioner(directory).provision(&scope(), "users", &origin).await;

        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn password_policy_flows_into_directory_options() {
        let directory = Arc::new(InMemoryDirectory::new());
        let policy = PasswordPolicyConfig { min_length: 14, ..Default::default() };
        let provisioner = IdentityProvisioner::new(directory.clone(), policy);

        provisioner.provision(&scope(), "users", &origin()).await.unwrap();

        let (_, options) = directory.directories().pop().unwrap();
        assert_eq!(options.password_policy.min_length, 14);
        assert!(options.self_sign_up);
        assert!(options.email_sign_in);
        assert!(options.auto_verify_email);
    }

    #[test]
    fn client_ids_are_lowercase_alphanumeric() {
        let id = generate_client_id();
        assert_eq!(id.len(), 26);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
