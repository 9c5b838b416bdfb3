//! # Configuration Settings
//!
//! Defines the configuration structure for the gateway composer.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main composer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct ComposerConfig {
    /// Certificate issuance configuration
    #[validate(nested)]
    pub certificate: CertificateSettings,

    /// Listener port configuration
    #[validate(nested)]
    pub listeners: ListenerSettings,

    /// Password policy applied to provisioned user directories
    #[validate(nested)]
    pub password_policy: PasswordPolicyConfig,

    /// Logging configuration
    pub log: LogSettings,
}

impl ComposerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Cross-field validation beyond what the validator crate can express
    fn validate_custom(&self) -> Result<()> {
        if self.listeners.http_port == self.listeners.https_port {
            return Err(Error::validation(
                "plaintext and secure listener ports cannot be the same",
            ));
        }

        if self.certificate.poll_interval_ms as u128
            >= self.certificate.validation_timeout_secs as u128 * 1000
        {
            return Err(Error::validation(
                "certificate poll interval must be shorter than the validation timeout",
            ));
        }

        Ok(())
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            certificate: CertificateSettings::from_env()?,
            listeners: ListenerSettings::from_env()?,
            password_policy: PasswordPolicyConfig::from_env()?,
            log: LogSettings::from_env(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Certificate issuance configuration.
///
/// DNS validation is the one genuinely asynchronous step in a build; the
/// timeout bounds how long a build may block on it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CertificateSettings {
    /// Upper bound on DNS validation, in seconds
    #[validate(range(
        min = 1,
        max = 3600,
        message = "validation timeout must be between 1 second and 1 hour"
    ))]
    pub validation_timeout_secs: u64,

    /// Interval between validation status polls, in milliseconds
    #[validate(range(min = 10, message = "poll interval must be at least 10ms"))]
    pub poll_interval_ms: u64,
}

impl Default for CertificateSettings {
    fn default() -> Self {
        Self { validation_timeout_secs: 300, poll_interval_ms: 500 }
    }
}

impl CertificateSettings {
    /// Validation timeout as a Duration
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }

    /// Poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let validation_timeout_secs = parse_env(
            "GATEWRIGHT_CERT_VALIDATION_TIMEOUT_SECS",
            defaults.validation_timeout_secs,
        )?;
        let poll_interval_ms =
            parse_env("GATEWRIGHT_CERT_POLL_INTERVAL_MS", defaults.poll_interval_ms)?;

        Ok(Self { validation_timeout_secs, poll_interval_ms })
    }
}

/// Listener port configuration.
///
/// The composer always builds exactly two listeners: a plaintext one that
/// redirects, and a secure one that routes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListenerSettings {
    /// Plaintext (redirect) listener port
    #[validate(range(min = 1, message = "port must be nonzero"))]
    pub http_port: u16,

    /// Secure (routing) listener port
    #[validate(range(min = 1, message = "port must be nonzero"))]
    pub https_port: u16,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self { http_port: 80, https_port: 443 }
    }
}

impl ListenerSettings {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            http_port: parse_env("GATEWRIGHT_HTTP_PORT", defaults.http_port)?,
            https_port: parse_env("GATEWRIGHT_HTTPS_PORT", defaults.https_port)?,
        })
    }
}

/// Password policy for provisioned user directories.
///
/// Exposed as configuration rather than hardwired literals so policy
/// changes are independently testable.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordPolicyConfig {
    /// Minimum password length
    #[validate(range(min = 6, max = 128, message = "minimum length must be between 6 and 128"))]
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

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_lowercase: true,
            require_uppercase: true,
            require_symbols: true,
            require_digits: false,
        }
    }
}

impl PasswordPolicyConfig {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            min_length: parse_env("GATEWRIGHT_PASSWORD_MIN_LENGTH", defaults.min_length)?,
            require_lowercase: parse_env(
                "GATEWRIGHT_PASSWORD_REQUIRE_LOWERCASE",
                defaults.require_lowercase,
            )?,
            require_uppercase: parse_env(
                "GATEWRIGHT_PASSWORD_REQUIRE_UPPERCASE",
                defaults.require_uppercase,
            )?,
            require_symbols: parse_env(
                "GATEWRIGHT_PASSWORD_REQUIRE_SYMBOLS",
                defaults.require_symbols,
            )?,
            require_digits: parse_env(
                "GATEWRIGHT_PASSWORD_REQUIRE_DIGITS",
                defaults.require_digits,
            )?,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Log filter directive (tracing EnvFilter syntax)
    pub level: String,

    /// Emit JSON-formatted log lines
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LogSettings {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: std::env::var("GATEWRIGHT_LOG_LEVEL").unwrap_or(defaults.level),
            json: std::env::var("GATEWRIGHT_LOG_JSON")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.json),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::settings(format!("invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Serializes tests that mutate process environment variables.
    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn default_config_is_valid() {
        let config = ComposerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listeners.http_port, 80);
        assert_eq!(config.listeners.https_port, 443);
        assert_eq!(config.certificate.validation_timeout_secs, 300);
    }

    #[test]
    fn password_policy_defaults() {
        let policy = PasswordPolicyConfig::default();
        assert_eq!(policy.min_length, 8);
        assert!(policy.require_lowercase);
        assert!(policy.require_uppercase);
        assert!(policy.require_symbols);
        assert!(!policy.require_digits);
    }

    #[test]
    fn equal_listener_ports_rejected() {
        let config = ComposerConfig {
            listeners: ListenerSettings { http_port: 8080, https_port: 8080 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn poll_interval_must_undercut_timeout() {
        let config = ComposerConfig {
            certificate: CertificateSettings {
                validation_timeout_secs: 1,
                poll_interval_ms: 2_000,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn certificate_durations() {
        let settings = CertificateSettings { validation_timeout_secs: 2, poll_interval_ms: 50 };
        assert_eq!(settings.validation_timeout(), Duration::from_secs(2));
        assert_eq!(settings.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn env_overrides_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("GATEWRIGHT_HTTPS_PORT", "8443");
        let settings = ListenerSettings::from_env().unwrap();
        assert_eq!(settings.https_port, 8443);
        assert_eq!(settings.http_port, 80);
        std::env::remove_var("GATEWRIGHT_HTTPS_PORT");
    }

    #[test]
    fn invalid_env_value_is_a_settings_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("GATEWRIGHT_HTTP_PORT", "not-a-port");
        let result = ListenerSettings::from_env();
        assert!(matches!(result, Err(Error::Settings { .. })));
        std::env::remove_var("GATEWRIGHT_HTTP_PORT");
    }
}
