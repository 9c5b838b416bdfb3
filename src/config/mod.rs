//! # Configuration Management
//!
//! Composer settings: certificate issuance timing, listener ports,
//! password policy for provisioned directories, and logging. Settings are
//! environment-driven with sensible defaults; nothing here describes the
//! topology itself (that is the builder's input).

pub mod settings;

pub use settings::{
    CertificateSettings, ComposerConfig, ListenerSettings, LogSettings, PasswordPolicyConfig,
};
