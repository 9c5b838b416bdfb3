//! # Gatewright
//!
//! Gatewright composes public application-delivery gateways: an HTTPS
//! entry point with a DNS-validated certificate, an HTTP-to-HTTPS
//! redirect, priority-ordered path routing into named backend pools,
//! and an optional login gate in front of one route.
//!
//! ## Architecture
//!
//! The composition pipeline is deliberately front-loaded:
//!
//! ```text
//! GatewayBuilder → pre-flight checks → DomainBinding → Gateway
//!       ↓                 ↓                   ↓
//!  Target groups    Routing table     Certificate + alias
//! ```
//!
//! Every configuration error (priorities, auth wiring, dangling
//! handles) is caught before the first external side effect; the only
//! blocking step is waiting for certificate DNS validation.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatewright::config::ComposerConfig;
//! use gatewright::dns::{DomainBinding, InMemoryAuthority, InMemoryDns};
//! use gatewright::domain::{Network, PathPattern, Rule, Scope, Subnet, TargetProtocol, Zone};
//! use gatewright::gateway::GatewayBuilder;
//! use gatewright::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ComposerConfig::from_env()?;
//!     let scope = Scope::root("prod")?;
//!     let network = Network::new(
//!         "core",
//!         "10.0.0.0/16",
//!         vec![Subnet { name: "public-a".into(), cidr: "10.0.1.0/24".into(), public: true }],
//!     );
//!
//!     let mut builder = GatewayBuilder::new(scope, network);
//!     let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
//!     let builder = builder
//!         .rule(Rule::forward(99, vec![PathPattern::parse("/*")?], frontend));
//!
//!     let zone = Zone::new("Z123", "example.com");
//!     let domain = DomainBinding::new(
//!         zone,
//!         "example.com",
//!         Arc::new(InMemoryAuthority::issuing()),
//!         Arc::new(InMemoryDns::new()),
//!         config.certificate.clone(),
//!     );
//!
//!     let built = builder.build(&domain).await?;
//!     println!("gateway at {}", built.gateway.public_address().dns_name);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dns;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod identity;
pub mod observability;
pub mod routing;

// Re-export commonly used types and traits
pub use config::ComposerConfig;
pub use errors::{Error, Result};
pub use gateway::{BuiltGateway, Gateway, GatewayBuilder, RouteOutcome};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
