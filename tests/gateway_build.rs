//! End-to-end gateway composition tests
//!
//! These drive the full pipeline against the in-memory certificate
//! authority, DNS provider, and directory service: pre-flight rejection
//! ordering, domain binding, gated routing, and post-build endpoint
//! attachment.

mod common;

use std::sync::Arc;

use gatewright::config::PasswordPolicyConfig;
use gatewright::dns::{InMemoryAuthority, InMemoryDns, IssuancePlan};
use gatewright::domain::{
    Endpoint, IdentityProvider, Network, PathPattern, Rule, TargetProtocol,
};
use gatewright::errors::{ConfigurationError, Error, ProvisioningError, ReferenceError};
use gatewright::gateway::{BuiltGateway, RouteOutcome};
use gatewright::identity::{IdentityProvisioner, InMemoryDirectory};
use tokio_test::assert_ok;
use tracing_test::traced_test;
use url::Url;

async fn provision_identity() -> IdentityProvider {
    let directory = Arc::new(InMemoryDirectory::new());
    let provisioner = IdentityProvisioner::new(directory, PasswordPolicyConfig::default());
    let origin = Url::parse("https://example.com").unwrap();
    provisioner.provision(&common::scope(), "users", &origin).await.unwrap()
}

fn pattern(raw: &str) -> PathPattern {
    PathPattern::parse(raw).unwrap()
}

/// The full topology from the product brief: an authenticated frontend
/// behind the catch-all, an unauthenticated read API that wins on
/// priority, and endpoints attached only after the build.
async fn build_product_topology(
    authority: Arc<InMemoryAuthority>,
    dns: Arc<InMemoryDns>,
) -> BuiltGateway {
    let identity = provision_identity().await;
    let mut builder = common::builder();

    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
    let backend = builder.target_group("backend", TargetProtocol::Http, 5000);

    let builder = builder
        .with_identity(identity.clone())
        .rule(Rule::gated(99, vec![pattern("/*")], identity.handle(), frontend))
        .rule(Rule::forward(1, vec![pattern("/read")], backend));

    builder.build(&common::binding(authority, dns)).await.unwrap()
}

#[tokio::test]
async fn full_build_routes_and_publishes() {
    let authority = Arc::new(InMemoryAuthority::issuing());
    let dns = Arc::new(InMemoryDns::new());
    let mut built = build_product_topology(authority, dns.clone()).await;

    assert_eq!(built.gateway.address.dns_name, "prod-gw.core.gateway.internal");
    assert_eq!(built.gateway.redirect.action.status_code, 301);
    assert_eq!(built.gateway.redirect.port, 80);
    assert_eq!(built.gateway.secure.port, 443);
    assert!(built.gateway.domain.certificate.is_issued());

    // The alias record points the apex at the gateway address.
    let records = dns.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].target, "prod-gw.core.gateway.internal");

    // Attach endpoints the way a compute collaborator would.
    let frontend = built.target_groups[0].clone();
    let backend = built.target_groups[1].clone();
    built
        .gateway
        .attach_endpoints(&frontend, vec![Endpoint::from_hostname("fe-1.internal", 4200)])
        .unwrap();
    built
        .gateway
        .attach_endpoints(&backend, vec![Endpoint::from_hostname("be-1.internal", 5000)])
        .unwrap();

    // /read wins on priority and is not gated.
    match built.gateway.route("/read").unwrap() {
        RouteOutcome::Forward(selection) => {
            assert_eq!(selection.group.name, "prod-tg-backend");
            assert_eq!(selection.endpoints().len(), 1);
        }
        other => panic!("expected plain forward, got {:?}", other),
    }

    // Everything else lands on the gated catch-all.
    match built.gateway.route("/dashboard").unwrap() {
        RouteOutcome::Authenticate { provider, then } => {
            assert_eq!(provider.directory_name(), "prod-dir-users");
            assert_eq!(then.group.name, "prod-tg-frontend");
        }
        other => panic!("expected authentication, got {:?}", other),
    }
}

#[traced_test]
#[tokio::test]
async fn composition_emits_a_structured_log() {
    let authority = Arc::new(InMemoryAuthority::issuing());
    let dns = Arc::new(InMemoryDns::new());
    build_product_topology(authority, dns).await;

    assert!(logs_contain("gateway composed"));
    assert!(logs_contain("routing table installed"));
}

#[tokio::test]
async fn attachment_is_additive_and_selection_reflects_it() {
    let authority = Arc::new(InMemoryAuthority::issuing());
    let dns = Arc::new(InMemoryDns::new());
    let mut built = build_product_topology(authority, dns).await;
    let backend = built.target_groups[1].clone();

    // Before any attachment the route still resolves, with no backends.
    let selection = match built.gateway.route("/read").unwrap() {
        RouteOutcome::Forward(selection) => selection,
        other => panic!("expected forward, got {:?}", other),
    };
    assert!(!selection.is_routable());
    assert!(selection.endpoints().is_empty());

    let first = assert_ok!(built
        .gateway
        .attach_endpoints(&backend, vec![Endpoint::from_hostname("be-1.internal", 5000)]));
    let second = assert_ok!(built.gateway.attach_endpoints(
        &backend,
        vec![
            Endpoint::from_hostname("be-1.internal", 5000),
            Endpoint::from_hostname("be-2.internal", 5000),
        ],
    ));

    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert_eq!(built.gateway.target_group(&backend).unwrap().members().len(), 2);
}

#[tokio::test]
async fn foreign_handle_attachment_rejected() {
    let authority = Arc::new(InMemoryAuthority::issuing());
    let dns = Arc::new(InMemoryDns::new());
    let mut built = build_product_topology(authority.clone(), dns.clone()).await;

    let mut other_builder = common::builder();
    let foreign = other_builder.target_group("backend", TargetProtocol::Http, 5000);

    let result = built
        .gateway
        .attach_endpoints(&foreign, vec![Endpoint::from_hostname("be-1.internal", 5000)]);
    assert!(matches!(
        result,
        Err(Error::Reference(ReferenceError::UnknownTargetGroup { .. }))
    ));
}

#[tokio::test]
async fn identity_without_gated_rule_rejected() {
    let identity = provision_identity().await;
    let mut builder = common::builder();
    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);

    let builder = builder
        .with_identity(identity)
        .rule(Rule::forward(1, vec![pattern("/*")], frontend));

    let authority = Arc::new(InMemoryAuthority::issuing());
    let result = builder
        .build(&common::binding(authority.clone(), Arc::new(InMemoryDns::new())))
        .await;

    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::NoAuthRuleDefined { .. }))
    ));
    // Pre-flight means nothing was requested from the authority.
    assert_eq!(authority.order_count(), 0);
}

#[tokio::test]
async fn two_gated_rules_rejected() {
    let identity = provision_identity().await;
    let mut builder = common::builder();
    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
    let admin = builder.target_group("admin", TargetProtocol::Http, 9000);

    let builder = builder
        .with_identity(identity.clone())
        .rule(Rule::gated(10, vec![pattern("/*")], identity.handle(), frontend))
        .rule(Rule::gated(20, vec![pattern("/admin/*")], identity.handle(), admin));

    let result = builder
        .build(&common::binding(
            Arc::new(InMemoryAuthority::issuing()),
            Arc::new(InMemoryDns::new()),
        ))
        .await;

    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::MultipleAuthRules {
            first: 10,
            second: 20,
        }))
    ));
}

#[tokio::test]
async fn gated_rule_must_reference_the_supplied_provider() {
    let supplied = provision_identity().await;

    // A second provider from a different scope, wired into the rule.
    let directory = Arc::new(InMemoryDirectory::new());
    let provisioner = IdentityProvisioner::new(directory, PasswordPolicyConfig::default());
    let origin = Url::parse("https://other.example.com").unwrap();
    let stranger = provisioner
        .provision(&gatewright::domain::Scope::root("staging").unwrap(), "users", &origin)
        .await
        .unwrap();

    let mut builder = common::builder();
    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
    let builder = builder
        .with_identity(supplied)
        .rule(Rule::gated(1, vec![pattern("/*")], stranger.handle(), frontend));

    let result = builder
        .build(&common::binding(
            Arc::new(InMemoryAuthority::issuing()),
            Arc::new(InMemoryDns::new()),
        ))
        .await;

    assert!(matches!(
        result,
        Err(Error::Reference(ReferenceError::UnknownIdentityProvider { .. }))
    ));
}

#[tokio::test]
async fn subnetless_network_fails_before_any_side_effect() {
    let mut builder = gatewright::gateway::GatewayBuilder::new(
        common::scope(),
        Network::new("empty", "10.0.0.0/16", vec![]),
    );
    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
    let builder = builder.rule(Rule::forward(1, vec![pattern("/*")], frontend));

    let authority = Arc::new(InMemoryAuthority::issuing());
    let dns = Arc::new(InMemoryDns::new());
    let result = builder.build(&common::binding(authority.clone(), dns.clone())).await;

    assert!(matches!(
        result,
        Err(Error::Configuration(ConfigurationError::NoSubnets { .. }))
    ));
    assert_eq!(authority.order_count(), 0);
    assert!(dns.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn validation_timeout_leaves_no_gateway_behind() {
    let mut builder = common::builder();
    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
    let builder = builder.rule(Rule::forward(1, vec![pattern("/*")], frontend));

    let dns = Arc::new(InMemoryDns::new());
    let result = builder
        .build(&common::binding(
            Arc::new(InMemoryAuthority::new(IssuancePlan::NeverComplete)),
            dns.clone(),
        ))
        .await;

    assert!(matches!(
        result,
        Err(Error::Provisioning(ProvisioningError::ValidationTimeout { .. }))
    ));
    // The alias record is only published after issuance.
    assert!(dns.records().is_empty());
}

#[tokio::test(start_paused = true)]
async fn issuance_failure_reason_is_preserved() {
    let mut builder = common::builder();
    let frontend = builder.target_group("frontend", TargetProtocol::Http, 4200);
    let builder = builder.rule(Rule::forward(1, vec![pattern("/*")], frontend));

    let result = builder
        .build(&common::binding(
            Arc::new(InMemoryAuthority::new(IssuancePlan::FailAfterPolls {
                polls: 1,
                reason: "CAA record forbids issuance".into(),
            })),
            Arc::new(InMemoryDns::new()),
        ))
        .await;

    match result {
        Err(Error::Provisioning(ProvisioningError::CertificateFailed { reason, .. })) => {
            assert_eq!(reason, "CAA record forbids issuance");
        }
        other => panic!("expected certificate failure, got {:?}", other),
    }
}
