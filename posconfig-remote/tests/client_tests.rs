use posconfig_remote::{
    FETCH_PATH, RemoteConfig, RemoteConfigClient, RemoteConfigService, RemoteError, SET_PATH,
};
use posconfig_types::{ConfigurationTree, ConnectionIdentity, ContextDescriptor, Scope};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> RemoteConfigClient {
    let config = RemoteConfig {
        base_url: server.uri(),
        request_timeout_secs: 2,
        ..RemoteConfig::default()
    };
    RemoteConfigClient::new(config).unwrap()
}

fn acme() -> ConnectionIdentity {
    ConnectionIdentity::new("Acme").unwrap()
}

fn tree(value: serde_json::Value) -> ConfigurationTree {
    ConfigurationTree::try_from(value).unwrap()
}

fn context() -> ContextDescriptor {
    ContextDescriptor::from_tree(&tree(json!({"deviceID": "dev-1"})), Some("cashier"))
}

// --- fetch-all ---

#[tokio::test]
async fn fetch_all_posts_tablet_and_parses_tree() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FETCH_PATH))
        .and(body_json(json!({"tablet": {"deviceID": "dev-1", "user": "cashier"}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "Acme Corp", "printers": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let fetched = client.fetch_all(&acme(), &context()).await.unwrap();
    assert_eq!(fetched, tree(json!({"name": "Acme Corp", "printers": []})));
}

#[tokio::test]
async fn fetch_all_non_2xx_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = setup(&server);
    let err = client.fetch_all(&acme(), &context()).await.unwrap_err();
    match err {
        RemoteError::Rejected { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_all_non_object_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let client = setup(&server);
    let err = client.fetch_all(&acme(), &context()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}

#[tokio::test]
async fn fetch_all_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = setup(&server);
    let err = client.fetch_all(&acme(), &context()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let server = MockServer::start().await;
    let client = setup(&server);
    drop(server);

    let err = client.fetch_all(&acme(), &context()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FETCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = setup(&server);
    let err = client.fetch_all(&acme(), &context()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}

// --- set ---

#[tokio::test]
async fn set_keys_puts_data_and_scope() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SET_PATH))
        .and(body_json(json!({
            "tablet": {"deviceID": "dev-1", "user": "cashier"},
            "data": {"name": "New Name"},
            "scope": "EMPRESA",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    client
        .set_keys(
            &acme(),
            &context(),
            &tree(json!({"name": "New Name"})),
            Some(Scope::Company),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn set_keys_omits_scope_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SET_PATH))
        .and(body_json(json!({
            "tablet": {"deviceID": "dev-1", "user": "cashier"},
            "data": {"a": 1, "b": 2},
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    client
        .set_keys(&acme(), &context(), &tree(json!({"a": 1, "b": 2})), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn set_keys_tolerates_non_json_ack() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let client = setup(&server);
    let result = client
        .set_keys(&acme(), &context(), &tree(json!({"a": 1})), None)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn set_keys_500_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(SET_PATH))
        .and(body_partial_json(json!({"data": {"name": "Bad Name"}})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = setup(&server);
    let err = client
        .set_keys(&acme(), &context(), &tree(json!({"name": "Bad Name"})), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

// --- base url ---

#[test]
fn base_url_substitutes_connection() {
    let config = RemoteConfig {
        base_url: "https://{connection}.pos.example.com/".into(),
        ..RemoteConfig::default()
    };
    assert_eq!(
        config.base_url_for(&acme()).unwrap(),
        "https://Acme.pos.example.com"
    );
}

#[test]
fn base_url_without_placeholder_is_shared() {
    let config = RemoteConfig {
        base_url: "http://10.0.0.5:8080".into(),
        ..RemoteConfig::default()
    };
    assert_eq!(config.base_url_for(&acme()).unwrap(), "http://10.0.0.5:8080");
}

#[test]
fn base_url_rejects_non_http_scheme() {
    let config = RemoteConfig {
        base_url: "ftp://files.example.com".into(),
        ..RemoteConfig::default()
    };
    assert!(matches!(config.base_url_for(&acme()), Err(RemoteError::Config(_))));
}

#[test]
fn base_url_rejects_garbage() {
    let config = RemoteConfig {
        base_url: "not a url".into(),
        ..RemoteConfig::default()
    };
    assert!(matches!(config.base_url_for(&acme()), Err(RemoteError::Config(_))));
}

#[test]
fn base_url_encodes_connection_in_path() {
    let config = RemoteConfig {
        base_url: "http://gateway.local/tenants/{connection}".into(),
        ..RemoteConfig::default()
    };
    let identity = ConnectionIdentity::new("Acme/Main?x=1").unwrap();
    assert_eq!(
        config.base_url_for(&identity).unwrap(),
        "http://gateway.local/tenants/Acme%2FMain%3Fx%3D1"
    );
}

#[test]
fn base_url_rejects_connection_that_is_not_a_host_name() {
    let config = RemoteConfig {
        base_url: "https://{connection}.pos.example.com".into(),
        ..RemoteConfig::default()
    };
    for raw in ["Acme Corp", "evil.com/x?", "a#b"] {
        let identity = ConnectionIdentity::new(raw).unwrap();
        assert!(
            matches!(config.base_url_for(&identity), Err(RemoteError::Config(_))),
            "{raw} should not resolve"
        );
    }
}

#[test]
fn default_config_values() {
    let config = RemoteConfig::default();
    assert_eq!(config.request_timeout_secs, 30);
    assert!(config.base_url.contains("{connection}"));
    assert!(config.user_agent.starts_with("posconfig/"));
}

#[test]
fn error_display() {
    let err = RemoteError::Rejected { status: 500, body: "boom".into() };
    assert_eq!(err.to_string(), "remote rejected request with status 500: boom");
    assert_eq!(RemoteError::Decode("x".into()).status(), None);
}
