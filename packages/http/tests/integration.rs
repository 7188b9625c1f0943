use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use confentry_core::{
    make_config_entry, Backend, BackendError, ConfigEntry, ConfigEntryQuery, ConfigEntryRequest,
};
use confentry_http::{ConfigEndpoint, EndpointConfig, HttpRequest, HttpRpcBackend};

#[tokio::test]
async fn test_get_decodes_entries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/ConfigEntry.Get"))
        .and(body_partial_json(serde_json::json!({
            "Kind": "service-resolver",
            "Name": "web",
            "Datacenter": "dc1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Kind": "service-resolver",
            "Entries": [{
                "Kind": "service-resolver",
                "Name": "web",
                "ConnectTimeout": "15s",
                "CreateIndex": 4,
                "ModifyIndex": 7
            }],
            "Index": 7,
            "KnownLeader": true
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    let reply = tokio::task::spawn_blocking(move || {
        let backend = HttpRpcBackend::new(&uri).unwrap();
        backend
            .get(&ConfigEntryQuery::single("service-resolver", "web").with_datacenter("dc1"))
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(reply.query_meta.index, 7);
    let ConfigEntry::ServiceResolver(resolver) = &reply.entries[0] else {
        panic!("expected resolver, got {:?}", reply.entries[0]);
    };
    assert_eq!(resolver.connect_timeout.as_secs(), 15);
    assert_eq!(resolver.modify_index, 7);
}

#[tokio::test]
async fn test_apply_sends_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/ConfigEntry.Apply"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "Op": "upsert",
            "Token": "secret",
            "Entry": {"Kind": "proxy-defaults", "Name": "global"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let backend = HttpRpcBackend::new(&uri).unwrap();
        let entry = make_config_entry("proxy-defaults", "global").unwrap();
        backend.apply(&ConfigEntryRequest::upsert(entry).with_token("secret"))
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_forbidden_maps_to_permission_denied() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/ConfigEntry.Delete"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .mount(&server)
        .await;

    let uri = server.uri();

    let err = tokio::task::spawn_blocking(move || {
        let backend = HttpRpcBackend::new(&uri).unwrap();
        let entry = make_config_entry("service-defaults", "web").unwrap();
        backend.delete(&ConfigEntryRequest::delete(entry))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, BackendError::PermissionDenied));
}

#[tokio::test]
async fn test_server_error_body_is_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/ConfigEntry.List"))
        .respond_with(ResponseTemplate::new(500).set_body_string("No path to datacenter"))
        .mount(&server)
        .await;

    let uri = server.uri();

    let err = tokio::task::spawn_blocking(move || {
        let backend = HttpRpcBackend::new(&uri).unwrap();
        backend.list(&ConfigEntryQuery::list("service-defaults").with_datacenter("dc9"))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert_eq!(err.to_string(), "No path to datacenter");
}

#[tokio::test]
async fn test_endpoint_over_rpc_backend() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/ConfigEntry.List"))
        .and(body_partial_json(serde_json::json!({
            "Kind": "service-defaults",
            "Datacenter": "west",
            "QueryOptions": {"Token": "from-header", "AllowStale": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Kind": "service-defaults",
            "Entries": [
                {"Kind": "service-defaults", "Name": "api", "Protocol": "grpc"},
                {"Kind": "service-defaults", "Name": "web", "Protocol": "http"}
            ],
            "Index": 12,
            "KnownLeader": true
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    let response = tokio::task::spawn_blocking(move || {
        let endpoint = ConfigEndpoint::with_config(
            HttpRpcBackend::new(&uri).unwrap(),
            EndpointConfig::default().with_datacenter("west"),
        );
        endpoint.handle(
            &HttpRequest::get("/v1/config/service-defaults")
                .with_query("stale", "")
                .with_header("X-Config-Token", "from-header"),
        )
    })
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.header("X-Config-Index"), Some("12"));
    assert_eq!(response.body["Entries"][1]["Name"], "web");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on the discard port.
    let err = tokio::task::spawn_blocking(|| {
        let backend = HttpRpcBackend::new("http://127.0.0.1:9").unwrap();
        backend.get(&ConfigEntryQuery::single("service-defaults", "web"))
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)));
}
