use std::sync::Arc;

use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;
use wiremock::MockServer;

use revsync_cloudrun::{AccessTokenProvider, CloudRunClient, StaticTokenProvider};
use revsync_registry::RegistryClient;
use revsync_server::{AppConfig, AppState, Reconciler, build_app};

fn state_for(cloudrun: &MockServer, registry: &MockServer) -> AppState {
    let tokens: Arc<dyn AccessTokenProvider> = Arc::new(StaticTokenProvider::new("test-token"));
    let cloudrun = Arc::new(
        CloudRunClient::new(tokens).with_endpoint(&Url::parse(&cloudrun.uri()).unwrap()),
    );
    let registry = RegistryClient::new(
        Url::parse(&format!("{}/v2/gtm/tags/list", registry.uri())).unwrap(),
    );
    AppState {
        reconciler: Arc::new(Reconciler::new(
            cloudrun.clone(),
            cloudrun,
            registry,
            "gcr.io/cloud-tagging-10302018/gtm-cloud-image:stable",
        )),
    }
}

async fn start_server(state: AppState) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&AppConfig::default(), state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

#[tokio::test]
async fn health_endpoints_work() {
    let cloudrun = MockServer::start().await;
    let registry = MockServer::start().await;
    let (base, shutdown_tx, handle) = start_server(state_for(&cloudrun, &registry)).await;
    let client = reqwest::Client::new();

    // GET /
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "revsync");
    assert_eq!(body["status"], "ok");

    // GET /healthz
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // GET /readyz
    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    // shutdown
    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn missing_request_fields_are_rejected_without_outbound_calls() {
    let cloudrun = MockServer::start().await;
    let registry = MockServer::start().await;
    let (base, shutdown_tx, handle) = start_server(state_for(&cloudrun, &registry)).await;
    let client = reqwest::Client::new();

    let expected = json!({
        "success": "false",
        "message": "Wrong / Missing request body",
    });

    let incomplete_bodies = [
        json!({}),
        json!({"project_id": "p"}),
        json!({"project_id": "p", "region": "r"}),
        json!({"region": "r", "service_name": "s"}),
        json!({"project_id": "", "region": "r", "service_name": "s"}),
        json!({"project_id": "p", "region": "r", "service_name": ""}),
    ];

    for body in incomplete_bodies {
        let resp = client
            .post(format!("{base}/reconcile"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 500, "body: {body}");
        let got: Value = resp.json().await.unwrap();
        assert_eq!(got, expected, "body: {body}");
    }

    // A request without any body gets the same rejection.
    let resp = client
        .post(format!("{base}/reconcile"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let got: Value = resp.json().await.unwrap();
    assert_eq!(got, expected);

    // No outbound call was made for any of the rejected requests.
    assert!(cloudrun.received_requests().await.unwrap().is_empty());
    assert!(registry.received_requests().await.unwrap().is_empty());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn request_id_header_is_mirrored() {
    let cloudrun = MockServer::start().await;
    let registry = MockServer::start().await;
    let (base, shutdown_tx, handle) = start_server(state_for(&cloudrun, &registry)).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/healthz"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-42")
    );

    // Generated when absent
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.headers().get("x-request-id").is_some());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
