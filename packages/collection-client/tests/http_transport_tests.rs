//! Contract tests for the reqwest transport against a local mock server.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET | `/qr/sign` | `sign_*` |
//! | GET | `/containers/{id}` | `container_lookup_*` |
//! | GET | `/collection-requests/check-pending` | `check_pending_*` |
//! | POST | `/collection-requests` | `create_*` |

use std::sync::Arc;
use std::time::Duration;

use collection_client::{
    ApiClient, ApiConfig, ApiError, CollectionRequestSubmitter, ContainerId, ContainerVerification,
    FixedGeolocator, GeoLocation, HouseholdId, NoopGeolocator, PendingCheck, Signature,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client(server: &MockServer, api_key: Option<&str>) -> ApiClient {
    let mut config = ApiConfig::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(2));
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    ApiClient::new(config).unwrap()
}

fn container() -> ContainerId {
    ContainerId::parse("container_42").unwrap()
}

fn has_api_key(request: &Request) -> bool {
    request.headers.get("x-api-key").is_some()
}

// ── GET /qr/sign ─────────────────────────────────────────────────────

#[tokio::test]
async fn sign_is_public_even_with_key_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/qr/sign"))
        .and(query_param("containerId", "container_42"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "containerId": "container_42", "sig": "abc" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/containers/container_42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "assignedHouseholdId": "hh_1" })))
        .mount(&server)
        .await;

    let mut verification = ContainerVerification::new(client(&server, Some("secret")));
    let signed = verification.sign_qr_action(&container()).await.unwrap();
    assert_eq!(signed.signature, Signature::new("abc"));
    assert_eq!(signed.household_id, Some(HouseholdId::new("hh_1")));

    let requests = server.received_requests().await.unwrap();
    let sign = requests.iter().find(|r| r.url.path() == "/qr/sign").unwrap();
    assert!(!has_api_key(sign));
}

#[tokio::test]
async fn sign_not_found_returns_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/qr/sign"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Container not found" })))
        .mount(&server)
        .await;

    let mut verification = ContainerVerification::new(client(&server, None));
    let err = verification.sign_qr_action(&container()).await.unwrap_err();

    match err {
        ApiError::Status { status, detail, .. } => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Container not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(
        verification.error(),
        Some("Container not found. Please check the QR code.")
    );
}

// ── GET /containers/{id} ─────────────────────────────────────────────

#[tokio::test]
async fn container_lookup_carries_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/qr/sign"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "containerId": "container_42", "sig": "abc" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/containers/container_42"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "assignedHouseholdId": "hh_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut verification = ContainerVerification::new(client(&server, Some("secret")));
    verification.sign_qr_action(&container()).await.unwrap();
    assert_eq!(verification.household_id(), Some(&HouseholdId::new("hh_1")));
}

#[tokio::test]
async fn container_lookup_without_key_omits_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/qr/sign"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "containerId": "container_42", "sig": "abc" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/containers/container_42"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Missing API key" })))
        .mount(&server)
        .await;

    let mut verification = ContainerVerification::new(client(&server, None));
    let signed = verification.sign_qr_action(&container()).await.unwrap();
    assert_eq!(signed.household_id, None);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !has_api_key(r)));
}

// ── GET /collection-requests/check-pending ───────────────────────────

#[tokio::test]
async fn check_pending_sends_query_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collection-requests/check-pending"))
        .and(query_param("containerId", "container_42"))
        .and(query_param("householdId", "hh_1"))
        .and(header_exists("x-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pending": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut check = PendingCheck::new(client(&server, Some("secret")));
    let household = HouseholdId::new("hh_1");
    assert!(check.check_pending(&container(), Some(&household)).await);
}

#[tokio::test]
async fn check_pending_unreachable_service_is_false() {
    let config = ApiConfig::default()
        .with_base_url("http://127.0.0.1:1")
        .with_timeout(Duration::from_millis(200));
    let mut check = PendingCheck::new(ApiClient::new(config).unwrap());

    assert!(!check.check_pending(&container(), None).await);
    assert_eq!(check.error(), Some("Failed to check pending requests"));
}

// ── POST /collection-requests ────────────────────────────────────────

#[tokio::test]
async fn create_posts_body_with_signature_in_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collection-requests"))
        .and(query_param("sig", "abc"))
        .and(header("x-api-key", "secret"))
        .and(body_json(json!({
            "containerId": "container_42",
            "householdId": "hh_1",
            "geoAtRequest": { "latitude": 25.2, "longitude": 55.3 }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "req_9" })))
        .expect(1)
        .mount(&server)
        .await;

    let locator = Arc::new(FixedGeolocator::new(GeoLocation::new(25.2, 55.3)));
    let mut submitter = CollectionRequestSubmitter::new(client(&server, Some("secret")), locator);
    let household = HouseholdId::new("hh_1");

    let id = submitter
        .create_request(&container(), Some(&household), &Signature::new("abc"))
        .await
        .unwrap();

    assert_eq!(id, "req_9");
    assert_eq!(submitter.request_id(), Some("req_9"));
}

#[tokio::test]
async fn create_conflict_maps_to_pending_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collection-requests"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "detail": "Pending request exists" })))
        .mount(&server)
        .await;

    let mut submitter =
        CollectionRequestSubmitter::new(client(&server, Some("secret")), Arc::new(NoopGeolocator));

    let err = submitter
        .create_request(&container(), None, &Signature::new("abc"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(
        submitter.error(),
        Some("A collection request for this container is already pending.")
    );
    assert!(!submitter.loading());
}

#[tokio::test]
async fn create_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collection-requests"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ApiConfig::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let mut submitter =
        CollectionRequestSubmitter::new(ApiClient::new(config).unwrap(), Arc::new(NoopGeolocator));

    let err = submitter
        .create_request(&container(), None, &Signature::new("abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(
        submitter.error(),
        Some("Failed to create collection request. Please try again.")
    );
    assert!(!submitter.loading());
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collection-requests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut submitter =
        CollectionRequestSubmitter::new(client(&server, None), Arc::new(NoopGeolocator));

    let err = submitter
        .create_request(&container(), None, &Signature::new("abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(!submitter.success());
}
