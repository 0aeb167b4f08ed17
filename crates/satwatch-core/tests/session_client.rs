//! End-to-end behaviour of the session-aware client against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use satwatch_core::auth::MemoryTokenStore;
use satwatch_core::models::{AlertStatus, ValidationStatus};
use satwatch_core::{ApiClient, ApiError, SessionState, TokenKind, TokenStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DASHBOARD: &str = "/stats/dashboard/";
const REFRESH: &str = "/auth/token/refresh/";
const LOGIN: &str = "/auth/login/";

fn client_with(server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(&server.uri(), store).expect("build client")
}

fn logged_in_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_tokens("old", "r1"))
}

fn has_authorization(request: &wiremock::Request) -> bool {
    request
        .headers
        .iter()
        .any(|(name, _)| name.as_str().eq_ignore_ascii_case("authorization"))
}

fn dashboard_body() -> serde_json::Value {
    json!({"total_detections": 5, "active_alerts": 2})
}

async fn mount_dashboard(server: &MockServer, authorization: &'static str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(dashboard_body())
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path(DASHBOARD))
        .and(header("authorization", authorization))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_request_carries_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let stats = client.fetch_dashboard_stats().await.expect("dashboard");
    assert_eq!(stats.total_detections, 5);
}

#[tokio::test]
async fn test_anonymous_request_is_sent_without_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "BONDOUKOU"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::new()));
    let regions = client.fetch_regions().await.expect("regions");
    assert_eq!(regions.len(), 1);

    let requests = server.received_requests().await.expect("recorded requests");
    assert!(!has_authorization(&requests[0]));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once_and_request_resent() {
    let server = MockServer::start().await;
    mount_dashboard(&server, "Bearer old", 401).await;
    mount_dashboard(&server, "Bearer new", 200).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client_with(&server, store.clone());
    let stats = client.fetch_dashboard_stats().await.expect("dashboard after refresh");

    assert_eq!(stats.active_alerts, 2);
    assert_eq!(store.get(TokenKind::Access).as_deref(), Some("new"));
    assert_eq!(store.get(TokenKind::Refresh).as_deref(), Some("r1"));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;
    mount_dashboard(&server, "Bearer old", 401).await;
    mount_dashboard(&server, "Bearer new", 200).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "new", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client_with(&server, store.clone());
    client.fetch_dashboard_stats().await.expect("dashboard");

    assert_eq!(store.get(TokenKind::Refresh).as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_resent_request_keeps_its_body() {
    let server = MockServer::start().await;
    let expected_body = json!({"alert_status": "RESOLVED"});
    Mock::given(method("PATCH"))
        .and(path("/alerts/7/status/"))
        .and(header("authorization", "Bearer old"))
        .and(body_json(expected_body.clone()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/alerts/7/status/"))
        .and(header("authorization", "Bearer new"))
        .and(body_json(expected_body))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "message": "Statut de l'alerte mis à jour",
                "data": {"id": 7, "name": "Site Sikasso", "alert_status": "RESOLVED"}
            })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let alert = client
        .update_alert_status(7, AlertStatus::Resolved, None)
        .await
        .expect("status update");
    assert_eq!(alert.id, 7);
    assert_eq!(alert.status(), Some(AlertStatus::Resolved));
}

#[tokio::test]
async fn test_validation_response_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/detections/5/validate/"))
        .and(body_json(json!({"validation_status": "CONFIRMED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Détection validée avec succès",
            "data": {
                "id": 5,
                "detection_type": "MINING_SITE",
                "confidence_score": 0.91,
                "validation_status": "CONFIRMED",
                "validated_by": 4
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let detection = client
        .validate_detection(5, ValidationStatus::Confirmed)
        .await
        .expect("validation");
    assert_eq!(detection.id, 5);
    assert_eq!(detection.status(), Some(ValidationStatus::Confirmed));
    assert_eq!(detection.validated_by, Some(4));
}

#[tokio::test]
async fn test_second_rejection_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client_with(&server, store.clone());
    let err = client.fetch_dashboard_stats().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(store.get(TokenKind::Access).is_none());
    assert!(store.get(TokenKind::Refresh).is_none());
}

#[tokio::test]
async fn test_missing_refresh_token_ends_session_without_refresh_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new"})))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set(TokenKind::Access, "old");
    let client = client_with(&server, store.clone());
    let err = client.fetch_dashboard_stats().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(store.get(TokenKind::Access).is_none());
}

#[tokio::test]
async fn test_refresh_rejection_clears_tokens_and_notifies() {
    let server = MockServer::start().await;
    mount_dashboard(&server, "Bearer old", 401).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client_with(&server, store.clone());
    let mut session = client.subscribe_session();
    assert_eq!(*session.borrow(), SessionState::Authenticated);

    let err = client.fetch_dashboard_stats().await.unwrap_err();

    assert!(err.is_session_ended());
    assert!(store.get(TokenKind::Access).is_none());
    assert!(store.get(TokenKind::Refresh).is_none());
    assert!(session.has_changed().expect("monitor alive"));
    assert_eq!(*session.borrow_and_update(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let server = MockServer::start().await;
    mount_dashboard(&server, "Bearer old", 401).await;
    mount_dashboard(&server, "Bearer new", 200).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "new"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let (first, second) = tokio::join!(client.fetch_dashboard_stats(), client.fetch_dashboard_stats());

    assert_eq!(first.expect("first request").total_detections, 5);
    assert_eq!(second.expect("second request").total_detections, 5);
}

#[tokio::test]
async fn test_other_errors_leave_tokens_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alerts/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DASHBOARD))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new"})))
        .expect(0)
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = client_with(&server, store.clone());

    let not_found = client.fetch_alert(99).await.unwrap_err();
    assert_eq!(not_found.status().map(|s| s.as_u16()), Some(404));
    let server_error = client.fetch_dashboard_stats().await.unwrap_err();
    assert!(server_error.is_retryable());

    assert_eq!(store.get(TokenKind::Access).as_deref(), Some("old"));
    assert_eq!(store.get(TokenKind::Refresh).as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // wiremock pools servers, so dropping a MockServer leaves its port
    // listening; bind and release a plain listener to get a closed port.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let uri = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let store = logged_in_store();
    let client = ApiClient::new(&uri, store.clone()).expect("build client");
    let err = client.fetch_dashboard_stats().await.unwrap_err();

    assert!(matches!(err, ApiError::NetworkError(_)));
    assert!(err.is_retryable());
    assert_eq!(store.get(TokenKind::Access).as_deref(), Some("old"));
    assert_eq!(store.get(TokenKind::Refresh).as_deref(), Some("r1"));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_refresh_transport_failure_ends_session() {
    let server = MockServer::start().await;
    mount_dashboard(&server, "Bearer old", 401).await;
    // Answers after the client has given up, so the refresh fails in transport
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "new"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = logged_in_store();
    let client = ApiClient::with_timeout(&server.uri(), store.clone(), Duration::from_millis(250))
        .expect("build client");
    let err = client.fetch_dashboard_stats().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(store.get(TokenKind::Access).is_none());
    assert!(store.get(TokenKind::Refresh).is_none());
    assert_eq!(client.session_state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_undecodable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/regions/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let err = client.fetch_regions().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_login_stores_both_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .and(body_json(json!({"email": "analyst@example.org", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1",
            "user": {"id": 4, "email": "analyst@example.org", "first_name": "Awa", "last_name": "Traore"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with(&server, store.clone());
    let mut session = client.subscribe_session();

    let user = client.login("analyst@example.org", "secret").await.expect("login");

    assert_eq!(user.display_name(), "Awa Traore");
    assert_eq!(store.get(TokenKind::Access).as_deref(), Some("a1"));
    assert_eq!(store.get(TokenKind::Refresh).as_deref(), Some("r1"));
    assert_eq!(*session.borrow_and_update(), SessionState::Authenticated);

    let requests = server.received_requests().await.expect("recorded requests");
    assert!(!has_authorization(&requests[0]));
}

#[tokio::test]
async fn test_login_rejection_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "No active account"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_with(&server, store.clone());
    let err = client.login("analyst@example.org", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidCredentials));
    assert!(store.get(TokenKind::Access).is_none());
    assert!(store.get(TokenKind::Refresh).is_none());
}

#[tokio::test]
async fn test_login_server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_with(&server, Arc::new(MemoryTokenStore::new()));
    let err = client.login("analyst@example.org", "secret").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError { .. }));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_logout_is_idempotent_and_offline() {
    let server = MockServer::start().await;
    let store = logged_in_store();
    let client = client_with(&server, store.clone());

    client.logout();
    client.logout();

    assert!(store.get(TokenKind::Access).is_none());
    assert!(store.get(TokenKind::Refresh).is_none());
    assert_eq!(client.session_state(), SessionState::Anonymous);
    let requests = server.received_requests().await.expect("recorded requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_list_query_is_sent_as_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/detections/"))
        .and(query_param("page", "2"))
        .and(query_param("validation_status", "DETECTED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 21,
            "next": null,
            "previous": "http://localhost/api/v1/detections/?page=1",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let query = satwatch_core::api::ListQuery::new()
        .page(2)
        .filter("validation_status", "DETECTED");
    let page = client.fetch_detections(&query).await.expect("detections");
    assert_eq!(page.count, 21);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_trends_default_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats/detection-trends/"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "period_days": 30,
            "daily_detections": [{"day": "2024-03-14", "count": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    let trends = client.fetch_detection_trends(None).await.expect("trends");
    assert_eq!(trends.total(), 2);
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/detections/12/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with(&server, logged_in_store());
    client.delete_detection(12).await.expect("delete");
}
