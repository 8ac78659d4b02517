//! Mock backend tests for the cuppa API client.
//!
//! These use wiremock to simulate the backend and exercise the request
//! pipeline (preflight refresh, 401 retry, error decoding) without network
//! access or real credentials.

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cuppa_api::orders::{CreateOrderRequest, OrderLineItem};
use cuppa_api::{ApiClient, Envelope, decode};
use cuppa_core::error::{AuthError, DecodeError};
use cuppa_core::{ApiUrl, CredentialState, Error};

const REFRESH_PATH: &str = "/api/core/v1/auth/refresh";

fn client(server: &MockServer, credentials: CredentialState) -> ApiClient {
    let base = ApiUrl::new(server.uri()).unwrap();
    ApiClient::new(base, credentials)
}

/// An authenticated state whose access token is past its expiry.
fn expired_access(refresh_expiry: Option<String>) -> CredentialState {
    let past = (Utc::now() - Duration::seconds(60)).timestamp_millis().to_string();
    CredentialState::from_parts("stale-access", "live-refresh", Some(past), refresh_expiry)
}

fn grant_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "meta": {"code": 200, "message": "ok"},
        "data": {
            "access_token": access,
            "refresh_token": refresh,
            "expires_at": (Utc::now() + Duration::hours(1)).to_rfc3339(),
            "refresh_token_expires_at": (Utc::now() + Duration::days(30)).to_rfc3339()
        }
    })
}

async fn mount_refresh(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({"refresh_token": "live-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body(access, refresh)))
        .mount(server)
        .await;
}

// ============================================================================
// Preflight refresh
// ============================================================================

#[tokio::test]
async fn preflight_short_circuits_when_refresh_token_expired() {
    let server = MockServer::start().await;

    let past = (Utc::now() - Duration::seconds(1)).to_rfc3339();
    let credentials = expired_access(Some(past));
    let client = client(&server, credentials);

    let result = client
        .execute_empty(reqwest::Method::GET, "/api/core/v1/subscriptions", true)
        .await;

    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::SessionExpired))
    ));
    // No HTTP call was issued, not even the refresh.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn preflight_refresh_then_request_uses_new_token() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", "fresh-refresh").await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/subscriptions"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {}, "data": []})),
        )
        .mount(&server)
        .await;

    let client = client(&server, expired_access(None));
    let subscriptions = client.list_subscriptions().await.unwrap();

    assert!(subscriptions.is_empty());
    assert_eq!(client.credentials().access_token(), "fresh-access");
    assert_eq!(client.credentials().refresh_token(), "fresh-refresh");
}

#[tokio::test]
async fn preflight_refresh_failure_is_refresh_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"meta": {"code": 400, "message": "token revoked"}})),
        )
        .mount(&server)
        .await;

    let client = client(&server, expired_access(None));
    let result = client
        .execute_empty(reqwest::Method::GET, "/api/core/v1/subscriptions", true)
        .await;

    match result {
        Err(Error::Auth(AuthError::RefreshFailed { source })) => {
            assert!(source.to_string().contains("token revoked"));
        }
        other => panic!("expected RefreshFailed, got {other:?}"),
    }
    // Credential state is untouched by the failed refresh.
    assert_eq!(client.credentials().access_token(), "stale-access");
}

// ============================================================================
// 401 retry
// ============================================================================

#[tokio::test]
async fn retry_after_401_returns_second_response() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", "fresh-refresh").await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/orders/ord-1"))
        .and(header("authorization", "Bearer stale-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/orders/ord-1"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"code": 200, "message": "ok"},
            "data": {
                "id": "ord-1",
                "tier": "explorer",
                "total_quantity_kg": "3",
                "line_items": [],
                "status": "paid",
                "created_on": "2026-08-01T00:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    // Access token looks live (no recorded expiry), so no preflight refresh;
    // the 401 path drives the rotation.
    let credentials = CredentialState::from_parts("stale-access", "live-refresh", None, None);
    let client = client(&server, credentials);

    let order = client.get_order("ord-1").await.unwrap();
    assert!(order.is_paid());
    assert_eq!(client.credentials().access_token(), "fresh-access");
}

#[tokio::test]
async fn refresh_failure_after_401_returns_original_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/subscriptions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "bad credentials"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("stale-access", "live-refresh", None, None);
    let client = client(&server, credentials);

    // The pipeline swallows the refresh failure and hands back the 401.
    let response = client
        .execute_empty(reqwest::Method::GET, "/api/core/v1/subscriptions", true)
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let err = decode::<serde_json::Value>(&response).unwrap_err();
    match err {
        Error::Api(api) => {
            assert_eq!(api.status(), 401);
            assert_eq!(api.message(), "bad credentials");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn persistent_401_is_retried_exactly_once() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", "fresh-refresh").await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/subscriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "still no"})))
        .expect(2)
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("stale-access", "live-refresh", None, None);
    let client = client(&server, credentials);

    let response = client
        .execute_empty(reqwest::Method::GET, "/api/core/v1/subscriptions", true)
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn unauthenticated_request_skips_retry_machinery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/content/categories/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "nope"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, CredentialState::new());
    let response = client
        .execute_empty(
            reqwest::Method::GET,
            "/api/core/v1/content/categories/",
            false,
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    // And no Authorization header was attached.
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ============================================================================
// Concurrent refresh
// ============================================================================

#[tokio::test]
async fn concurrent_expired_calls_refresh_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(grant_body("fresh-access", "fresh-refresh")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/subscriptions"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {}, "data": []})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, expired_access(None));

    let (first, second) = tokio::join!(client.list_subscriptions(), client.list_subscriptions());
    first.unwrap();
    second.unwrap();
}

// ============================================================================
// Decoding
// ============================================================================

#[tokio::test]
async fn no_content_decodes_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/core/v1/content/bookmarks/bm-1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("access", "refresh", None, None);
    let client = client(&server, credentials);

    let response = client
        .execute_empty(
            reqwest::Method::DELETE,
            "/api/core/v1/content/bookmarks/bm-1/",
            true,
        )
        .await
        .unwrap();

    let value: Option<Envelope<serde_json::Value>> = decode(&response).unwrap();
    assert!(value.is_none());

    // The typed endpoint accepts it too.
    client.delete_bookmark("bm-1").await.unwrap();
}

#[tokio::test]
async fn contract_mismatch_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/orders/ord-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("access", "refresh", None, None);
    let client = client(&server, credentials);

    let err = client.get_order("ord-1").await.unwrap_err();
    assert!(matches!(err, Error::Decode(DecodeError::Json { .. })));
}

#[tokio::test]
async fn validation_error_body_surfaces_field_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/core/v1/orders/configure"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "meta": {
                "code": 400,
                "message": "validation failed",
                "errors": [
                    {"error": "must be at least 1", "field": "total_quantity_kg", "type": "min"},
                    {"error": "unknown tier", "field": "tier", "type": "choice"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("access", "refresh", None, None);
    let client = client(&server, credentials);

    let request = CreateOrderRequest {
        tier: Some("bogus".to_string()),
        total_quantity_kg: 0,
        ..Default::default()
    };
    let err = client.create_order(&request).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "total_quantity_kg: must be at least 1\ntier: unknown tier"
    );
}

// ============================================================================
// Endpoints
// ============================================================================

#[tokio::test]
async fn login_stores_granted_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/core/v1/auth/login"))
        .and(body_json(json!({"email": "alice@example.com", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(grant_body("login-access", "login-refresh")),
        )
        .mount(&server)
        .await;

    let client = client(&server, CredentialState::new());
    assert!(!client.is_authenticated());

    client.login("alice@example.com", "secret").await.unwrap();

    assert!(client.is_authenticated());
    assert_eq!(client.credentials().access_token(), "login-access");
    assert!(!client.is_access_token_expired());
}

#[tokio::test]
async fn list_categories_unwraps_paged_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/content/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"code": 200, "message": "ok"},
            "data": {
                "count": 2,
                "next": null,
                "previous": null,
                "results": [
                    {"id": "c1", "slug": "brewing", "name": "Brewing", "description": "", "order": 1, "published_at": null},
                    {"id": "c2", "slug": "beans", "name": "Beans", "description": "", "order": 2, "published_at": null}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = client(&server, CredentialState::new());
    let categories = client.list_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].slug, "beans");
}

#[tokio::test]
async fn available_plans_filter_inactive() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/core/v1/subscriptions/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"code": 200, "message": "ok"},
            "data": [
                {"id": "p1", "tier": "explorer", "name": "Explorer", "price": "18.00",
                 "currency": "EUR", "billing_period": "month", "summary": "", "description": "",
                 "features": [], "is_subscription": true, "is_active": true},
                {"id": "p2", "tier": "legacy", "name": "Legacy", "price": "12.00",
                 "currency": "EUR", "billing_period": "month", "summary": "", "description": "",
                 "features": [], "is_subscription": true, "is_active": false}
            ]
        })))
        .mount(&server)
        .await;

    let client = client(&server, CredentialState::new());
    let plans = client.available_subscriptions().await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].tier, "explorer");
}

#[tokio::test]
async fn create_order_and_checkout_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/core/v1/orders/configure"))
        .and(body_json(json!({
            "tier": "explorer",
            "total_quantity_kg": 3,
            "line_items": [
                {"quantity_kg": 3, "grind_type": "whole_bean", "brewing_method": "v60"}
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "meta": {"code": 201, "message": "created"},
            "data": {
                "id": "ord-9",
                "tier": "explorer",
                "total_quantity_kg": "3.00",
                "line_items": [
                    {"id": "li-1", "quantity_kg": "3.00", "grind_type": "whole_bean",
                     "brewing_method": "v60"}
                ],
                "status": "draft",
                "expected_shipment_date": null,
                "created_on": "2026-08-26T10:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/core/v1/orders/ord-9/checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"code": 200, "message": "ok"},
            "data": {
                "checkout_url": "https://checkout.stripe.com/c/pay_123",
                "session_id": "cs_123",
                "order_id": "ord-9"
            }
        })))
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("access", "refresh", None, None);
    let client = client(&server, credentials);

    let request = CreateOrderRequest {
        tier: Some("explorer".to_string()),
        product_id: None,
        total_quantity_kg: 3,
        line_items: vec![OrderLineItem {
            quantity_kg: 3,
            grind_type: "whole_bean".to_string(),
            brewing_method: "v60".to_string(),
            notes: None,
        }],
    };

    let order = client.create_order(&request).await.unwrap();
    assert_eq!(order.id, "ord-9");
    assert_eq!(order.total_quantity(), 3.0);

    let checkout = client.create_checkout_session(&order.id).await.unwrap();
    assert_eq!(checkout.order_id, "ord-9");
    assert!(checkout.checkout_url.starts_with("https://checkout.stripe.com/"));
}

#[tokio::test]
async fn pause_subscription_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/core/v1/subscriptions/sub-1/pause"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"code": 200, "message": "ok"},
            "data": {
                "id": "sub-1",
                "tier": "explorer",
                "status": "paused",
                "created_on": "2026-08-01T00:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    let credentials = CredentialState::from_parts("access", "refresh", None, None);
    let client = client(&server, credentials);

    let subscription = client.pause_subscription("sub-1").await.unwrap();
    assert_eq!(subscription.status, "paused");
    assert!(!subscription.is_active());
}
