// File: coupon-core/tests/api_tests.rs

mod test_utils;

use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use coupon_core::api::router;
use coupon_core::repositories::MemoryStore;
use test_utils::helpers::*;

fn app(store: &MemoryStore, throttle_burst: u32, trust_forwarded_for: bool) -> Router {
    let peer: SocketAddr = "192.0.2.10:40000".parse().unwrap();
    router(app_state(store, throttle_burst, trust_forwarded_for)).layer(MockConnectInfo(peer))
}

fn claim_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/claim-coupon");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_from(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    let pair = set_cookie.split(';').next().unwrap();
    pair.to_string()
}

async fn admin_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/register",
            None,
            json!({ "username": "root", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/login",
            None,
            json!({ "username": "root", "password": "pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let store = MemoryStore::new();
    let response = app(&store, 5, false)
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_claim_then_cooldown() {
    let store = MemoryStore::new();
    seed_coupons(&store, &["A", "B"]).await.unwrap();
    let app = app(&store, 5, false);

    let response = app.clone().oneshot(claim_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_from(&response);
    assert!(cookie.starts_with("session="));
    let body = body_json(response).await;
    assert_eq!(body["message"], "Coupon claimed!");
    assert_eq!(body["coupon"], "A");

    let response = app.clone().oneshot(claim_request(Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    // Refusals still carry the same session.
    assert_eq!(session_from(&response), cookie);
    let body = body_json(response).await;
    assert_eq!(body["message"], "You must wait before claiming again.");
}

#[tokio::test]
async fn test_empty_pool_is_not_found() {
    let store = MemoryStore::new();
    let response = app(&store, 5, false)
        .oneshot(claim_request(None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "No coupons available.");
}

#[tokio::test]
async fn test_throttle_rejects_bursts() {
    let store = MemoryStore::new();
    let app = app(&store, 2, false);

    for _ in 0..2 {
        let response = app.clone().oneshot(claim_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app.clone().oneshot(claim_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    // A throttled visitor without a cookie still gets a session.
    assert!(session_from(&response).starts_with("session="));
    assert_eq!(
        body_json(response).await["message"],
        "Too many requests, try again later."
    );

    let response = app
        .clone()
        .oneshot(claim_request(Some("session=kept-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(session_from(&response), "session=kept-token");
}

#[tokio::test]
async fn test_forwarded_for_is_honoured_when_trusted() {
    let store = MemoryStore::new();
    seed_coupons(&store, &["A", "B"]).await.unwrap();
    let app = app(&store, 5, true);

    let request = Request::builder()
        .method("POST")
        .uri("/claim-coupon")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let state = store.snapshot().await;
    assert_eq!(state.claims.len(), 1);
    assert_eq!(state.claims[0].ip, "203.0.113.7");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let store = MemoryStore::new();
    let app = app(&store, 5, false);

    let response = app
        .clone()
        .oneshot(get_request("/admin/coupons", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(response).await.get("error").is_some());

    let response = app
        .clone()
        .oneshot(get_request("/admin/claims", Some("bogus")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let store = MemoryStore::new();
    let app = app(&store, 5, false);
    admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/login",
            None,
            json!({ "username": "root", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_coupon_lifecycle() {
    let store = MemoryStore::new();
    let app = app(&store, 5, false);
    let token = admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/admin/coupons", Some(&token), json!({ "code": "SAVE10" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Coupon added.");
    assert_eq!(body["coupon"]["status"], "pending");
    let id = body["coupon"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/admin/coupons", Some(&token), json!({ "code": "SAVE10" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/admin/coupons", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.clone().oneshot(claim_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/admin/claims", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let claims = body_json(response).await;
    assert_eq!(claims.as_array().unwrap().len(), 1);
    assert_eq!(claims[0]["ip"], "192.0.2.10");
    assert_eq!(claims[0]["coupon"]["code"], "SAVE10");

    let response = app
        .clone()
        .oneshot(get_request("/admin/stats", Some(&token)))
        .await
        .unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["claimed"], 1);
    assert_eq!(stats["pending"], 0);

    let delete = |uri: String| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(delete("/admin/coupons/not-a-uuid".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(delete(format!("/admin/coupons/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Coupon deleted.");

    let response = app
        .clone()
        .oneshot(get_request("/admin/coupons", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));

    // The ledger outlives the coupon.
    let response = app
        .clone()
        .oneshot(get_request("/admin/claims", Some(&token)))
        .await
        .unwrap();
    let claims = body_json(response).await;
    assert_eq!(claims.as_array().unwrap().len(), 1);
    assert!(claims[0]["coupon"].is_null());
}
