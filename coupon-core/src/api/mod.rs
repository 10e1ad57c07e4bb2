//! HTTP routes for the claim endpoint and the admin dashboard API.

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{AdminService, AllocationService};
use crate::throttle::ClaimThrottle;

pub mod error;
pub mod extract;
pub mod claim;
pub mod admin;

pub use error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct ApiSettings {
    /// Take the client address from `X-Forwarded-For` when present.
    pub trust_forwarded_for: bool,
    /// Origin allowed to call the API with credentials (the dashboard).
    pub cors_origin: Option<HeaderValue>,
}

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub allocation: Arc<AllocationService>,
    pub admin: Arc<AdminService>,
    pub throttle: ClaimThrottle,
    pub settings: Arc<ApiSettings>,
}

pub fn router(state: AppState) -> Router {
    let claim_route = post(claim::claim_coupon).layer(middleware::from_fn_with_state(
        state.clone(),
        claim::throttle_claims,
    ));

    let app = Router::new()
        .route("/health", get(health))
        .route("/claim-coupon", claim_route)
        .route("/admin/register", post(admin::register))
        .route("/admin/login", post(admin::login))
        .route(
            "/admin/coupons",
            get(admin::list_coupons).post(admin::add_coupon),
        )
        .route("/admin/coupons/{id}", delete(admin::delete_coupon))
        .route("/admin/claims", get(admin::list_claims))
        .route("/admin/stats", get(admin::pool_stats))
        .layer(TraceLayer::new_for_http());

    let app = match state.settings.cors_origin.clone() {
        Some(origin) => app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        ),
        None => app,
    };

    app.with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
