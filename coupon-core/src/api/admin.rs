use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coupon_common::models::{ClaimWithCoupon, Coupon, PoolStats};
use crate::api::error::ApiError;
use crate::api::extract::AdminAuth;
use crate::api::AppState;
use crate::Error;

/// Missing fields deserialize as empty so the service can answer with its
/// own validation message instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCouponRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CouponResponse {
    pub message: String,
    pub coupon: Coupon,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.admin.register(&body.username, &body.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Admin registered successfully".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.admin.login(&body.username, &body.password).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn list_coupons(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    Ok(Json(state.admin.list_coupons().await?))
}

pub async fn add_coupon(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Json(body): Json<AddCouponRequest>,
) -> Result<Json<CouponResponse>, ApiError> {
    let outcome = state.admin.add_coupon(&body.code).await?;
    Ok(Json(CouponResponse {
        message: outcome.message().to_string(),
        coupon: outcome.into_coupon(),
    }))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    // A malformed id cannot name an existing coupon.
    let coupon_id = Uuid::parse_str(&id)
        .map_err(|_| Error::NotFound(format!("coupon {}", id)))?;
    state.admin.delete_coupon(coupon_id).await?;
    Ok(Json(MessageResponse {
        message: "Coupon deleted.".to_string(),
    }))
}

pub async fn list_claims(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<Json<Vec<ClaimWithCoupon>>, ApiError> {
    Ok(Json(state.admin.list_claims().await?))
}

pub async fn pool_stats(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<Json<PoolStats>, ApiError> {
    Ok(Json(state.admin.pool_stats().await?))
}
