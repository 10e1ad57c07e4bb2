use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::error::ApiError;
use crate::api::extract::{session_cookie, session_set_cookie, ClientAddr};
use crate::api::AppState;
use crate::services::resolve_identity;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub message: String,
    pub coupon: String,
}

/// POST /claim-coupon
///
/// The session cookie is written back on every response, including
/// refusals, so a fresh visitor keeps the same identity on retry.
pub async fn claim_coupon(
    State(state): State<AppState>,
    ClientAddr(addr): ClientAddr,
    headers: HeaderMap,
) -> Response {
    let identity = match resolve_identity(addr, session_cookie(&headers).as_deref()) {
        Ok(id) => id,
        Err(e) => return ApiError(e).into_response(),
    };

    let mut response = match state.allocation.claim(&identity).await {
        Ok(outcome) => Json(ClaimResponse {
            message: outcome.message.to_string(),
            coupon: outcome.coupon.code,
        })
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    };

    set_session_cookie(&mut response, &identity.session);
    response
}

/// Transport throttle in front of `/claim-coupon`. A refusal still carries
/// the caller's session cookie, minting one if the request had none.
pub async fn throttle_claims(
    State(state): State<AppState>,
    ClientAddr(addr): ClientAddr,
    request: Request,
    next: Next,
) -> Response {
    let Err(e) = state.throttle.check(addr) else {
        return next.run(request).await;
    };

    let mut response = ApiError(e).into_response();
    match resolve_identity(addr, session_cookie(request.headers()).as_deref()) {
        Ok(identity) => set_session_cookie(&mut response, &identity.session),
        Err(e) => error!("No session for throttled request: {}", e),
    }
    response
}

fn set_session_cookie(response: &mut Response, session: &str) {
    match HeaderValue::from_str(&session_set_cookie(session)) {
        Ok(v) => {
            response.headers_mut().append(SET_COOKIE, v);
        }
        Err(e) => error!("Session token is not a valid header value: {}", e),
    }
}
