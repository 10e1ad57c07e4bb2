// File: coupon-common/src/models/admin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Admin {
    pub admin_id: Uuid,
    pub username: String,
    /// Encoded PBKDF2 hash; never leaves the process.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(username: &str, password_hash: String) -> Self {
        Self {
            admin_id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Claims carried inside an admin access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin id.
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}
