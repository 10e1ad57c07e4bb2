// File: coupon-common/src/models/claim.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coupon::Coupon;

/// Append-only ledger entry written once per successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    #[sqlx(rename = "claim_id")]
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub ip: String,
    pub session: String,
    pub claimed_at: DateTime<Utc>,
}

impl ClaimRecord {
    pub fn new(coupon_id: Uuid, ip: &str, session: &str, claimed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            coupon_id,
            ip: ip.to_string(),
            session: session.to_string(),
            claimed_at,
        }
    }

    /// Whether this record belongs to the claimant: address OR session matches.
    pub fn matches(&self, ip: &str, session: &str) -> bool {
        self.ip == ip || self.session == session
    }
}

/// A ledger entry with its coupon joined in. `coupon` is `None` once the
/// coupon has been deleted; the ledger keeps the dangling reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimWithCoupon {
    #[serde(flatten)]
    pub claim: ClaimRecord,
    pub coupon: Option<Coupon>,
}
