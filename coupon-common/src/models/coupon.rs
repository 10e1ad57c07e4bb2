// File: coupon-common/src/models/coupon.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Pending,
    Claimed,
}

impl CouponStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponStatus::Pending => "pending",
            CouponStatus::Claimed => "claimed",
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CouponStatus::Pending),
            "claimed" => Ok(CouponStatus::Claimed),
            other => Err(Error::Internal(format!("Unknown coupon status '{}'", other))),
        }
    }
}

/// A single coupon in the shared pool.
///
/// `status == Claimed` exactly when `assigned_to` is set; the only mutators
/// are [`Coupon::mark_claimed`] and [`Coupon::reset`], which move both
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub status: CouponStatus,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_string(),
            status: CouponStatus::Pending,
            assigned_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CouponStatus::Pending
    }

    pub fn mark_claimed(&mut self, assigned_to: &str) {
        self.status = CouponStatus::Claimed;
        self.assigned_to = Some(assigned_to.to_string());
    }

    /// Administrative recycle: back to the pending pool, assignment cleared.
    pub fn reset(&mut self) {
        self.status = CouponStatus::Pending;
        self.assigned_to = None;
    }

    pub fn is_consistent(&self) -> bool {
        (self.status == CouponStatus::Claimed) == self.assigned_to.is_some()
    }
}

/// Pool counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total: usize,
    pub pending: usize,
    pub claimed: usize,
    pub claims: usize,
}
