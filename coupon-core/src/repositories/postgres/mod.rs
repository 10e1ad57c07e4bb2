// src/repositories/postgres/mod.rs

use sqlx::postgres::PgRow;
use sqlx::Row;
use chrono::{DateTime, Utc};
use coupon_common::models::{Coupon, CouponStatus};
use crate::Error;

pub mod coupons;
pub mod claims;
pub mod admins;
pub mod allocation;

pub use coupons::PostgresCouponRepository;
pub use claims::PostgresClaimRepository;
pub use admins::PostgresAdminRepository;
pub use allocation::{PostgresAllocationStore, PostgresAllocationTx};

/// Column list matching [`coupon_from_row`].
pub(crate) const COUPON_COLUMNS: &str = "coupon_id, code, status, assigned_to, created_at";

/// `status` is plain TEXT guarded by a CHECK constraint, so it is parsed by hand.
pub(crate) fn coupon_from_row(row: &PgRow) -> Result<Coupon, Error> {
    let status: String = row.try_get("status")?;
    Ok(Coupon {
        id: row.try_get("coupon_id")?,
        code: row.try_get("code")?,
        status: status.parse::<CouponStatus>()?,
        assigned_to: row.try_get("assigned_to")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}
