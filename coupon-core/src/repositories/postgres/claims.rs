// src/repositories/postgres/claims.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use coupon_common::models::{ClaimRecord, ClaimWithCoupon, Coupon, CouponStatus};
use coupon_common::traits::repository_traits::ClaimRepository;
use crate::Error;

#[derive(Clone)]
pub struct PostgresClaimRepository {
    pool: Pool<Postgres>,
}

impl PostgresClaimRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimRepository for PostgresClaimRepository {
    async fn list_with_coupons(&self) -> Result<Vec<ClaimWithCoupon>, Error> {
        // LEFT JOIN: claims outlive their coupons.
        let rows = sqlx::query(
            r#"
            SELECT cl.claim_id,
                   cl.coupon_id,
                   cl.ip,
                   cl.session,
                   cl.claimed_at,
                   c.code        AS coupon_code,
                   c.status      AS coupon_status,
                   c.assigned_to AS coupon_assigned_to,
                   c.created_at  AS coupon_created_at
            FROM claims cl
            LEFT JOIN coupons c ON c.coupon_id = cl.coupon_id
            ORDER BY cl.claimed_at DESC, cl.claim_id DESC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let claim = ClaimRecord {
                id: r.try_get("claim_id")?,
                coupon_id: r.try_get("coupon_id")?,
                ip: r.try_get("ip")?,
                session: r.try_get("session")?,
                claimed_at: r.try_get::<DateTime<Utc>, _>("claimed_at")?,
            };

            let code: Option<String> = r.try_get("coupon_code")?;
            let coupon = match code {
                Some(code) => {
                    let status: String = r.try_get("coupon_status")?;
                    Some(Coupon {
                        id: claim.coupon_id,
                        code,
                        status: status.parse::<CouponStatus>()?,
                        assigned_to: r.try_get("coupon_assigned_to")?,
                        created_at: r.try_get::<DateTime<Utc>, _>("coupon_created_at")?,
                    })
                }
                None => None,
            };

            out.push(ClaimWithCoupon { claim, coupon });
        }
        Ok(out)
    }

    async fn count(&self) -> Result<usize, Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as usize)
    }
}
