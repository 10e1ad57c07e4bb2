// src/repositories/postgres/coupons.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use coupon_common::models::Coupon;
use coupon_common::traits::repository_traits::CouponRepository;
use crate::Error;
use super::{coupon_from_row, COUPON_COLUMNS};

#[derive(Clone)]
pub struct PostgresCouponRepository {
    pool: Pool<Postgres>,
}

impl PostgresCouponRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn list_all(&self) -> Result<Vec<Coupon>, Error> {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at ASC, coupon_id ASC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(coupon_from_row).collect()
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, Error> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1");
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(coupon_from_row).transpose()
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO coupons (coupon_id, code, status, assigned_to, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(coupon.id)
            .bind(&coupon.code)
            .bind(coupon.status.as_str())
            .bind(&coupon.assigned_to)
            .bind(coupon.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset_to_pending(&self, coupon_id: Uuid) -> Result<Option<Coupon>, Error> {
        let sql = format!(
            r#"
            UPDATE coupons
            SET status = 'pending',
                assigned_to = NULL
            WHERE coupon_id = $1
            RETURNING {COUPON_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(coupon_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(coupon_from_row).transpose()
    }

    async fn delete(&self, coupon_id: Uuid) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM coupons WHERE coupon_id = $1")
            .bind(coupon_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
