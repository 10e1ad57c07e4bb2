// src/repositories/postgres/allocation.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use coupon_common::models::{ClaimRecord, Coupon};
use coupon_common::traits::repository_traits::{AllocationStore, AllocationTx, ROTATION_POINTER_KEY};
use crate::Error;
use super::{coupon_from_row, COUPON_COLUMNS};

/// Hands out claim transactions backed by a single Postgres transaction each.
#[derive(Clone)]
pub struct PostgresAllocationStore {
    pool: Pool<Postgres>,
}

impl PostgresAllocationStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AllocationStore for PostgresAllocationStore {
    async fn begin(&self) -> Result<Box<dyn AllocationTx>, Error> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresAllocationTx { tx }))
    }
}

/// The pointer row is locked with `SELECT ... FOR UPDATE`, so concurrent
/// claims from any number of service instances queue behind each other
/// until commit or rollback.
pub struct PostgresAllocationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AllocationTx for PostgresAllocationTx {
    async fn read_pointer(&mut self) -> Result<i64, Error> {
        sqlx::query(
            r#"
            INSERT INTO app_config (config_key, config_value)
            VALUES ($1, 0)
            ON CONFLICT (config_key) DO NOTHING
            "#,
        )
            .bind(ROTATION_POINTER_KEY)
            .execute(&mut *self.tx)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT config_value
            FROM app_config
            WHERE config_key = $1
            FOR UPDATE
            "#,
        )
            .bind(ROTATION_POINTER_KEY)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(row.try_get("config_value")?)
    }

    async fn write_pointer(&mut self, value: i64) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE app_config
            SET config_value = $2
            WHERE config_key = $1
            "#,
        )
            .bind(ROTATION_POINTER_KEY)
            .bind(value)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn latest_claim_for(&mut self, ip: &str, session: &str) -> Result<Option<ClaimRecord>, Error> {
        let claim = sqlx::query_as::<_, ClaimRecord>(
            r#"
            SELECT claim_id, coupon_id, ip, session, claimed_at
            FROM claims
            WHERE ip = $1 OR session = $2
            ORDER BY claimed_at DESC
            LIMIT 1
            "#,
        )
            .bind(ip)
            .bind(session)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(claim)
    }

    async fn pending_coupons(&mut self) -> Result<Vec<Coupon>, Error> {
        let sql = format!(
            r#"
            SELECT {COUPON_COLUMNS}
            FROM coupons
            WHERE status = 'pending'
            ORDER BY created_at ASC, coupon_id ASC
            "#
        );
        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;
        rows.iter().map(coupon_from_row).collect()
    }

    async fn mark_claimed(&mut self, coupon_id: Uuid, assigned_to: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET status = 'claimed',
                assigned_to = $2
            WHERE coupon_id = $1
              AND status = 'pending'
            "#,
        )
            .bind(coupon_id)
            .bind(assigned_to)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn append_claim(&mut self, claim: &ClaimRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO claims (claim_id, coupon_id, ip, session, claimed_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(claim.id)
            .bind(claim.coupon_id)
            .bind(&claim.ip)
            .bind(&claim.session)
            .bind(claim.claimed_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        self.tx.commit().await?;
        Ok(())
    }
}
