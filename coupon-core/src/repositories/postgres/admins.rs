// src/repositories/postgres/admins.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use coupon_common::models::Admin;
use coupon_common::traits::repository_traits::AdminRepository;
use crate::Error;

#[derive(Clone)]
pub struct PostgresAdminRepository {
    pool: Pool<Postgres>,
}

impl PostgresAdminRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn create(&self, admin: &Admin) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO admins (admin_id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
            .bind(admin.admin_id)
            .bind(&admin.username)
            .bind(&admin.password_hash)
            .bind(admin.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>, Error> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT admin_id, username, password_hash, created_at
            FROM admins
            WHERE username = $1
            "#,
        )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }
}
