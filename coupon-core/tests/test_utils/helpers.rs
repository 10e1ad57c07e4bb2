// File: coupon-core/tests/test_utils/helpers.rs
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use coupon_common::models::Coupon;
use coupon_common::traits::repository_traits::CouponRepository;
use coupon_core::api::{ApiSettings, AppState};
use coupon_core::auth::TokenIssuer;
use coupon_core::repositories::MemoryStore;
use coupon_core::services::{AdminService, AllocationService, ClaimantIdentity, CooldownGuard};
use coupon_core::throttle::ClaimThrottle;
use coupon_core::{Database, DatabaseSettings, Error};

/// Cheap PBKDF2 work factor so registration tests stay fast.
pub const TEST_PASSWORD_ITERATIONS: u32 = 1_000;
pub const TEST_JWT_SECRET: &[u8] = b"test-secret";

pub fn identity(ip: &str, session: &str) -> ClaimantIdentity {
    ClaimantIdentity {
        ip: ip.to_string(),
        session: session.to_string(),
    }
}

/// Fixed creation times one second apart, so pool order is deterministic.
pub fn created_at(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(i as i64)
}

pub fn coupon_at(code: &str, i: usize) -> Coupon {
    let mut c = Coupon::new(code);
    c.created_at = created_at(i);
    c
}

/// Inserts `codes` in order, oldest first.
pub async fn seed_coupons<R: CouponRepository + ?Sized>(repo: &R, codes: &[&str]) -> Result<Vec<Coupon>, Error> {
    let mut out = Vec::with_capacity(codes.len());
    for (i, code) in codes.iter().enumerate() {
        let c = coupon_at(code, i);
        repo.insert(&c).await?;
        out.push(c);
    }
    Ok(out)
}

pub fn allocation(store: &MemoryStore) -> AllocationService {
    AllocationService::new(Arc::new(store.clone()), CooldownGuard::default())
}

pub fn admin_service(store: &MemoryStore) -> AdminService {
    AdminService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        TokenIssuer::new(TEST_JWT_SECRET).unwrap(),
    )
        .with_password_iterations(TEST_PASSWORD_ITERATIONS)
}

pub fn app_state(store: &MemoryStore, throttle_burst: u32, trust_forwarded_for: bool) -> AppState {
    AppState {
        allocation: Arc::new(allocation(store)),
        admin: Arc::new(admin_service(store)),
        throttle: ClaimThrottle::new(throttle_burst, Duration::from_secs(300)).unwrap(),
        settings: Arc::new(ApiSettings {
            trust_forwarded_for,
            cors_origin: None,
        }),
    }
}

pub fn random_id() -> Uuid {
    Uuid::new_v4()
}

/// Database for the Postgres suite, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn create_test_db() -> Result<Option<Database>, Error> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        return Ok(None);
    };

    let db = Database::connect(&DatabaseSettings::new(url, 10)).await?;
    Ok(Some(db))
}

/// Migrates and wipes the test database.
pub async fn setup_test_database(db: &Database) -> Result<(), Error> {
    db.migrate().await?;
    sqlx::query("TRUNCATE TABLE coupons, claims, app_config, admins")
        .execute(db.pool())
        .await?;
    Ok(())
}
