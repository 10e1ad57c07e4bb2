// File: coupon-core/tests/postgres_tests.rs
//
// Runs against a real database only when TEST_DATABASE_URL is set.

mod test_utils;

use std::collections::HashSet;
use std::sync::Arc;

use coupon_common::models::{Admin, CouponStatus};
use coupon_core::auth::TokenIssuer;
use coupon_core::repositories::{
    AdminRepository, ClaimRepository, CouponRepository, PostgresAdminRepository,
    PostgresAllocationStore, PostgresClaimRepository, PostgresCouponRepository,
};
use coupon_core::services::{AdminService, AllocationService, CooldownGuard};
use coupon_core::Error;
use test_utils::helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_store() -> Result<(), Error> {
    let Some(db) = create_test_db().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping Postgres tests");
        return Ok(());
    };
    setup_test_database(&db).await?;

    let coupons = PostgresCouponRepository::new(db.pool().clone());
    let claims = PostgresClaimRepository::new(db.pool().clone());
    let admins = PostgresAdminRepository::new(db.pool().clone());
    let service = AllocationService::new(
        Arc::new(PostgresAllocationStore::new(db.pool().clone())),
        CooldownGuard::default(),
    );

    // Two-coupon scenario.
    seed_coupons(&coupons, &["A", "B"]).await?;
    let first = service.claim(&identity("10.0.0.1", "s1")).await?;
    assert_eq!(first.coupon.code, "A");
    let second = service.claim(&identity("10.0.0.2", "s2")).await?;
    assert_eq!(second.coupon.code, "B");
    assert!(matches!(
        service.claim(&identity("10.0.0.3", "s3")).await,
        Err(Error::PoolExhausted)
    ));
    assert!(matches!(
        service.claim(&identity("10.0.0.1", "fresh")).await,
        Err(Error::RateLimited { .. })
    ));

    let a = coupons.get_by_code("A").await?.expect("A exists");
    assert_eq!(a.status, CouponStatus::Claimed);
    assert_eq!(a.assigned_to.as_deref(), Some("10.0.0.1"));
    assert_eq!(claims.count().await?, 2);

    // Recycle and delete.
    let recycled = coupons.reset_to_pending(a.id).await?.expect("recycled");
    assert_eq!(recycled.status, CouponStatus::Pending);
    assert_eq!(recycled.assigned_to, None);
    assert!(coupons.delete(a.id).await?);
    assert!(!coupons.delete(a.id).await?);

    let ledger = claims.list_with_coupons().await?;
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].claim.ip, "10.0.0.2");
    assert!(ledger[1].coupon.is_none());

    // Concurrency: every claimant distinct, never more claims than coupons.
    let codes: Vec<String> = (0..10).map(|i| format!("P{}", i)).collect();
    let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    sqlx::query("DELETE FROM coupons").execute(db.pool()).await?;
    seed_coupons(&coupons, &refs).await?;

    let service = Arc::new(service);
    let mut handles = Vec::new();
    for i in 0..15 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .claim(&identity(&format!("172.16.0.{}", i), &format!("c{}", i)))
                .await
        }));
    }

    let mut won = HashSet::new();
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(outcome) => assert!(won.insert(outcome.coupon.code)),
            Err(Error::PoolExhausted) | Err(Error::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }
    assert_eq!(won.len(), 10);
    for coupon in coupons.list_all().await? {
        assert_eq!(coupon.status, CouponStatus::Claimed);
        assert!(coupon.is_consistent());
    }

    // Admin accounts.
    let admin = Admin::new("root", "hash".to_string());
    admins.create(&admin).await?;
    let dup = admins.create(&Admin::new("root", "other".to_string())).await;
    assert!(dup.is_err_and(|e| e.is_unique_violation()));
    let found = admins.get_by_username("root").await?.expect("admin exists");
    assert_eq!(found.admin_id, admin.admin_id);
    assert!(admins.get_by_username("ghost").await?.is_none());

    let service = AdminService::new(
        Arc::new(admins),
        Arc::new(coupons),
        Arc::new(claims),
        TokenIssuer::new(TEST_JWT_SECRET)?,
    )
        .with_password_iterations(TEST_PASSWORD_ITERATIONS);
    service.register("operator", "pw").await?;
    let token = service.login("operator", "pw").await?;
    assert_eq!(service.verify_token(&token)?.username, "operator");

    db.close().await;
    Ok(())
}
