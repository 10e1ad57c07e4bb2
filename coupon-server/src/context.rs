//! coupon-server/src/context.rs
//!
//! Builds the store, services and HTTP state for the server.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderValue;
use tracing::{info, warn};

use coupon_common::traits::repository_traits::{
    AdminRepository, AllocationStore, ClaimRepository, CouponRepository,
};
use coupon_core::api::{ApiSettings, AppState};
use coupon_core::auth::TokenIssuer;
use coupon_core::repositories::{
    MemoryStore, PostgresAdminRepository, PostgresAllocationStore, PostgresClaimRepository,
    PostgresCouponRepository,
};
use coupon_core::services::identity::generate_session_token;
use coupon_core::services::{AdminService, AllocationService, CooldownGuard};
use coupon_core::throttle::ClaimThrottle;
use coupon_core::{Database, DatabaseSettings, Error};

use crate::{Args, StoreKind};

/// The four store handles every service is built from.
struct Stores {
    allocation: Arc<dyn AllocationStore>,
    coupons: Arc<dyn CouponRepository>,
    claims: Arc<dyn ClaimRepository>,
    admins: Arc<dyn AdminRepository>,
}

pub struct ServerContext {
    /// `None` for the memory store.
    pub db: Option<Database>,
    pub app_state: AppState,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        let (db, stores) = match args.store {
            StoreKind::Postgres => {
                let url = args.database_url.as_deref().ok_or_else(|| {
                    Error::Config("--database-url / DATABASE_URL is required for the postgres store".to_string())
                })?;
                let db = Database::connect(&DatabaseSettings::new(url, args.db_max_connections)).await?;
                db.migrate().await?;

                let pool = db.pool().clone();
                let stores = Stores {
                    allocation: Arc::new(PostgresAllocationStore::new(pool.clone())),
                    coupons: Arc::new(PostgresCouponRepository::new(pool.clone())),
                    claims: Arc::new(PostgresClaimRepository::new(pool.clone())),
                    admins: Arc::new(PostgresAdminRepository::new(pool)),
                };
                (Some(db), stores)
            }
            StoreKind::Memory => {
                warn!("Using the in-memory store; all coupons and claims are lost on exit.");
                let store = MemoryStore::new();
                let stores = Stores {
                    allocation: Arc::new(store.clone()),
                    coupons: Arc::new(store.clone()),
                    claims: Arc::new(store.clone()),
                    admins: Arc::new(store),
                };
                (None, stores)
            }
        };

        let secret = match args.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => s.to_string(),
            None => {
                warn!("JWT_SECRET not set; generated a random one. Admin tokens will not survive a restart.");
                generate_session_token()?
            }
        };
        let tokens = TokenIssuer::new(secret.as_bytes())?;

        if args.cooldown_secs < 0 {
            return Err(Error::Config("cooldown must not be negative".to_string()));
        }
        let cooldown = CooldownGuard::new(chrono::Duration::seconds(args.cooldown_secs));

        let throttle = ClaimThrottle::new(
            args.throttle_burst,
            Duration::from_secs(args.throttle_window_secs),
        )?;

        let cors_origin = if args.cors_origin.trim().is_empty() {
            None
        } else {
            Some(HeaderValue::from_str(args.cors_origin.trim()).map_err(|e| {
                Error::Config(format!("invalid CORS origin '{}': {}", args.cors_origin, e))
            })?)
        };

        let app_state = AppState {
            allocation: Arc::new(AllocationService::new(stores.allocation, cooldown)),
            admin: Arc::new(AdminService::new(
                stores.admins,
                stores.coupons,
                stores.claims,
                tokens,
            )),
            throttle,
            settings: Arc::new(ApiSettings {
                trust_forwarded_for: args.trust_forwarded_for,
                cors_origin,
            }),
        };

        info!("Server context ready.");
        Ok(Self { db, app_state })
    }
}
