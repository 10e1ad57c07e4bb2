use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use coupon_common::models::{Admin, AdminClaims, ClaimWithCoupon, Coupon, CouponStatus, PoolStats};
use coupon_common::traits::repository_traits::{AdminRepository, ClaimRepository, CouponRepository};
use crate::auth::password::{hash_password_with_iterations, verify_password, DEFAULT_ITERATIONS};
use crate::auth::TokenIssuer;
use crate::Error;

/// Result of `add_coupon`: either a fresh coupon or a recycled one.
#[derive(Debug, Clone)]
pub enum AddCouponOutcome {
    Created(Coupon),
    Recycled(Coupon),
}

impl AddCouponOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            AddCouponOutcome::Created(_) => "Coupon added.",
            AddCouponOutcome::Recycled(_) => "Coupon recycled.",
        }
    }

    pub fn coupon(&self) -> &Coupon {
        match self {
            AddCouponOutcome::Created(c) | AddCouponOutcome::Recycled(c) => c,
        }
    }

    pub fn into_coupon(self) -> Coupon {
        match self {
            AddCouponOutcome::Created(c) | AddCouponOutcome::Recycled(c) => c,
        }
    }
}

/// Registration, login and pool management for the dashboard.
pub struct AdminService {
    admin_repo: Arc<dyn AdminRepository>,
    coupon_repo: Arc<dyn CouponRepository>,
    claim_repo: Arc<dyn ClaimRepository>,
    tokens: TokenIssuer,
    password_iterations: u32,
}

impl AdminService {
    pub fn new(
        admin_repo: Arc<dyn AdminRepository>,
        coupon_repo: Arc<dyn CouponRepository>,
        claim_repo: Arc<dyn ClaimRepository>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            admin_repo,
            coupon_repo,
            claim_repo,
            tokens,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    /// PBKDF2 work factor for newly registered admins.
    pub fn with_password_iterations(mut self, iterations: u32) -> Self {
        self.password_iterations = iterations;
        self
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Admin, Error> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput("Username and password required".to_string()));
        }

        if self.admin_repo.get_by_username(username).await?.is_some() {
            return Err(Error::AlreadyExists("Admin already exists".to_string()));
        }

        let admin = Admin::new(
            username,
            hash_password_with_iterations(password, self.password_iterations)?,
        );
        match self.admin_repo.create(&admin).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                return Err(Error::AlreadyExists("Admin already exists".to_string()));
            }
            Err(e) => return Err(e),
        }

        info!("Registered admin '{}'", admin.username);
        Ok(admin)
    }

    /// Returns a signed access token valid for one hour.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, Error> {
        let admin = self
            .admin_repo
            .get_by_username(username.trim())
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password(password, &admin.password_hash) {
            warn!("Failed login for admin '{}'", admin.username);
            return Err(Error::InvalidCredentials);
        }

        self.tokens.issue(&admin)
    }

    pub fn verify_token(&self, token: &str) -> Result<AdminClaims, Error> {
        self.tokens.verify(token)
    }

    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, Error> {
        self.coupon_repo.list_all().await
    }

    /// Adds `code` to the pool. A claimed coupon with the same code is put
    /// back into rotation instead; a pending one is a duplicate.
    pub async fn add_coupon(&self, code: &str) -> Result<AddCouponOutcome, Error> {
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::InvalidInput("Coupon code is required".to_string()));
        }

        if let Some(existing) = self.coupon_repo.get_by_code(code).await? {
            return match existing.status {
                CouponStatus::Pending => {
                    Err(Error::AlreadyExists("Coupon already exists".to_string()))
                }
                CouponStatus::Claimed => {
                    let reset = self
                        .coupon_repo
                        .reset_to_pending(existing.id)
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("coupon {}", existing.id)))?;
                    info!("Recycled coupon '{}'", reset.code);
                    Ok(AddCouponOutcome::Recycled(reset))
                }
            };
        }

        let coupon = Coupon::new(code);
        match self.coupon_repo.insert(&coupon).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                return Err(Error::AlreadyExists("Coupon already exists".to_string()));
            }
            Err(e) => return Err(e),
        }

        info!("Added coupon '{}'", coupon.code);
        Ok(AddCouponOutcome::Created(coupon))
    }

    /// Ledger entries pointing at the coupon are kept.
    pub async fn delete_coupon(&self, coupon_id: Uuid) -> Result<(), Error> {
        if !self.coupon_repo.delete(coupon_id).await? {
            return Err(Error::NotFound(format!("coupon {}", coupon_id)));
        }
        info!("Deleted coupon {}", coupon_id);
        Ok(())
    }

    pub async fn list_claims(&self) -> Result<Vec<ClaimWithCoupon>, Error> {
        self.claim_repo.list_with_coupons().await
    }

    pub async fn pool_stats(&self) -> Result<PoolStats, Error> {
        let coupons = self.coupon_repo.list_all().await?;
        let pending = coupons.iter().filter(|c| c.is_pending()).count();
        Ok(PoolStats {
            total: coupons.len(),
            pending,
            claimed: coupons.len() - pending,
            claims: self.claim_repo.count().await?,
        })
    }
}
