// src/repositories/memory/mod.rs
//
// Process-local store implementing every repository trait. Used by the
// `--store memory` server mode and by the test suite, which needs no
// running Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use coupon_common::models::{Admin, ClaimRecord, ClaimWithCoupon, Coupon};
use coupon_common::traits::repository_traits::{
    AdminRepository, AllocationStore, AllocationTx, ClaimRepository, CouponRepository,
};
use crate::Error;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub coupons: Vec<Coupon>,
    pub claims: Vec<ClaimRecord>,
    pub admins: Vec<Admin>,
    pub rotation_pointer: Option<i64>,
}

impl MemoryState {
    fn sorted_coupons(&self) -> Vec<Coupon> {
        let mut coupons = self.coupons.clone();
        coupons.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        coupons
    }
}

/// Cheap to clone; clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// Current pointer value without initializing it.
    pub async fn rotation_pointer(&self) -> Option<i64> {
        self.state.lock().await.rotation_pointer
    }

    pub async fn set_rotation_pointer(&self, value: i64) {
        self.state.lock().await.rotation_pointer = Some(value);
    }

    /// Appends a ledger entry directly, bypassing the allocation flow.
    pub async fn insert_claim(&self, claim: ClaimRecord) {
        self.state.lock().await.claims.push(claim);
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Coupon>, Error> {
        Ok(self.state.lock().await.sorted_coupons())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, Error> {
        let state = self.state.lock().await;
        Ok(state.coupons.iter().find(|c| c.code == code).cloned())
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if state.coupons.iter().any(|c| c.code == coupon.code || c.id == coupon.id) {
            return Err(Error::AlreadyExists("Coupon already exists".to_string()));
        }
        state.coupons.push(coupon.clone());
        Ok(())
    }

    async fn reset_to_pending(&self, coupon_id: Uuid) -> Result<Option<Coupon>, Error> {
        let mut state = self.state.lock().await;
        match state.coupons.iter_mut().find(|c| c.id == coupon_id) {
            Some(coupon) => {
                coupon.reset();
                Ok(Some(coupon.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, coupon_id: Uuid) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        let before = state.coupons.len();
        state.coupons.retain(|c| c.id != coupon_id);
        Ok(state.coupons.len() != before)
    }
}

#[async_trait]
impl ClaimRepository for MemoryStore {
    async fn list_with_coupons(&self) -> Result<Vec<ClaimWithCoupon>, Error> {
        let state = self.state.lock().await;
        let mut claims = state.claims.clone();
        claims.sort_by(|a, b| b.claimed_at.cmp(&a.claimed_at).then(b.id.cmp(&a.id)));

        Ok(claims
            .into_iter()
            .map(|claim| {
                let coupon = state.coupons.iter().find(|c| c.id == claim.coupon_id).cloned();
                ClaimWithCoupon { claim, coupon }
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, Error> {
        Ok(self.state.lock().await.claims.len())
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn create(&self, admin: &Admin) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if state.admins.iter().any(|a| a.username == admin.username) {
            return Err(Error::AlreadyExists("Admin already exists".to_string()));
        }
        state.admins.push(admin.clone());
        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>, Error> {
        let state = self.state.lock().await;
        Ok(state.admins.iter().find(|a| a.username == username).cloned())
    }
}

#[async_trait]
impl AllocationStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn AllocationTx>, Error> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryAllocationTx { guard, staged }))
    }
}

/// Holds the store lock for its whole lifetime and works on a staged copy;
/// `commit` swaps the copy in, dropping discards it.
pub struct MemoryAllocationTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl AllocationTx for MemoryAllocationTx {
    async fn read_pointer(&mut self) -> Result<i64, Error> {
        Ok(*self.staged.rotation_pointer.get_or_insert(0))
    }

    async fn write_pointer(&mut self, value: i64) -> Result<(), Error> {
        self.staged.rotation_pointer = Some(value);
        Ok(())
    }

    async fn latest_claim_for(&mut self, ip: &str, session: &str) -> Result<Option<ClaimRecord>, Error> {
        Ok(self
            .staged
            .claims
            .iter()
            .filter(|c| c.matches(ip, session))
            .max_by_key(|c| c.claimed_at)
            .cloned())
    }

    async fn pending_coupons(&mut self) -> Result<Vec<Coupon>, Error> {
        Ok(self
            .staged
            .sorted_coupons()
            .into_iter()
            .filter(Coupon::is_pending)
            .collect())
    }

    async fn mark_claimed(&mut self, coupon_id: Uuid, assigned_to: &str) -> Result<bool, Error> {
        match self
            .staged
            .coupons
            .iter_mut()
            .find(|c| c.id == coupon_id && c.is_pending())
        {
            Some(coupon) => {
                coupon.mark_claimed(assigned_to);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_claim(&mut self, claim: &ClaimRecord) -> Result<(), Error> {
        self.staged.claims.push(claim.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        let MemoryAllocationTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
