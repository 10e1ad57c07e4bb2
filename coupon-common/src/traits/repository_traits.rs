use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::{Admin, ClaimRecord, ClaimWithCoupon, Coupon};

/// Key of the persisted rotation pointer.
pub const ROTATION_POINTER_KEY: &str = "lastAssignedIndex";

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// All coupons regardless of status, oldest first.
    async fn list_all(&self) -> Result<Vec<Coupon>, Error>;
    async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, Error>;
    async fn insert(&self, coupon: &Coupon) -> Result<(), Error>;

    /// Flip a claimed coupon back to pending and clear its assignment.
    /// Returns the updated coupon, or `None` if it no longer exists.
    async fn reset_to_pending(&self, coupon_id: Uuid) -> Result<Option<Coupon>, Error>;

    /// Returns `true` if a row was removed.
    async fn delete(&self, coupon_id: Uuid) -> Result<bool, Error>;
}

#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Every ledger entry, newest first, with the coupon joined in.
    async fn list_with_coupons(&self) -> Result<Vec<ClaimWithCoupon>, Error>;
    async fn count(&self) -> Result<usize, Error>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: &Admin) -> Result<(), Error>;
    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>, Error>;
}

/// Source of claim transactions.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn AllocationTx>, Error>;
}

/// One claim attempt. Everything written through it becomes visible on
/// `commit`; dropping it without committing discards every write.
///
/// Implementations must serialize transactions from the first
/// `read_pointer` call until commit/drop, so that two claims never observe
/// the same pointer value.
#[async_trait]
pub trait AllocationTx: Send {
    /// Locks and returns the rotation pointer, creating it as 0 if absent.
    async fn read_pointer(&mut self) -> Result<i64, Error>;
    async fn write_pointer(&mut self, value: i64) -> Result<(), Error>;

    /// Most recent ledger entry whose address OR session matches.
    async fn latest_claim_for(&mut self, ip: &str, session: &str) -> Result<Option<ClaimRecord>, Error>;

    /// Pending coupons, ordered by creation time (oldest first).
    async fn pending_coupons(&mut self) -> Result<Vec<Coupon>, Error>;

    /// Conditional write: only succeeds while the coupon is still pending.
    /// Returns `false` when the coupon was claimed or removed by someone else.
    async fn mark_claimed(&mut self, coupon_id: Uuid, assigned_to: &str) -> Result<bool, Error>;

    async fn append_claim(&mut self, claim: &ClaimRecord) -> Result<(), Error>;

    async fn commit(self: Box<Self>) -> Result<(), Error>;
}
