use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use coupon_common::models::{ClaimRecord, Coupon};
use coupon_common::traits::repository_traits::AllocationStore;
use crate::services::cooldown::CooldownGuard;
use crate::services::identity::ClaimantIdentity;
use crate::services::rotation;
use crate::Error;

/// Attempts per claim before giving up on a lost conditional write.
pub const MAX_CLAIM_ATTEMPTS: usize = 3;

pub const CLAIM_SUCCESS_MESSAGE: &str = "Coupon claimed!";

#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub coupon: Coupon,
    pub claim: ClaimRecord,
    pub message: &'static str,
}

/// Picks the next pending coupon round-robin and records the claim.
pub struct AllocationService {
    store: Arc<dyn AllocationStore>,
    cooldown: CooldownGuard,
}

enum Attempt {
    Claimed(ClaimOutcome),
    LostRace,
}

impl AllocationService {
    pub fn new(store: Arc<dyn AllocationStore>, cooldown: CooldownGuard) -> Self {
        Self { store, cooldown }
    }

    pub fn cooldown(&self) -> &CooldownGuard {
        &self.cooldown
    }

    pub async fn claim(&self, identity: &ClaimantIdentity) -> Result<ClaimOutcome, Error> {
        self.claim_at(identity, Utc::now()).await
    }

    /// Same as [`claim`](Self::claim) with an explicit clock reading, which is
    /// used both for the cooldown check and as the ledger timestamp.
    pub async fn claim_at(
        &self,
        identity: &ClaimantIdentity,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome, Error> {
        for attempt in 1..=MAX_CLAIM_ATTEMPTS {
            match self.try_claim(identity, now).await? {
                Attempt::Claimed(outcome) => {
                    info!(
                        "Coupon '{}' claimed by ip={} (attempt {})",
                        outcome.coupon.code, identity.ip, attempt
                    );
                    return Ok(outcome);
                }
                Attempt::LostRace => {
                    warn!(
                        "Conditional coupon write lost for ip={} (attempt {}/{}), reloading pool",
                        identity.ip, attempt, MAX_CLAIM_ATTEMPTS
                    );
                }
            }
        }

        Err(Error::Conflict(format!(
            "coupon pool kept changing during {} claim attempts",
            MAX_CLAIM_ATTEMPTS
        )))
    }

    /// One transaction. Any early return drops `tx` uncommitted, which rolls
    /// every write back.
    async fn try_claim(
        &self,
        identity: &ClaimantIdentity,
        now: DateTime<Utc>,
    ) -> Result<Attempt, Error> {
        let mut tx = self.store.begin().await?;

        // Taking the pointer first also takes the claim lock.
        let pointer = tx.read_pointer().await?;

        let latest = tx.latest_claim_for(&identity.ip, &identity.session).await?;
        if let Err(e) = self.cooldown.check(latest.as_ref(), now) {
            debug!("Claim refused for ip={}: still in cooldown", identity.ip);
            return Err(e);
        }

        let pending = tx.pending_coupons().await?;
        if pending.is_empty() {
            debug!("Claim refused for ip={}: pool exhausted", identity.ip);
            return Err(Error::PoolExhausted);
        }

        let index = rotation::select_index(pointer, pending.len())?;
        let mut coupon = pending[index].clone();

        if !tx.mark_claimed(coupon.id, &identity.ip).await? {
            return Ok(Attempt::LostRace);
        }
        coupon.mark_claimed(&identity.ip);

        let claim = ClaimRecord::new(coupon.id, &identity.ip, &identity.session, now);
        tx.append_claim(&claim).await?;

        // Modulo the pending count as read above, before this claim.
        tx.write_pointer(rotation::advance(pointer, pending.len())?).await?;

        tx.commit().await?;

        Ok(Attempt::Claimed(ClaimOutcome {
            coupon,
            claim,
            message: CLAIM_SUCCESS_MESSAGE,
        }))
    }
}
