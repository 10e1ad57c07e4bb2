use chrono::{DateTime, Duration, Utc};

use coupon_common::models::ClaimRecord;
use crate::Error;

pub const DEFAULT_COOLDOWN_SECS: i64 = 5 * 60;

/// One successful claim per identity per window.
#[derive(Debug, Clone, Copy)]
pub struct CooldownGuard {
    cooldown: Duration,
}

impl Default for CooldownGuard {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

impl CooldownGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// `latest` is the newest ledger entry matching the claimant's address
    /// or session; anything older does not matter.
    pub fn check(&self, latest: Option<&ClaimRecord>, now: DateTime<Utc>) -> Result<(), Error> {
        let Some(claim) = latest else {
            return Ok(());
        };

        let elapsed = now - claim.claimed_at;
        if elapsed < self.cooldown {
            let remaining = (self.cooldown - elapsed).num_seconds().max(1) as u64;
            return Err(Error::rate_limited(
                "You must wait before claiming again.",
                Some(remaining),
            ));
        }
        Ok(())
    }
}
