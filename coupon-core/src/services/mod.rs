// File: src/services/mod.rs

pub mod identity;
pub mod cooldown;
pub mod rotation;
pub mod allocation;
pub mod admin_service;

pub use identity::{resolve_identity, ClaimantIdentity};
pub use cooldown::CooldownGuard;
pub use allocation::{AllocationService, ClaimOutcome, MAX_CLAIM_ATTEMPTS};
pub use admin_service::{AddCouponOutcome, AdminService};
