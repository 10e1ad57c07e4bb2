// File: coupon-common/src/models/mod.rs
pub mod coupon;
pub mod claim;
pub mod admin;

pub use coupon::{Coupon, CouponStatus, PoolStats};
pub use claim::{ClaimRecord, ClaimWithCoupon};
pub use admin::{Admin, AdminClaims};
