// src/repositories/mod.rs

pub mod postgres;
pub mod memory;

pub use coupon_common::traits::repository_traits::{
    AdminRepository, AllocationStore, AllocationTx, ClaimRepository, CouponRepository,
    ROTATION_POINTER_KEY,
};

pub use postgres::{
    PostgresAdminRepository, PostgresAllocationStore, PostgresClaimRepository,
    PostgresCouponRepository,
};
pub use memory::MemoryStore;
