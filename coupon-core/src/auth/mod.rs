// =============================================================================
// coupon-core/src/auth/mod.rs
// =============================================================================

pub mod password;
pub mod tokens;

pub use password::{hash_password_with_iterations, verify_password, DEFAULT_ITERATIONS};
pub use tokens::{TokenIssuer, ACCESS_TOKEN_TTL_SECS};
