//! Admin password hashing.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<b64 salt>$<b64 hash>`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use rand_core::TryRngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::Error;

const SCHEME: &str = "pbkdf2-sha256";
pub const DEFAULT_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub fn hash_password_with_iterations(password: &str, iterations: u32) -> Result<String, Error> {
    if iterations == 0 {
        return Err(Error::Config("pbkdf2 iterations must be > 0".to_string()));
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| Error::Internal(format!("salt rng: {}", e)))?;

    let hash = derive(password.as_bytes(), &salt, iterations)?;
    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        BASE64.encode(salt),
        BASE64.encode(hash)
    ))
}

/// Constant-time check of `password` against an encoded hash. Malformed
/// encodings never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt), BASE64.decode(expected)) else {
        return false;
    };
    if iterations == 0 || expected.len() != HASH_LEN {
        return false;
    }

    match derive(password.as_bytes(), &salt, iterations) {
        Ok(actual) => actual[..].ct_eq(&expected[..]).unwrap_u8() == 1,
        Err(_) => false,
    }
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> Result<[u8; HASH_LEN], Error> {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut out)
        .map_err(|e| Error::Internal(format!("pbkdf2: {}", e)))?;
    Ok(out)
}
