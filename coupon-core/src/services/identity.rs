use std::net::IpAddr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand_core::TryRngCore;

use crate::Error;

const SESSION_TOKEN_BYTES: usize = 32;

/// Who is asking for a coupon: the network address plus the session token
/// carried in the `session` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimantIdentity {
    pub ip: String,
    pub session: String,
}

/// Keeps a non-empty supplied session token, otherwise mints a new one.
/// Does not touch storage.
pub fn resolve_identity(addr: IpAddr, session: Option<&str>) -> Result<ClaimantIdentity, Error> {
    let supplied = session.map(str::trim).filter(|s| !s.is_empty());

    let session = match supplied {
        Some(token) => token.to_string(),
        None => generate_session_token()?,
    };

    Ok(ClaimantIdentity {
        ip: addr.to_string(),
        session,
    })
}

pub fn generate_session_token() -> Result<String, Error> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Internal(format!("session token rng: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
