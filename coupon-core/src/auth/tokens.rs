use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use coupon_common::models::{Admin, AdminClaims};
use crate::Error;

/// Admin access tokens expire one hour after issuance.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Issues and verifies HS256 admin access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Result<Self, Error> {
        Self::with_ttl(secret, Duration::seconds(ACCESS_TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Result<Self, Error> {
        if secret.is_empty() {
            return Err(Error::Config("JWT secret must not be empty".to_string()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn issue(&self, admin: &Admin) -> Result<String, Error> {
        let iat = Utc::now();
        let claims = AdminClaims {
            sub: admin.admin_id,
            username: admin.username.clone(),
            iat: iat.timestamp(),
            exp: (iat + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Any decode failure (bad signature, expired, malformed) is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<AdminClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin::new("root", "unused".to_string())
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = TokenIssuer::new(b"secret").unwrap();
        let a = admin();
        let claims = issuer.verify(&issuer.issue(&a).unwrap()).unwrap();
        assert_eq!(claims.sub, a.admin_id);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECS);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenIssuer::new(b"one").unwrap().issue(&admin()).unwrap();
        let other = TokenIssuer::new(b"two").unwrap();
        assert!(matches!(other.verify(&token), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::with_ttl(b"secret", Duration::seconds(-120)).unwrap();
        let token = issuer.issue(&admin()).unwrap();
        assert!(matches!(issuer.verify(&token), Err(Error::Unauthorized(_))));
    }
}
