use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Fills `iat`/`exp` from the configured lifetime and signs.
    pub fn issue(&self, mut claims: Claims) -> Result<String> {
        let now = Utc::now();
        claims.iat = now.timestamp() as usize;
        claims.exp = (now + self.ttl).timestamp() as usize;
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign session token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            sub: "7f1c2b1e-9a4e-4bb1-8f61-0d7f4b1c2a11".into(),
            role: "hr".into(),
            email: "hr@acme.test".into(),
            name: "Asha".into(),
            company: Some("Acme".into()),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn issued_tokens_verify_with_the_same_secret_only() {
        let keys = SessionKeys::new("secret-a", 1);
        let token = keys.issue(claims()).unwrap();
        let decoded = keys.verify(&token).expect("valid token");
        assert_eq!(decoded.role, "hr");
        assert!(decoded.exp > decoded.iat);

        let other = SessionKeys::new("secret-b", 1);
        assert!(other.verify(&token).is_none());
        assert!(keys.verify("garbage").is_none());
    }
}
