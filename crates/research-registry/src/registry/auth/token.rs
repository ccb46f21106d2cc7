use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::super::domain::Role;

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, or `guest` for anonymous read-only sessions.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// HS256 signer and verifier for access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(
        &self,
        subject: &str,
        email: &str,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "registry-test-secret-with-enough-length";

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let signer = TokenSigner::new(SECRET, Duration::hours(24));
        let token = signer
            .issue("usr-000001", "host@research.local", Role::Host)
            .expect("signs");

        let claims = signer.verify(&token).expect("verifies");
        assert_eq!(claims.sub, "usr-000001");
        assert_eq!(claims.role, Role::Host);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = TokenSigner::new("another-secret-entirely", Duration::hours(1))
            .issue("usr-000001", "a@b.c", Role::Guest)
            .expect("signs");
        assert!(TokenSigner::new(SECRET, Duration::hours(1))
            .verify(&token)
            .is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Beyond the default 60 second leeway.
        let signer = TokenSigner::new(SECRET, Duration::minutes(-5));
        let token = signer.issue("usr-1", "a@b.c", Role::CoHost).expect("signs");
        assert!(signer.verify(&token).is_err());
    }
}
