//! Signed bearer tokens — HS256 JWTs carrying the subject username and
//! an absolute expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject username
    pub sub: String,
    /// Expiry, seconds since epoch
    pub exp: usize,
}

pub struct TokenIssuer {
    secret: String,
    ttl_minutes: i64,
}

impl TokenIssuer {
    pub fn new(secret: String, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    /// Sign a token for `subject` expiring `ttl_minutes` from now.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = (Utc::now() + Duration::minutes(self.ttl_minutes)).timestamp() as usize;
        let claims = Claims {
            sub: subject.to_string(),
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify signature and expiry, returning the subject. Whether the
    /// subject still exists is the access gate's concern, not this one's.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims.sub)
        .map_err(|_| AuthError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let issuer = TokenIssuer::new("test-secret".to_string(), 30);

        let token = issuer.issue("alice").unwrap();
        let subject = issuer.validate(&token).unwrap();
        assert_eq!(subject, "alice");
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expiry two minutes in the past, beyond the default leeway.
        let issuer = TokenIssuer::new("test-secret".to_string(), -2);

        let token = issuer.issue("alice").unwrap();
        assert_eq!(issuer.validate(&token), Err(AuthError::InvalidCredential));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::new("test-secret".to_string(), 30);
        assert_eq!(
            issuer.validate("not.a.token"),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = TokenIssuer::new("secret-one".to_string(), 30);
        let verifier = TokenIssuer::new("secret-two".to_string(), 30);

        let token = signer.issue("alice").unwrap();
        assert_eq!(verifier.validate(&token), Err(AuthError::InvalidCredential));
    }
}
