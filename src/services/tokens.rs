//! Bearer access tokens (HS256 JSON Web Tokens).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access::Identity;
use crate::domain::{Role, User};
use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    iat: i64,
    exp: i64,
}

/// A signed token and the moment it stops being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies access tokens carrying the user id and role.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<AccessToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Internal("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {e}")))?;
        Ok(AccessToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected access token");
            Error::Authentication("invalid or expired token".to_string())
        })?;
        Ok(Identity::new(data.claims.sub, data.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_carries_identity() {
        let tokens = TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1));
        let admin = user(Role::Admin);

        let issued = tokens.issue(&admin).unwrap();
        let identity = tokens.verify(&issued.token).unwrap();

        assert_eq!(identity, Identity::new(admin.id, Role::Admin));
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::seconds(-120));
        let issued = tokens.issue(&user(Role::User)).unwrap();
        assert!(matches!(
            tokens.verify(&issued.token),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let tokens = TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::days(100_000_000));
        assert!(matches!(
            tokens.issue(&user(Role::User)),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let ours = TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1));
        let theirs = TokenService::new(b"fedcba9876543210fedcba9876543210", Duration::hours(1));
        let issued = theirs.issue(&user(Role::Admin)).unwrap();
        assert!(ours.verify(&issued.token).is_err());
        assert!(ours.verify("garbage").is_err());
    }
}
