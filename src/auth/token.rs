// Access token generation and validation

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;

/// Signed access-token claims: the user id plus the time box.
/// Roles are intentionally not embedded; the access guard resolves the
/// user record on every request, so role changes take effect immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless issuer and validator for signed access tokens
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_ttl: i64, // seconds
}

/// Default access-token lifetime: 15 minutes
pub const DEFAULT_ACCESS_TOKEN_TTL: i64 = 900;

impl TokenService {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
        }
    }

    pub fn with_access_ttl(secret: String, ttl_secs: i64) -> Self {
        Self {
            secret,
            access_token_ttl: ttl_secs,
        }
    }

    /// Issue a signed access token for a user id.
    /// Pure function of secret + input + current time; no side effects.
    pub fn issue_access_token(&self, user_id: i32) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.access_token_ttl,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[test]
    fn test_access_token_ttl_is_15_minutes() {
        let service = test_token_service();
        let token = service.issue_access_token(1).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_access_token_ttl_is_configurable() {
        let service = TokenService::with_access_ttl("secret".to_string(), 60);
        let token = service.issue_access_token(1).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_claims_carry_the_user_id() {
        let service = test_token_service();
        let token = service.issue_access_token(42).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn test_expired_token_is_rejected_as_expired() {
        let service = test_token_service();

        let claims = Claims {
            sub: 1,
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.validate_access_token("").is_err());
        assert!(service.validate_access_token("not.a.token").is_err());
        assert!(service
            .validate_access_token("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_signature_verification_across_secrets() {
        let service1 = TokenService::new("secret1".to_string());
        let service2 = TokenService::new("secret2".to_string());

        let token = service1.issue_access_token(1).unwrap();

        assert!(service1.validate_access_token(&token).is_ok());
        assert!(service2.validate_access_token(&token).is_err());
    }

    proptest! {
        #[test]
        fn prop_issued_tokens_round_trip(user_id in 1i32..1_000_000) {
            let service = test_token_service();
            let token = service.issue_access_token(user_id).unwrap();
            let claims = service.validate_access_token(&token).unwrap();

            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.exp - claims.iat, 900);
        }

        #[test]
        fn prop_random_strings_are_rejected(garbage in "[a-zA-Z0-9]{10,60}") {
            let service = test_token_service();
            prop_assert!(service.validate_access_token(&garbage).is_err());
        }
    }
}
