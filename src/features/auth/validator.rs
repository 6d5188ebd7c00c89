use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::model::AuthenticatedUser;
use crate::core::error::AppError;

/// Validates the bearer tokens minted by the authentication gateway.
///
/// Tokens are HS256-signed with a secret shared with the gateway and carry
/// the user id in `sub` and the display name in `name`.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub exp: u64,
}

impl TokenValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(AuthenticatedUser {
            uid: token_data.claims.sub,
            name: token_data.claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn mint(secret: &str, sub: &str, name: &str) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 3600;
        let claims = Claims {
            sub: sub.to_string(),
            name: name.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_user() {
        let validator = TokenValidator::new("test-secret", Duration::from_secs(60));
        let token = mint("test-secret", "user-1", "Alice");

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.uid, "user-1");
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let validator = TokenValidator::new("test-secret", Duration::from_secs(60));
        let token = mint("other-secret", "user-1", "Alice");

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let validator = TokenValidator::new("test-secret", Duration::from_secs(60));
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}
