//! Bearer tokens for staff and registered customers
//!
//! Diners without a token act as guests. A token names its holder and one
//! [`Role`]; a token whose role this server does not know fails validation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use shared::Role;
use thiserror::Error;

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 key, at least 32 characters
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl JwtConfig {
    /// `JWT_SECRET`, `JWT_EXPIRATION_MINUTES`, `JWT_ISSUER`, `JWT_AUDIENCE`
    ///
    /// Without a usable secret a random one is generated; issued tokens then
    /// die with the process.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok();

        Self {
            secret: resolve_secret(var("JWT_SECRET")),
            expiration_minutes: var("JWT_EXPIRATION_MINUTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_MINUTES),
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "order-server".to_string()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "order-clients".to_string()),
        }
    }
}

fn resolve_secret(configured: Option<String>) -> String {
    match configured {
        Some(secret) if secret.len() >= MIN_SECRET_LEN => secret,
        Some(_) => {
            tracing::warn!(min_len = MIN_SECRET_LEN, "JWT_SECRET too short, using a random key");
            random_secret()
        }
        None => {
            tracing::warn!("JWT_SECRET not set, using a random key");
            random_secret()
        }
    }
}

/// 64 random alphanumeric characters
pub fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken(e.to_string()),
        }
    }
}

/// Issues and verifies tokens
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Sign a token for `user_id` acting as `role`
    pub fn issue(&self, user_id: &str, name: &str, role: Role) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            role,
            exp: (now + Duration::minutes(self.config.expiration_minutes)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Check signature, expiry, issuer and audience
    pub fn verify(&self, token: &str) -> Result<CurrentUser, JwtError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims.into())
    }

    /// Token part of an `Authorization: Bearer ...` header
    pub fn bearer(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::with_config(JwtConfig::default())
    }
}

/// 已认证用户
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> Json<()> {
///     if user.role.is_floor_staff() { ... }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.name,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            expiration_minutes: 60,
            issuer: "order-server".to_string(),
            audience: "order-clients".to_string(),
        })
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = service();
        let token = jwt.issue("w-7", "lan", Role::Waiter).unwrap();

        let user = jwt.verify(&token).unwrap();
        assert_eq!(user.id, "w-7");
        assert_eq!(user.username, "lan");
        assert_eq!(user.role, Role::Waiter);
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = service().issue("w-7", "lan", Role::Admin).unwrap();
        let other = JwtService::with_config(JwtConfig {
            secret: random_secret(),
            ..service().config
        });
        assert!(matches!(other.verify(&token), Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtService::with_config(JwtConfig {
            expiration_minutes: -10,
            ..service().config
        });
        let token = jwt.issue("c-1", "c-1", Role::Customer).unwrap();
        assert!(matches!(jwt.verify(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_other_audience_is_rejected() {
        let token = service().issue("c-1", "c-1", Role::Customer).unwrap();
        let other = JwtService::with_config(JwtConfig {
            audience: "someone-else".to_string(),
            ..service().config
        });
        assert!(matches!(other.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_bearer() {
        assert_eq!(JwtService::bearer("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::bearer("Bearer "), None);
        assert_eq!(JwtService::bearer("Basic abc"), None);
    }

    #[test]
    fn test_short_secret_is_replaced() {
        assert_eq!(resolve_secret(Some("short".to_string())).len(), 64);
        let long = "x".repeat(40);
        assert_eq!(resolve_secret(Some(long.clone())), long);
        assert_ne!(random_secret(), random_secret());
    }
}
