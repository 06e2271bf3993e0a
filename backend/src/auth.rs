//! Identity collaborator: bearer-token issuance/verification and
//! password hashing. The domain layer never sees credentials, only
//! the resolved [`AuthUser`].

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::Role;

use crate::error::ApiError;
use crate::rest::AppState;

const DEFAULT_SECRET: &str = "haru_jwt_secret_2026";
const PASSWORD_SALT: &str = "haru_salt_2026";
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Signing/verification keys, built once at startup.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_env() -> Self {
        let secret =
            std::env::var("HARU_JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        Self::new(secret.as_bytes())
    }

    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT claims carried by every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Issue a bearer token for a user, valid for seven days.
pub fn issue_token(keys: &TokenKeys, user_id: &str, email: &str, role: Role) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    Ok(encode(&Header::default(), &claims, &keys.encoding)?)
}

/// Verify a bearer token. Returns `None` for anything invalid or
/// expired; callers translate that into a 401.
pub fn verify_token(keys: &TokenKeys, token: &str) -> Option<Claims> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .ok()
}

/// Salted SHA-256 password hash, hex-encoded.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(PASSWORD_SALT.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    hash_password(password) == hash
}

/// The authenticated caller, resolved from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(ApiError::unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(ApiError::unauthorized)?;

        let claims = verify_token(&state.token_keys, token).ok_or_else(ApiError::unauthorized)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> TokenKeys {
        TokenKeys::new(b"test_secret")
    }

    #[test]
    fn test_token_round_trip() {
        let keys = test_keys();
        let token = issue_token(&keys, "user_1", "mina@example.com", Role::Parent).unwrap();

        let claims = verify_token(&keys, &token).expect("Token should verify");
        assert_eq!(claims.sub, "user_1");
        assert_eq!(claims.email, "mina@example.com");
        assert_eq!(claims.role, Role::Parent);
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = issue_token(&test_keys(), "user_1", "a@b.c", Role::Child).unwrap();
        let other = TokenKeys::new(b"other_secret");
        assert!(verify_token(&other, &token).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token(&test_keys(), "not-a-token").is_none());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("secret123");
        assert_eq!(hash.len(), 64);
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_password("abc"), hash_password("abc"));
        assert_ne!(hash_password("abc"), hash_password("abd"));
    }
}
