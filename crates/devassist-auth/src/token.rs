//! HS256 JWT issuance and verification for access and refresh tokens.
//!
//! Both token kinds share one claim set; `token_use` keeps them apart so
//! a refresh token is never accepted where an access token is expected.

use chrono::Utc;
use devassist_core::models::user::{Role, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID, so tokens issued in the same second differ.
    pub jti: String,
    pub token_use: TokenUse,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))
    }
}

fn lifetime(token_use: TokenUse, config: &AuthConfig) -> i64 {
    let secs = match token_use {
        TokenUse::Access => config.access_token_lifetime_secs,
        TokenUse::Refresh => config.refresh_token_lifetime_secs,
    };
    secs as i64
}

/// Issue a signed HS256 token of the given kind for `user`.
pub fn issue_token(
    user: &User,
    token_use: TokenUse,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + lifetime(token_use, config),
        jti: Uuid::new_v4().to_string(),
        token_use,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify a token (signature, issuer, expiry) and check that
/// it is of the `expected` kind.
pub fn decode_token(
    token: &str,
    expected: TokenUse,
    config: &AuthConfig,
) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    let claims = jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })?;

    if claims.token_use != expected {
        return Err(AuthError::TokenInvalid("wrong token type".into()));
    }
    Ok(claims)
}

/// SHA-256 hash of a refresh token, hex-encoded.
///
/// This is the value stored as `user.refresh_token_hash`.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
