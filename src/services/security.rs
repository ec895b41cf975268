use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{AppError, Result};

/// Random bytes behind an invite token (48 hex characters)
pub const INVITE_TOKEN_BYTES: usize = 24;

/// Random bytes behind a join-link token (32 hex characters)
pub const JOIN_LINK_TOKEN_BYTES: usize = 16;

const MAGIC_LINK_TOKEN_TYPE: &str = "magic_link";

const BCRYPT_COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

// In-memory magic-link secret cache
static MAGIC_LINK_SECRET: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

/// Claims carried by a magic-link login code
#[derive(Debug, Serialize, Deserialize)]
pub struct MagicLinkClaims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub token_type: String,
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Generate a cryptographically secure random token of `bytes` random bytes, hex encoded
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Get the magic-link signing secret, generating a temporary one when not configured
fn magic_link_secret() -> String {
    {
        let cache = MAGIC_LINK_SECRET.read();
        if let Some(secret) = cache.as_ref() {
            return secret.clone();
        }
    }

    let mut cache = MAGIC_LINK_SECRET.write();
    if let Some(secret) = cache.as_ref() {
        return secret.clone();
    }

    let secret = match &CONFIG.auth.magic_link_secret {
        Some(secret) => secret.clone(),
        None => {
            tracing::warn!("CURIO_MAGIC_LINK_SECRET not set, generating temporary secret");
            generate_token(32)
        }
    };
    *cache = Some(secret.clone());
    secret
}

/// Create a signed magic-link login code for a user
pub fn create_magic_link_code(user_id: i64, email: &str) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::minutes(CONFIG.auth.magic_link_ttl_minutes);

    let claims = MagicLinkClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
        token_type: MAGIC_LINK_TOKEN_TYPE.to_string(),
    };

    let key = EncodingKey::from_secret(magic_link_secret().as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| e.into())
}

/// Decode and validate a magic-link login code, returning the user id
pub fn verify_magic_link_code(code: &str) -> Result<i64> {
    let key = DecodingKey::from_secret(magic_link_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let claims = decode::<MagicLinkClaims>(code, &key, &validation)?.claims;

    if claims.token_type != MAGIC_LINK_TOKEN_TYPE {
        return Err(AppError::Unauthorized("Invalid login code".to_string()));
    }

    claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid login code".to_string()))
}

/// Restrict post-login redirects to local absolute paths
///
/// Only visible ASCII is accepted, since browsers drop tabs and newlines
/// while parsing a URL and would turn `/\t/host` into `//host`.
pub fn sanitize_redirect(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && path.chars().all(|c| c.is_ascii_graphic())
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains("://") =>
        {
            path.to_string()
        }
        _ => "/dashboard".to_string(),
    }
}
