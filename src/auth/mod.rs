use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{sha256_hex, SecurityConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();
        Self { sub: username.into(), iat: now.timestamp(), exp }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl JwtError {
    /// True when the caller presented a bad token, false for server-side faults
    pub fn is_client_error(&self) -> bool {
        matches!(self, JwtError::Expired | JwtError::InvalidToken(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Issued token handed back to a client after login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginToken {
    pub token: String,
    pub username: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Single-administrator login and HS256 token issuing/checking
pub struct AuthService {
    secret: String,
    expiry_hours: u64,
    admin_username: String,
    admin_password_sha256: String,
}

impl AuthService {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiry_hours: config.jwt_expiry_hours,
            admin_username: config.admin_username.clone(),
            admin_password_sha256: config.admin_password_sha256.to_lowercase(),
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginToken, AuthError> {
        // an unset digest never matches
        let password_ok = !self.admin_password_sha256.is_empty()
            && digests_match(&sha256_hex(password), &self.admin_password_sha256);
        if username != self.admin_username || !password_ok {
            tracing::warn!(username = %username, "Rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::new(username, self.expiry_hours);
        let expires_in = claims.exp - claims.iat;
        let token = self.generate_jwt(&claims)?;
        tracing::info!(username = %username, "Issued token");

        Ok(LoginToken { token, username: username.to_string(), expires_in })
    }

    pub fn generate_jwt(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn validate_jwt(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }
}

/// Compares every byte regardless of where the first difference is
fn digests_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
