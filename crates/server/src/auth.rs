//! Bearer-token issuing and validation.
//!
//! Tokens are HS256 JWTs. A login yields an access token, used on every
//! authenticated route, and a longer-lived refresh token that can only be
//! traded for a new access token.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_SECRET_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
    #[error("token cannot be used here")]
    WrongType,
    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    token_type: TokenType,
}

pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    pub(crate) fn issue(
        &self,
        username: &str,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let iat = now.timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat,
            exp: iat.saturating_add(ttl),
            token_type,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    pub fn issue_access(&self, username: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue(username, TokenType::Access, now)
    }

    pub fn issue_refresh(&self, username: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue(username, TokenType::Refresh, now)
    }

    /// Returns the username of a valid, unexpired token of `expected` type.
    pub(crate) fn verify(&self, token: &str, expected: TokenType) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |err| {
                tracing::debug!("rejected token: {err}");
                TokenError::Invalid
            },
        )?;
        if data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(data.claims.sub)
    }

    pub fn verify_access(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token, TokenType::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token, TokenType::Refresh)
    }
}

/// Accepts a base64 encoded secret or, failing that, the raw bytes of the
/// string. Either way it must be at least 32 bytes long.
pub fn decode_secret_key(raw: &str) -> Result<Vec<u8>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("auth secret cannot be empty".to_string());
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) if bytes.len() >= MIN_SECRET_BYTES => bytes,
        _ => trimmed.as_bytes().to_vec(),
    };
    if decoded.len() < MIN_SECRET_BYTES {
        return Err(format!(
            "auth secret must be at least {MIN_SECRET_BYTES} bytes"
        ));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        TokenManager::new(&AuthConfig {
            secret: b"0123456789abcdef0123456789abcdef".to_vec(),
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(86_400),
        })
    }

    #[test]
    fn access_token_round_trips_the_username() {
        let tokens = manager();
        let token = tokens.issue_access("alice", Utc::now()).unwrap();
        assert_eq!(tokens.verify_access(&token).unwrap(), "alice");
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let tokens = manager();
        let refresh = tokens.issue_refresh("alice", Utc::now()).unwrap();
        let access = tokens.issue_access("alice", Utc::now()).unwrap();
        assert!(matches!(
            tokens.verify_access(&refresh),
            Err(TokenError::WrongType)
        ));
        assert!(matches!(
            tokens.verify_refresh(&access),
            Err(TokenError::WrongType)
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let tokens = manager();
        let issued = Utc::now() - chrono::Duration::hours(1);
        let token = tokens.issue_access("alice", issued).unwrap();
        assert!(matches!(tokens.verify_access(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let other = TokenManager::new(&AuthConfig {
            secret: b"ffffffffffffffffffffffffffffffff".to_vec(),
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(300),
        });
        let token = other.issue_access("alice", Utc::now()).unwrap();
        assert!(matches!(manager().verify_access(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn secrets_may_be_raw_or_base64() {
        let raw = "a-raw-secret-that-is-long-enough!!";
        assert_eq!(decode_secret_key(raw).unwrap(), raw.as_bytes());

        let encoded = BASE64.encode([7u8; 32]);
        assert_eq!(decode_secret_key(&encoded).unwrap(), vec![7u8; 32]);

        assert!(decode_secret_key("short").is_err());
        assert!(decode_secret_key("   ").is_err());
    }
}
