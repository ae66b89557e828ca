//! Signed session tokens (HS256 JWT).
//!
//! The token only carries the user id; role and profile are always reloaded
//! from the store when a request is resolved, so a role change takes effect on
//! the next request.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("session subject is not a valid user id: {0}")]
    InvalidSubject(String),
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionSigner {
    #[must_use]
    pub fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Issue a token for `user_id` valid for the configured TTL.
    ///
    /// # Errors
    /// Returns an error if the token cannot be encoded.
    pub fn issue(&self, user_id: Uuid) -> Result<String, SessionError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        self.encode_claims(&claims)
    }

    /// Encode arbitrary claims. Exposed for tests that need expired tokens.
    ///
    /// # Errors
    /// Returns an error if the token cannot be encoded.
    pub fn encode_claims(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), claims, &key)?)
    }

    /// Verify signature and expiry, returning the user id.
    ///
    /// # Errors
    /// Returns an error for bad signatures, expired tokens or malformed subjects.
    pub fn verify(&self, token: &str) -> Result<Uuid, SessionError> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let data = decode::<SessionClaims>(token, &key, &Validation::new(Algorithm::HS256))?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| SessionError::InvalidSubject(data.claims.sub.clone()))
    }
}
