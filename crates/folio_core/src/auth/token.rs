//! HS256 bearer tokens.

use crate::model::user::{Role, User, UserId};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
/// Longest accepted token lifetime (ten years).
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingSecret,
    InvalidLifetime(i64),
    InvalidToken,
    ExpiredToken,
    Signing(String),
    Hashing(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSecret => write!(f, "token secret must not be empty"),
            Self::InvalidLifetime(days) => write!(
                f,
                "token lifetime of {days} days is outside 1..={MAX_TOKEN_TTL_DAYS}"
            ),
            Self::InvalidToken => write!(f, "token is not valid"),
            Self::ExpiredToken => write!(f, "token has expired"),
            Self::Signing(message) => write!(f, "token signing failed: {message}"),
            Self::Hashing(message) => write!(f, "password hashing failed: {message}"),
        }
    }
}

impl Error for AuthError {}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: Role,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl Debug for TokenSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_days: i64) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&ttl_days) {
            return Err(AuthError::InvalidLifetime(ttl_days));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_days * SECS_PER_DAY,
        })
    }

    /// Issues a token for `user` valid from now for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, chrono::Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now_secs`.
    pub fn issue_at(&self, user: &User, now_secs: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now_secs,
            exp: now_secs.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Verifies signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;
        data.claims.user_id()?;
        Ok(data.claims)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
