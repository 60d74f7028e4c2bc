//! User account model.
//!
//! # Invariants
//! - `username` is trimmed and 3..=30 characters.
//! - `email` is trimmed and lowercased before validation and persistence.
//! - `password_hash` holds a bcrypt hash and is never serialized.
//! - `role` is the only authorization input; `Admin` unlocks content
//!   management endpoints.

use crate::model::now_epoch_ms;
use crate::model::validation::{
    self, max_chars, min_chars, normalize_optional, optional_max_chars, require_text,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 30;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Authorization role carried in issued tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Optional display information attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl Profile {
    /// Trims every field and drops blank values.
    pub fn normalized(self) -> Self {
        Self {
            first_name: normalize_optional(self.first_name),
            last_name: normalize_optional(self.last_name),
            bio: normalize_optional(self.bio),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        optional_max_chars("firstName", "First name", self.first_name.as_deref(), 50)?;
        optional_max_chars("lastName", "Last name", self.last_name.as_deref(), 50)?;
        optional_max_chars("bio", "Bio", self.bio.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub profile: Profile,
    pub is_active: bool,
    /// Unix epoch milliseconds of the last successful login.
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Creates an active account with a generated id.
    ///
    /// Username and email are normalized here; the caller supplies an
    /// already-hashed password.
    pub fn new(
        username: &str,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
        profile: Profile,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            profile: profile.normalized(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_identity()?;
        if self.password_hash.is_empty() {
            return Err(ValidationError::new("password", "Password is required"));
        }
        Ok(())
    }

    /// Every rule except the password hash.
    pub fn validate_identity(&self) -> Result<(), ValidationError> {
        require_text("username", "Username", &self.username)?;
        min_chars("username", "Username", &self.username, USERNAME_MIN_CHARS)?;
        max_chars("username", "Username", &self.username, USERNAME_MAX_CHARS)?;
        require_text("email", "Email", &self.email)?;
        validation::email("email", &self.email)?;
        self.profile.validate()
    }
}

/// Checks a plain-text password before hashing.
pub fn validate_plain_password(password: &str) -> Result<(), ValidationError> {
    require_text("password", "Password", password)?;
    min_chars("password", "Password", password, PASSWORD_MIN_CHARS)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
