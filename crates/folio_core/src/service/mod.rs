//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - Service errors carry enough kind information for callers to pick a
//!   status code without inspecting messages.

use crate::auth::token::AuthError;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod auth_service;
pub mod contact_service;
pub mod project_service;
pub mod upload_store;

/// Error returned by every use-case service.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed field validation.
    Validation(ValidationError),
    /// Record kind and id that do not exist (or are hidden from the caller).
    NotFound(&'static str, Uuid),
    /// Write collides with an existing unique record.
    Conflict(String),
    /// Login failed; deliberately does not say which part was wrong.
    InvalidCredentials,
    /// Bearer token is missing, malformed, expired, or names no active user.
    Unauthorized(AuthError),
    /// Hashing or signing failure.
    Auth(AuthError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back did not find the record.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(kind, _) => write!(f, "{kind} not found"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::Unauthorized(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unauthorized(err) | Self::Auth(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(kind, id) => Self::NotFound(kind, id),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
