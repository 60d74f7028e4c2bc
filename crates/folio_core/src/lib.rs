//! Core domain logic for the folio portfolio backend.
//! This crate is the single source of truth for record validation,
//! persistence and authentication rules.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::password::{
    hash_password, verify_password, verify_unknown_account, DEFAULT_BCRYPT_COST,
};
pub use auth::token::{AuthError, Claims, TokenSigner, MAX_TOKEN_TTL_DAYS};
pub use logging::{
    default_log_level, init_logging, logging_status, LogSettings, LogTarget, LoggingError,
};
pub use model::contact::{Contact, ContactForm, ContactId, ContactKind};
pub use model::project::{
    Category, Project, ProjectId, ProjectImages, ProjectInput, ProjectLinks, ProjectStatus, Seo,
};
pub use model::user::{Profile, Role, User, UserId};
pub use model::validation::ValidationError;
pub use repo::contact_repo::{ContactRepository, SqliteContactRepository};
pub use repo::project_repo::{ProjectListQuery, ProjectRepository, SqliteProjectRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{
    check_credentials, AuthService, LoginResult, NewAccount, RegisterRequest,
};
pub use service::contact_service::{ContactPage, ContactService, ContactStats, Pagination};
pub use service::project_service::{ProjectFilter, ProjectService};
pub use service::upload_store::{StoredUpload, UploadError, UploadStore};
pub use service::ServiceError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
