//! Account use-case service: registration, login, token authentication
//! and profile maintenance.
//!
//! # Invariants
//! - Self-registration always yields `Role::User`; admins come from
//!   `create_admin` (operator tooling only).
//! - Unknown email, wrong password and inactive account are
//!   indistinguishable to the caller.
//! - Passwords and tokens are never logged.
//! - bcrypt work happens in `NewAccount::prepare` and `check_credentials`,
//!   neither of which touches the repository, so callers can run it
//!   without holding the storage handle.

use crate::auth::password::{hash_password, verify_password, verify_unknown_account};
use crate::auth::token::{AuthError, TokenSigner};
use crate::model::now_epoch_ms;
use crate::model::user::{validate_plain_password, Profile, Role, User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};

const DUPLICATE_USER_MESSAGE: &str = "User with this email or username already exists";

/// Self-registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A validated account whose password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    user: User,
}

impl NewAccount {
    /// Validates the fields and hashes the password. Touches no storage.
    fn prepare(
        username: &str,
        email: &str,
        password: &str,
        role: Role,
        profile: Profile,
        bcrypt_cost: u32,
    ) -> ServiceResult<Self> {
        validate_plain_password(password)?;
        let mut user = User::new(username, email, String::new(), role, profile);
        user.validate_identity()?;
        user.password_hash = hash_password(password, bcrypt_cost)?;
        Ok(Self { user })
    }

    /// Self-registration always yields a regular user.
    pub fn from_registration(request: RegisterRequest, bcrypt_cost: u32) -> ServiceResult<Self> {
        let profile = Profile {
            first_name: request.first_name,
            last_name: request.last_name,
            bio: None,
        };
        Self::prepare(
            &request.username,
            &request.email,
            &request.password,
            Role::User,
            profile,
            bcrypt_cost,
        )
    }
}

/// Checks `password` against the account found for a login attempt.
///
/// A missing account still pays one bcrypt verification at `bcrypt_cost`.
/// Returns the id to finish the login with. Touches no storage.
pub fn check_credentials(
    candidate: Option<&User>,
    password: &str,
    bcrypt_cost: u32,
) -> ServiceResult<UserId> {
    let Some(user) = candidate else {
        verify_unknown_account(password, bcrypt_cost)?;
        warn!("event=user_login module=service status=error error_code=unknown_email");
        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(
            "event=user_login module=service status=error error_code=bad_password user_id={}",
            user.id
        );
        return Err(ServiceError::InvalidCredentials);
    }
    Ok(user.id)
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

pub struct AuthService<R: UserRepository> {
    repo: R,
    signer: TokenSigner,
    bcrypt_cost: u32,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: R, signer: TokenSigner, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            signer,
            bcrypt_cost,
        }
    }

    /// Creates a regular account and signs a token for it.
    pub fn register(&self, request: RegisterRequest) -> ServiceResult<LoginResult> {
        let account = NewAccount::from_registration(request, self.bcrypt_cost)?;
        self.register_prepared(account)
    }

    /// Stores a prepared registration and signs a token for it.
    pub fn register_prepared(&self, account: NewAccount) -> ServiceResult<LoginResult> {
        let user = self.insert_account(account)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            user.id
        );
        let token = self.signer.issue(&user)?;
        Ok(LoginResult { token, user })
    }

    /// Creates an admin account. Not reachable from the public API.
    pub fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
        profile: Profile,
    ) -> ServiceResult<User> {
        let account = NewAccount::prepare(
            username,
            email,
            password,
            Role::Admin,
            profile,
            self.bcrypt_cost,
        )?;
        let user = self.insert_account(account)?;
        info!(
            "event=admin_create module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Checks credentials, records the login time and signs a token.
    pub fn login(&self, email: &str, password: &str) -> ServiceResult<LoginResult> {
        let candidate = self.login_candidate(email)?;
        let user_id = check_credentials(candidate.as_ref(), password, self.bcrypt_cost)?;
        self.complete_login(user_id)
    }

    /// Looks up the account a login attempt names.
    pub fn login_candidate(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.repo.find_by_email(email)?)
    }

    /// Finishes a login whose password `check_credentials` accepted.
    ///
    /// Re-reads the account, so one deactivated or deleted in between is
    /// refused.
    pub fn complete_login(&self, user_id: UserId) -> ServiceResult<LoginResult> {
        let user = match self.repo.get_user(user_id)? {
            Some(user) if user.is_active => user,
            _ => {
                warn!(
                    "event=user_login module=service status=error error_code=inactive user_id={user_id}"
                );
                return Err(ServiceError::InvalidCredentials);
            }
        };

        self.repo.touch_last_login(user.id, now_epoch_ms())?;
        let user = self.require_user(user.id)?;
        let token = self.signer.issue(&user)?;
        info!(
            "event=user_login module=service status=ok user_id={}",
            user.id
        );
        Ok(LoginResult { token, user })
    }

    /// Resolves a bearer token to the active account it names.
    pub fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let claims = self
            .signer
            .verify(token)
            .map_err(ServiceError::Unauthorized)?;
        let user_id = claims.user_id().map_err(ServiceError::Unauthorized)?;
        match self.repo.get_user(user_id)? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(ServiceError::Unauthorized(AuthError::InvalidToken)),
        }
    }

    pub fn profile(&self, id: UserId) -> ServiceResult<User> {
        self.require_user(id)
    }

    /// Replaces the profile fields of an account.
    pub fn update_profile(&self, id: UserId, profile: Profile) -> ServiceResult<User> {
        let profile = profile.normalized();
        self.repo.update_profile(id, &profile, now_epoch_ms())?;
        self.repo
            .get_user(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated user not found in read-back",
            ))
    }

    pub fn count_users(&self) -> ServiceResult<u64> {
        Ok(self.repo.count_users()?)
    }

    fn insert_account(&self, account: NewAccount) -> ServiceResult<User> {
        let user = account.user;
        if self
            .repo
            .exists_by_username_or_email(&user.username, &user.email)?
        {
            return Err(ServiceError::Conflict(DUPLICATE_USER_MESSAGE.to_string()));
        }

        match self.repo.create_user(&user) {
            Ok(_) => {}
            Err(RepoError::Conflict(_)) => {
                return Err(ServiceError::Conflict(DUPLICATE_USER_MESSAGE.to_string()))
            }
            Err(err) => return Err(err.into()),
        }

        self.require_user(user.id)
    }

    fn require_user(&self, id: UserId) -> ServiceResult<User> {
        self.repo
            .get_user(id)?
            .ok_or(ServiceError::NotFound("user", id))
    }
}
