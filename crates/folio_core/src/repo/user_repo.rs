//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `users.email` is stored lowercased; lookups lowercase their input.
//! - Username uniqueness is case-insensitive.

use crate::model::user::{normalize_email, Profile, Role, User, UserId};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password_hash,
    role,
    first_name,
    last_name,
    bio,
    is_active,
    last_login,
    created_at,
    updated_at
FROM users";

/// Repository interface for account persistence.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Returns whether any account already uses `username` or `email`.
    fn exists_by_username_or_email(&self, username: &str, email: &str) -> RepoResult<bool>;
    fn update_profile(&self, id: UserId, profile: &Profile, updated_at: i64) -> RepoResult<()>;
    fn touch_last_login(&self, id: UserId, at: i64) -> RepoResult<()>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                id,
                username,
                email,
                password_hash,
                role,
                first_name,
                last_name,
                bio,
                is_active,
                last_login,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.email.as_str(),
                user.password_hash.as_str(),
                user.role.as_str(),
                user.profile.first_name.as_deref(),
                user.profile.last_name.as_deref(),
                user.profile.bio.as_deref(),
                bool_to_int(user.is_active),
                user.last_login,
                user.created_at,
                user.updated_at,
            ],
        )?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([normalize_email(email)])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn exists_by_username_or_email(&self, username: &str, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM users
                WHERE username = ?1 COLLATE NOCASE
                   OR email = ?2
            );",
            params![username.trim(), normalize_email(email)],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update_profile(&self, id: UserId, profile: &Profile, updated_at: i64) -> RepoResult<()> {
        profile.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                first_name = ?2,
                last_name = ?3,
                bio = ?4,
                updated_at = ?5
             WHERE id = ?1;",
            params![
                id.to_string(),
                profile.first_name.as_deref(),
                profile.last_name.as_deref(),
                profile.bio.as_deref(),
                updated_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound("user", id));
        }
        Ok(())
    }

    fn touch_last_login(&self, id: UserId, at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET last_login = ?2 WHERE id = ?1;",
            params![id.to_string(), at],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound("user", id));
        }
        Ok(())
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

/// Sets the active flag directly; used by operator tooling and tests.
pub fn set_user_active(conn: &Connection, id: UserId, is_active: bool) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE users SET is_active = ?2 WHERE id = ?1;",
        params![id.to_string(), bool_to_int(is_active)],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound("user", id));
    }
    Ok(())
}

/// Returns the id of any admin account, if one exists.
pub fn find_any_admin(conn: &Connection) -> RepoResult<Option<UserId>> {
    let id: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE role = 'admin' ORDER BY created_at ASC LIMIT 1;",
            [],
            |row| row.get(0),
        )
        .optional()?;
    id.map(|value| parse_uuid("users.id", &value)).transpose()
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    let user = User {
        id: parse_uuid("users.id", &id_text)?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role,
        profile: Profile {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            bio: row.get("bio")?,
        },
        is_active: int_to_bool("users.is_active", row.get("is_active")?)?,
        last_login: row.get("last_login")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    user.validate()?;
    Ok(user)
}
