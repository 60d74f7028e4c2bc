use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use folio_core::{
    db::{open_db, DbError},
    AuthService, ContactService, ProjectService, SqliteContactRepository,
    SqliteProjectRepository, SqliteUserRepository, TokenSigner, UploadStore,
};
use rusqlite::Connection;
use thiserror::Error;

use super::{config::Config, error::ApiError};

pub type SharedState = Arc<AppState>;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("database: {0}")]
    Db(#[from] DbError),

    #[error("token signer: {0}")]
    Signer(#[from] folio_core::AuthError),
}

/// Process-wide handles shared by every request.
pub struct AppState {
    pub config: Config,
    pub signer: TokenSigner,
    pub uploads: UploadStore,
    db: Mutex<Connection>,
    started_at: Instant,
}

impl AppState {
    /// Opens the configured database file and builds the shared state.
    pub fn open(config: Config) -> Result<SharedState, StateError> {
        let conn = open_db(&config.db_path)?;
        Self::with_connection(config, conn)
    }

    /// Builds state around an already-migrated connection.
    pub fn with_connection(config: Config, conn: Connection) -> Result<SharedState, StateError> {
        let signer = TokenSigner::new(&config.jwt_secret, config.token_ttl_days)?;
        let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);

        Ok(Arc::new(Self {
            config,
            signer,
            uploads,
            db: Mutex::new(conn),
            started_at: Instant::now(),
        }))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn auth_service<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> AuthService<SqliteUserRepository<'conn>> {
        AuthService::new(
            SqliteUserRepository::new(conn),
            self.signer.clone(),
            self.config.bcrypt_cost,
        )
    }

    pub fn project_service<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> ProjectService<SqliteProjectRepository<'conn>> {
        ProjectService::new(SqliteProjectRepository::new(conn))
    }

    pub fn contact_service<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> ContactService<SqliteContactRepository<'conn>> {
        ContactService::new(SqliteContactRepository::new(conn))
    }

    fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }
}

/// Runs `task` against the shared connection on the blocking pool.
///
/// The lock is held for the whole task; CPU-heavy work such as bcrypt
/// belongs in `blocking` instead.
pub async fn with_db<T, F>(state: &SharedState, task: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState, &Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    blocking(move || {
        let conn = state.lock_db()?;
        task(&state, &conn)
    })
    .await
}

/// Runs synchronous work on the blocking pool without the database lock.
pub async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}
