//! bcrypt password hashing.

use crate::auth::token::AuthError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Work factor used for stored account hashes.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// One throwaway hash per cost, created on first use.
static DECOY_HASHES: Lazy<Mutex<HashMap<u32, String>>> = Lazy::new(Default::default);

/// Hashes `plain` with a fresh salt at the given bcrypt `cost` (4..=31).
pub fn hash_password(plain: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(plain, cost).map_err(|err| AuthError::Hashing(err.to_string()))
}

/// Checks `plain` against a stored bcrypt hash.
///
/// A malformed stored hash is reported as an error, not as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(plain, hash).map_err(|err| AuthError::Hashing(err.to_string()))
}

/// Spends one bcrypt verification at `cost` for a login whose account
/// does not exist, so it takes as long as a wrong password.
pub fn verify_unknown_account(plain: &str, cost: u32) -> Result<(), AuthError> {
    let decoy = decoy_hash(cost)?;
    verify_password(plain, &decoy).map(|_| ())
}

fn decoy_hash(cost: u32) -> Result<String, AuthError> {
    let mut cache = DECOY_HASHES
        .lock()
        .map_err(|_| AuthError::Hashing("decoy hash cache poisoned".to_string()))?;
    if let Some(hash) = cache.get(&cost) {
        return Ok(hash.clone());
    }
    let hash = hash_password(&Uuid::new_v4().to_string(), cost)?;
    cache.insert(cost, hash.clone());
    Ok(hash)
}
