//! Persisted record models for users, projects and contact messages.
//!
//! # Responsibility
//! - Define the canonical records shared by storage, services and HTTP.
//! - Own field-level normalization and validation rules.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Timestamps are Unix epoch milliseconds (UTC).
//! - `validate()` must pass before a record reaches storage.

pub mod contact;
pub mod project;
pub mod user;
pub mod validation;

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
