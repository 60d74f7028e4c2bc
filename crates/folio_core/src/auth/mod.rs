//! Credential hashing and bearer-token signing.
//!
//! # Invariants
//! - Plain passwords exist only for the duration of one hash/verify call.
//! - Tokens carry the user id and role; the role is re-checked against
//!   storage by callers that authorize requests.

pub mod password;
pub mod token;
