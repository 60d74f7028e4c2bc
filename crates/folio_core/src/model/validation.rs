//! Field-level validation helpers shared by all record models.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.+").expect("valid url regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("valid phone regex"));

/// Rejection of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable reason, safe to return to API callers.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl Error for ValidationError {}

pub(crate) type ValidationResult = Result<(), ValidationError>;

/// Trims a value and maps blank input to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Trims a list of names, drops blanks and removes case-insensitive
/// duplicates. The first spelling wins.
pub fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(trimmed))
        {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

pub(crate) fn require_text(field: &'static str, label: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{label} is required")));
    }
    Ok(())
}

pub(crate) fn max_chars(
    field: &'static str,
    label: &str,
    value: &str,
    max: usize,
) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("{label} cannot exceed {max} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn min_chars(
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
) -> ValidationResult {
    if value.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("{label} must be at least {min} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn optional_max_chars(
    field: &'static str,
    label: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult {
    match value {
        Some(value) => max_chars(field, label, value, max),
        None => Ok(()),
    }
}

pub(crate) fn email(field: &'static str, value: &str) -> ValidationResult {
    if !is_valid_email(value) {
        return Err(ValidationError::new(
            field,
            "Please provide a valid email address",
        ));
    }
    Ok(())
}

pub(crate) fn optional_http_url(
    field: &'static str,
    label: &str,
    value: Option<&str>,
) -> ValidationResult {
    match value {
        Some(url) if !HTTP_URL_RE.is_match(url) => Err(ValidationError::new(
            field,
            format!("{label} must be a valid URL"),
        )),
        _ => Ok(()),
    }
}

/// Returns whether `value` has a `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns whether `value` is an optional `+` followed by up to 16 digits
/// without a leading zero.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}
