//! Contact-form message model.
//!
//! # Invariants
//! - `email` is stored lowercased.
//! - `read_at` is `Some` exactly when `is_read` is true.

use crate::model::now_epoch_ms;
use crate::model::validation::{
    self, is_valid_phone, max_chars, min_chars, normalize_optional, optional_http_url,
    optional_max_chars, require_text, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ContactId = Uuid;

pub const DEFAULT_SUBJECT: &str = "No Subject";
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactKind {
    #[default]
    General,
    ProjectInquiry,
    JobOpportunity,
    Collaboration,
    Feedback,
}

impl ContactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::ProjectInquiry => "project-inquiry",
            Self::JobOpportunity => "job-opportunity",
            Self::Collaboration => "collaboration",
            Self::Feedback => "feedback",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "general" => Some(Self::General),
            "project-inquiry" => Some(Self::ProjectInquiry),
            "job-opportunity" => Some(Self::JobOpportunity),
            "collaboration" => Some(Self::Collaboration),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }
}

/// Public contact-form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ContactKind>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub user_agent: Option<String>,
    pub is_read: bool,
    pub read_at: Option<i64>,
    /// Submission time, Unix epoch milliseconds.
    pub created_at: i64,
}

impl Contact {
    /// Normalizes a submitted form into an unread message and validates it.
    pub fn from_form(form: ContactForm, user_agent: Option<String>) -> Result<Self, ValidationError> {
        let contact = Self {
            id: Uuid::new_v4(),
            name: form.name.unwrap_or_default().trim().to_string(),
            email: form.email.unwrap_or_default().trim().to_lowercase(),
            subject: normalize_optional(form.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            message: form.message.unwrap_or_default().trim().to_string(),
            kind: form.kind.unwrap_or_default(),
            phone: normalize_optional(form.phone),
            company: normalize_optional(form.company),
            website: normalize_optional(form.website),
            user_agent: normalize_optional(user_agent),
            is_read: false,
            read_at: None,
            created_at: now_epoch_ms(),
        };
        contact.validate()?;
        Ok(contact)
    }

    /// Sets the read flag, stamping or clearing `read_at` accordingly.
    pub fn set_read(&mut self, is_read: bool) {
        self.is_read = is_read;
        self.read_at = if is_read { Some(now_epoch_ms()) } else { None };
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", "Name", &self.name)?;
        max_chars("name", "Name", &self.name, 100)?;
        require_text("email", "Email", &self.email)?;
        validation::email("email", &self.email)?;
        max_chars("subject", "Subject", &self.subject, 200)?;
        require_text("message", "Message", &self.message)?;
        min_chars("message", "Message", &self.message, MESSAGE_MIN_CHARS)?;
        max_chars("message", "Message", &self.message, MESSAGE_MAX_CHARS)?;
        if let Some(phone) = self.phone.as_deref() {
            if !is_valid_phone(phone) {
                return Err(ValidationError::new(
                    "phone",
                    "Please enter a valid phone number",
                ));
            }
        }
        optional_max_chars("company", "Company name", self.company.as_deref(), 100)?;
        optional_http_url("website", "Website", self.website.as_deref())?;
        if self.is_read != self.read_at.is_some() {
            return Err(ValidationError::new(
                "readAt",
                "read timestamp does not match read flag",
            ));
        }
        Ok(())
    }
}
