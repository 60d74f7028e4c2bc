//! Contact message use-case service.
//!
//! # Invariants
//! - Page numbers start at 1; limit defaults to 10 and clamps to 100.
//! - Viewing a message through `get_and_mark_read` marks it read.
//! - "today" in stats means since 00:00 UTC of the current day.

use crate::model::contact::{Contact, ContactForm, ContactId};
use crate::repo::contact_repo::ContactRepository;
use crate::service::{ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

const CONTACTS_DEFAULT_LIMIT: u32 = 10;
const CONTACTS_LIMIT_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: u32,
    pub pages: u64,
    pub total: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPage {
    pub items: Vec<Contact>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContactStats {
    pub total: u64,
    pub unread: u64,
    pub read: u64,
    pub today: u64,
}

pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a public contact-form submission.
    pub fn submit(&self, form: ContactForm, user_agent: Option<String>) -> ServiceResult<Contact> {
        let contact = Contact::from_form(form, user_agent)?;
        self.repo.create_contact(&contact)?;
        info!(
            "event=contact_submit module=service status=ok contact_id={} kind={}",
            contact.id,
            contact.kind.as_str()
        );
        Ok(contact)
    }

    /// Lists messages newest first.
    pub fn list(&self, page: Option<u32>, limit: Option<u32>) -> ServiceResult<ContactPage> {
        let current = page.filter(|value| *value > 0).unwrap_or(1);
        let limit = normalize_contact_limit(limit);
        let total = self.repo.count_contacts()?;
        let offset = u64::from(current - 1) * u64::from(limit);
        let items = self.repo.list_contacts(limit, offset)?;

        Ok(ContactPage {
            items,
            pagination: Pagination {
                current,
                pages: total.div_ceil(u64::from(limit)),
                total,
                limit,
            },
        })
    }

    /// Fetches one message, marking it read if it was unread.
    pub fn get_and_mark_read(&self, id: ContactId) -> ServiceResult<Contact> {
        let mut contact = self.require(id)?;
        if !contact.is_read {
            contact.set_read(true);
            self.repo
                .set_read_state(id, contact.is_read, contact.read_at)?;
        }
        Ok(contact)
    }

    /// Flips the read flag.
    pub fn toggle_read(&self, id: ContactId) -> ServiceResult<Contact> {
        let mut contact = self.require(id)?;
        contact.set_read(!contact.is_read);
        self.repo
            .set_read_state(id, contact.is_read, contact.read_at)?;
        Ok(contact)
    }

    pub fn delete(&self, id: ContactId) -> ServiceResult<()> {
        self.repo.delete_contact(id)?;
        info!("event=contact_delete module=service status=ok contact_id={id}");
        Ok(())
    }

    pub fn stats(&self) -> ServiceResult<ContactStats> {
        self.stats_at(Utc::now())
    }

    /// Computes stats with "today" anchored to the UTC day containing `now`.
    pub fn stats_at(&self, now: DateTime<Utc>) -> ServiceResult<ContactStats> {
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp_millis())
            .ok_or(ServiceError::InconsistentState("cannot compute UTC midnight"))?;

        let total = self.repo.count_contacts()?;
        let unread = self.repo.count_unread()?;
        let today = self.repo.count_since(midnight)?;
        Ok(ContactStats {
            total,
            unread,
            read: total.saturating_sub(unread),
            today,
        })
    }

    pub fn count(&self) -> ServiceResult<u64> {
        Ok(self.repo.count_contacts()?)
    }

    fn require(&self, id: ContactId) -> ServiceResult<Contact> {
        self.repo
            .get_contact(id)?
            .ok_or(ServiceError::NotFound("contact", id))
    }
}

/// Normalizes a requested page size.
pub fn normalize_contact_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => CONTACTS_DEFAULT_LIMIT,
        Some(value) if value > CONTACTS_LIMIT_MAX => CONTACTS_LIMIT_MAX,
        Some(value) => value,
    }
}
