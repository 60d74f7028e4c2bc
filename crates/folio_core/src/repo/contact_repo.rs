//! Contact message repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing is newest first (`created_at DESC, id ASC`).
//! - Read state writes keep `is_read` and `read_at` consistent.

use crate::model::contact::{Contact, ContactId, ContactKind};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    subject,
    message,
    kind,
    phone,
    company,
    website,
    user_agent,
    is_read,
    read_at,
    created_at
FROM contacts";

/// Repository interface for contact message persistence.
pub trait ContactRepository {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    fn list_contacts(&self, limit: u32, offset: u64) -> RepoResult<Vec<Contact>>;
    fn set_read_state(&self, id: ContactId, is_read: bool, read_at: Option<i64>)
        -> RepoResult<()>;
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    fn count_contacts(&self) -> RepoResult<u64>;
    fn count_unread(&self) -> RepoResult<u64>;
    /// Counts messages with `created_at >= since_epoch_ms`.
    fn count_since(&self, since_epoch_ms: i64) -> RepoResult<u64>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn count_where(&self, clause: &str, bind: Option<i64>) -> RepoResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM contacts {clause};");
        let count: i64 = match bind {
            Some(value) => self.conn.query_row(&sql, [value], |row| row.get(0))?,
            None => self.conn.query_row(&sql, [], |row| row.get(0))?,
        };
        Ok(count.max(0) as u64)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        self.conn.execute(
            "INSERT INTO contacts (
                id,
                name,
                email,
                subject,
                message,
                kind,
                phone,
                company,
                website,
                user_agent,
                is_read,
                read_at,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                contact.id.to_string(),
                contact.name.as_str(),
                contact.email.as_str(),
                contact.subject.as_str(),
                contact.message.as_str(),
                contact.kind.as_str(),
                contact.phone.as_deref(),
                contact.company.as_deref(),
                contact.website.as_deref(),
                contact.user_agent.as_deref(),
                bool_to_int(contact.is_read),
                contact.read_at,
                contact.created_at,
            ],
        )?;

        Ok(contact.id)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_contact_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_contacts(&self, limit: u32, offset: u64) -> RepoResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             ORDER BY created_at DESC, id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let mut rows = stmt.query(params![i64::from(limit), offset])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }

    fn set_read_state(
        &self,
        id: ContactId,
        is_read: bool,
        read_at: Option<i64>,
    ) -> RepoResult<()> {
        if is_read != read_at.is_some() {
            return Err(RepoError::InvalidData(
                "read_at must be set exactly when is_read is true".to_string(),
            ));
        }

        let changed = self.conn.execute(
            "UPDATE contacts SET is_read = ?2, read_at = ?3 WHERE id = ?1;",
            params![id.to_string(), bool_to_int(is_read), read_at],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound("contact", id));
        }
        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound("contact", id));
        }
        Ok(())
    }

    fn count_contacts(&self) -> RepoResult<u64> {
        self.count_where("", None)
    }

    fn count_unread(&self) -> RepoResult<u64> {
        self.count_where("WHERE is_read = 0", None)
    }

    fn count_since(&self, since_epoch_ms: i64) -> RepoResult<u64> {
        self.count_where("WHERE created_at >= ?1", Some(since_epoch_ms))
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id_text: String = row.get("id")?;
    let kind_text: String = row.get("kind")?;
    let kind = ContactKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in contacts.kind"))
    })?;

    let contact = Contact {
        id: parse_uuid("contacts.id", &id_text)?,
        name: row.get("name")?,
        email: row.get("email")?,
        subject: row.get("subject")?,
        message: row.get("message")?,
        kind,
        phone: row.get("phone")?,
        company: row.get("company")?,
        website: row.get("website")?,
        user_agent: row.get("user_agent")?,
        is_read: int_to_bool("contacts.is_read", row.get("is_read")?)?,
        read_at: row.get("read_at")?,
        created_at: row.get("created_at")?,
    };
    contact.validate()?;
    Ok(contact)
}
