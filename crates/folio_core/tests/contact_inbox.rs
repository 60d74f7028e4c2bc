use chrono::{Duration, TimeZone, Utc};
use folio_core::db::open_db_in_memory;
use folio_core::{
    ContactForm, ContactKind, ContactRepository, ContactService, ServiceError,
    SqliteContactRepository,
};
use rusqlite::{params, Connection};

fn service(conn: &Connection) -> ContactService<SqliteContactRepository<'_>> {
    ContactService::new(SqliteContactRepository::new(conn))
}

fn form(name: &str) -> ContactForm {
    ContactForm {
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        message: Some("Hello, I would like to talk about a project.".to_string()),
        ..ContactForm::default()
    }
}

#[test]
fn submit_stores_unread_message_with_defaults() {
    let conn = open_db_in_memory().unwrap();
    let contacts = service(&conn);

    let contact = contacts
        .submit(form("Alice"), Some("Mozilla/5.0".to_string()))
        .unwrap();
    assert_eq!(contact.subject, "No Subject");
    assert_eq!(contact.kind, ContactKind::General);
    assert!(!contact.is_read);
    assert_eq!(contact.user_agent.as_deref(), Some("Mozilla/5.0"));

    let repo = SqliteContactRepository::new(&conn);
    assert_eq!(repo.get_contact(contact.id).unwrap(), Some(contact));
}

#[test]
fn submit_rejects_short_message_and_bad_email() {
    let conn = open_db_in_memory().unwrap();
    let contacts = service(&conn);

    let mut short = form("Bob");
    short.message = Some("too short".to_string());
    assert!(matches!(
        contacts.submit(short, None),
        Err(ServiceError::Validation(_))
    ));

    let mut bad_email = form("Bob");
    bad_email.email = Some("not-an-email".to_string());
    assert!(matches!(
        contacts.submit(bad_email, None),
        Err(ServiceError::Validation(_))
    ));
    assert_eq!(contacts.count().unwrap(), 0);
}

#[test]
fn list_pages_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let contacts = service(&conn);
    let mut ids = Vec::new();
    for index in 0..5 {
        let contact = contacts.submit(form(&format!("Sender{index}")), None).unwrap();
        conn.execute(
            "UPDATE contacts SET created_at = ?2 WHERE id = ?1;",
            params![contact.id.to_string(), 1_000 + index],
        )
        .unwrap();
        ids.push(contact.id);
    }

    let first = contacts.list(Some(1), Some(2)).unwrap();
    assert_eq!(first.pagination.total, 5);
    assert_eq!(first.pagination.pages, 3);
    assert_eq!(first.pagination.current, 1);
    let first_ids: Vec<_> = first.items.iter().map(|item| item.id).collect();
    assert_eq!(first_ids, vec![ids[4], ids[3]]);

    let last = contacts.list(Some(3), Some(2)).unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, ids[0]);

    let beyond = contacts.list(Some(9), Some(2)).unwrap();
    assert!(beyond.items.is_empty());

    let defaults = contacts.list(None, None).unwrap();
    assert_eq!(defaults.pagination.limit, 10);
    assert_eq!(defaults.items.len(), 5);
}

#[test]
fn viewing_marks_read_and_toggle_flips_state() {
    let conn = open_db_in_memory().unwrap();
    let contacts = service(&conn);
    let contact = contacts.submit(form("Carol"), None).unwrap();

    let viewed = contacts.get_and_mark_read(contact.id).unwrap();
    assert!(viewed.is_read);
    assert!(viewed.read_at.is_some());

    let toggled = contacts.toggle_read(contact.id).unwrap();
    assert!(!toggled.is_read);
    assert!(toggled.read_at.is_none());

    let repo = SqliteContactRepository::new(&conn);
    let stored = repo.get_contact(contact.id).unwrap().unwrap();
    assert!(!stored.is_read);
    assert!(stored.read_at.is_none());
}

#[test]
fn missing_contact_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let contacts = service(&conn);
    let id = uuid::Uuid::new_v4();

    assert!(matches!(
        contacts.get_and_mark_read(id),
        Err(ServiceError::NotFound("contact", _))
    ));
    assert!(matches!(
        contacts.delete(id),
        Err(ServiceError::NotFound("contact", _))
    ));
}

#[test]
fn stats_count_unread_and_today_from_utc_midnight() {
    let conn = open_db_in_memory().unwrap();
    let contacts = service(&conn);
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap();

    let yesterday = contacts.submit(form("Old"), None).unwrap();
    let morning = contacts.submit(form("Early"), None).unwrap();
    let read = contacts.submit(form("Read"), None).unwrap();
    let stamps = [
        (yesterday.id, now - Duration::hours(16)),
        (morning.id, now - Duration::hours(15)),
        (read.id, now - Duration::hours(1)),
    ];
    for (id, at) in stamps {
        conn.execute(
            "UPDATE contacts SET created_at = ?2 WHERE id = ?1;",
            params![id.to_string(), at.timestamp_millis()],
        )
        .unwrap();
    }
    contacts.get_and_mark_read(read.id).unwrap();

    let stats = contacts.stats_at(now).unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.unread, 2);
    assert_eq!(stats.read, 1);
    assert_eq!(stats.today, 2);
}
