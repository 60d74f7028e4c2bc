use folio_core::db::open_db_in_memory;
use folio_core::{
    Category, ProjectFilter, ProjectInput, ProjectService, ServiceError, SqliteProjectRepository,
};
use rusqlite::Connection;
use serde_json::json;

fn service(conn: &Connection) -> ProjectService<SqliteProjectRepository<'_>> {
    ProjectService::new(SqliteProjectRepository::new(conn))
}

fn input(value: serde_json::Value) -> ProjectInput {
    serde_json::from_value(value).unwrap()
}

fn published(title: &str, technologies: &[&str], order: i64) -> ProjectInput {
    input(json!({
        "title": title,
        "shortDescription": "Short",
        "description": "A longer description of the project.",
        "technologies": technologies,
        "images": { "thumbnail": "/api/uploads/projects/thumb.png" },
        "startDate": "2024-01-15",
        "displayOrder": order,
        "isPublished": true
    }))
}

#[test]
fn create_persists_project_and_derives_slug() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);

    let created = projects
        .create(published("My Awesome Project!", &["Rust", "Axum"], 0))
        .unwrap();
    assert_eq!(created.slug, "my-awesome-project");
    assert_eq!(created.technologies, vec!["Rust", "Axum"]);
    assert_eq!(created.category, Category::WebDevelopment);

    let loaded = projects.get(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn duplicate_titles_receive_suffixed_slugs() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);

    let first = projects.create(published("Same Name", &["Rust"], 0)).unwrap();
    let second = projects.create(published("Same Name", &["Rust"], 0)).unwrap();
    let third = projects.create(published("Same Name", &["Rust"], 0)).unwrap();
    assert_eq!(first.slug, "same-name");
    assert_eq!(second.slug, "same-name-2");
    assert_eq!(third.slug, "same-name-3");
}

#[test]
fn create_without_technologies_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);

    let err = projects.create(published("Empty", &[], 0)).unwrap_err();
    match err {
        ServiceError::Validation(validation) => assert_eq!(validation.field, "technologies"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(projects.count().unwrap(), 0);
}

#[test]
fn public_listing_hides_drafts_and_applies_filters() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);

    let rust = projects.create(published("Rust Tool", &["Rust"], 2)).unwrap();
    let react = projects
        .create(published("React App", &["React", "TypeScript"], 1))
        .unwrap();
    let mut draft = published("Draft", &["Rust"], 0);
    draft.is_published = Some(false);
    projects.create(draft).unwrap();
    projects
        .update(
            rust.id,
            ProjectInput {
                is_featured: Some(true),
                ..ProjectInput::default()
            },
        )
        .unwrap();

    let public = projects.list_public(ProjectFilter::default()).unwrap();
    let ids: Vec<_> = public.iter().map(|project| project.id).collect();
    assert_eq!(ids, vec![react.id, rust.id]);

    let by_technology = projects
        .list_public(ProjectFilter {
            technology: Some("rust".to_string()),
            ..ProjectFilter::default()
        })
        .unwrap();
    assert_eq!(by_technology.len(), 1);
    assert_eq!(by_technology[0].id, rust.id);

    let featured = projects
        .list_public(ProjectFilter {
            is_featured: Some(true),
            ..ProjectFilter::default()
        })
        .unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].id, rust.id);

    assert_eq!(projects.list_all().unwrap().len(), 3);
}

#[test]
fn public_detail_counts_views_and_hides_drafts() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);

    let live = projects.create(published("Live", &["Rust"], 0)).unwrap();
    assert_eq!(projects.get_public(live.id).unwrap().views, 1);
    assert_eq!(projects.get_public(live.id).unwrap().views, 2);
    assert_eq!(projects.get(live.id).unwrap().views, 2);

    let mut draft = published("Hidden", &["Rust"], 0);
    draft.is_published = Some(false);
    let hidden = projects.create(draft).unwrap();
    assert!(matches!(
        projects.get_public(hidden.id),
        Err(ServiceError::NotFound("project", _))
    ));
}

#[test]
fn update_merges_fields_and_reslugs_on_title_change() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);

    projects.create(published("Taken Name", &["Rust"], 0)).unwrap();
    let project = projects.create(published("Original", &["Rust"], 0)).unwrap();

    let updated = projects
        .update(
            project.id,
            input(json!({
                "title": "Taken Name",
                "technologies": "Rust, SQLite",
                "endDate": "2024-06-01"
            })),
        )
        .unwrap();
    assert_eq!(updated.slug, "taken-name-2");
    assert_eq!(updated.technologies, vec!["Rust", "SQLite"]);
    assert_eq!(updated.short_description, "Short");
    assert!(updated.end_date.is_some());

    let cleared = projects
        .update(project.id, input(json!({ "endDate": "" })))
        .unwrap();
    assert!(cleared.end_date.is_none());
    assert_eq!(cleared.slug, "taken-name-2");
}

#[test]
fn update_rejects_invalid_merge_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);
    let project = projects.create(published("Stable", &["Rust"], 0)).unwrap();

    let err = projects
        .update(project.id, input(json!({ "endDate": "2020-01-01" })))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(projects.get(project.id).unwrap().end_date.is_none());
}

#[test]
fn delete_removes_project_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let projects = service(&conn);
    let project = projects.create(published("Gone", &["Rust"], 0)).unwrap();

    projects.delete(project.id).unwrap();
    assert!(matches!(
        projects.get(project.id),
        Err(ServiceError::NotFound("project", _))
    ));
    assert!(matches!(
        projects.delete(project.id),
        Err(ServiceError::NotFound("project", _))
    ));
}
