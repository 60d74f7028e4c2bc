//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - List order is `display_order ASC, created_at DESC, id ASC`.
//! - `slug` is unique; a duplicate write returns `RepoError::Conflict`.
//! - List-valued fields are stored as JSON arrays of strings.

use crate::model::project::{
    Category, Project, ProjectId, ProjectImages, ProjectLinks, ProjectStatus, Seo,
};
use crate::repo::{
    bool_to_int, decode_list, encode_list, int_to_bool, parse_uuid, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    title,
    slug,
    short_description,
    description,
    technologies,
    category,
    thumbnail,
    gallery,
    live_demo,
    github,
    documentation,
    status,
    display_order,
    is_featured,
    is_published,
    start_date,
    end_date,
    meta_description,
    keywords,
    views,
    created_at,
    updated_at
FROM projects";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter options for listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub published_only: bool,
    pub featured: Option<bool>,
    /// Case-insensitive exact match against one entry of `technologies`.
    pub technology: Option<String>,
    pub category: Option<Category>,
}

/// Repository interface for project persistence.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    /// Writes every mutable column of an existing project.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Returns whether `slug` is taken by a project other than `exclude`.
    fn slug_exists(&self, slug: &str, exclude: Option<ProjectId>) -> RepoResult<bool>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn increment_views(&self, id: ProjectId) -> RepoResult<()>;
    fn count_projects(&self) -> RepoResult<u64>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                id,
                title,
                slug,
                short_description,
                description,
                technologies,
                category,
                thumbnail,
                gallery,
                live_demo,
                github,
                documentation,
                status,
                display_order,
                is_featured,
                is_published,
                start_date,
                end_date,
                meta_description,
                keywords,
                views,
                created_at,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23
            );",
            params![
                project.id.to_string(),
                project.title.as_str(),
                project.slug.as_str(),
                project.short_description.as_str(),
                project.description.as_str(),
                encode_list(&project.technologies)?,
                project.category.as_str(),
                project.images.thumbnail.as_str(),
                encode_list(&project.images.gallery)?,
                project.links.live_demo.as_deref(),
                project.links.github.as_deref(),
                project.links.documentation.as_deref(),
                project.status.as_str(),
                project.display_order,
                bool_to_int(project.is_featured),
                bool_to_int(project.is_published),
                format_date(project.start_date),
                project.end_date.map(format_date),
                project.seo.meta_description.as_deref(),
                encode_list(&project.seo.keywords)?,
                project.views,
                project.created_at,
                project.updated_at,
            ],
        )?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = ?2,
                slug = ?3,
                short_description = ?4,
                description = ?5,
                technologies = ?6,
                category = ?7,
                thumbnail = ?8,
                gallery = ?9,
                live_demo = ?10,
                github = ?11,
                documentation = ?12,
                status = ?13,
                display_order = ?14,
                is_featured = ?15,
                is_published = ?16,
                start_date = ?17,
                end_date = ?18,
                meta_description = ?19,
                keywords = ?20,
                updated_at = ?21
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.title.as_str(),
                project.slug.as_str(),
                project.short_description.as_str(),
                project.description.as_str(),
                encode_list(&project.technologies)?,
                project.category.as_str(),
                project.images.thumbnail.as_str(),
                encode_list(&project.images.gallery)?,
                project.links.live_demo.as_deref(),
                project.links.github.as_deref(),
                project.links.documentation.as_deref(),
                project.status.as_str(),
                project.display_order,
                bool_to_int(project.is_featured),
                bool_to_int(project.is_published),
                format_date(project.start_date),
                project.end_date.map(format_date),
                project.seo.meta_description.as_deref(),
                encode_list(&project.seo.keywords)?,
                project.updated_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound("project", project.id));
        }
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    fn slug_exists(&self, slug: &str, exclude: Option<ProjectId>) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM projects
                WHERE slug = ?1
                  AND (?2 IS NULL OR id <> ?2)
            );",
            params![slug, exclude.map(|id| id.to_string())],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if query.published_only {
            sql.push_str(" AND is_published = 1");
        }

        if let Some(featured) = query.featured {
            sql.push_str(" AND is_featured = ?");
            bind_values.push(Value::Integer(bool_to_int(featured)));
        }

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }

        if let Some(technology) = query.technology.as_deref().map(str::trim) {
            if !technology.is_empty() {
                sql.push_str(
                    " AND EXISTS (
                        SELECT 1
                        FROM json_each(projects.technologies) tech
                        WHERE tech.value = ? COLLATE NOCASE
                    )",
                );
                bind_values.push(Value::Text(technology.to_string()));
            }
        }

        sql.push_str(" ORDER BY display_order ASC, created_at DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound("project", id));
        }
        Ok(())
    }

    fn increment_views(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects SET views = views + 1 WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound("project", id));
        }
        Ok(())
    }

    fn count_projects(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(table_column: &str, value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in {table_column}"))
    })
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in projects.category"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in projects.status"))
    })?;

    let start_text: String = row.get("start_date")?;
    let end_date = match row.get::<_, Option<String>>("end_date")? {
        Some(value) => Some(parse_date("projects.end_date", &value)?),
        None => None,
    };

    let technologies: String = row.get("technologies")?;
    let gallery: String = row.get("gallery")?;
    let keywords: String = row.get("keywords")?;

    let project = Project {
        id: parse_uuid("projects.id", &id_text)?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        short_description: row.get("short_description")?,
        description: row.get("description")?,
        technologies: decode_list("projects.technologies", &technologies)?,
        category,
        images: ProjectImages {
            thumbnail: row.get("thumbnail")?,
            gallery: decode_list("projects.gallery", &gallery)?,
        },
        links: ProjectLinks {
            live_demo: row.get("live_demo")?,
            github: row.get("github")?,
            documentation: row.get("documentation")?,
        },
        status,
        display_order: row.get("display_order")?,
        is_featured: int_to_bool("projects.is_featured", row.get("is_featured")?)?,
        is_published: int_to_bool("projects.is_published", row.get("is_published")?)?,
        start_date: parse_date("projects.start_date", &start_text)?,
        end_date,
        seo: Seo {
            meta_description: row.get("meta_description")?,
            keywords: decode_list("projects.keywords", &keywords)?,
        },
        views: row.get("views")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    project.validate()?;
    Ok(project)
}
