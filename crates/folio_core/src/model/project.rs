//! Portfolio project model.
//!
//! # Responsibility
//! - Define the persisted project record and its wire shape.
//! - Turn loosely-typed admin input into a validated record.
//!
//! # Invariants
//! - `slug` is derived from `title` and only changes when the title does.
//! - `technologies` is never empty for a stored project.
//! - `end_date`, when set, is not earlier than `start_date`.

use crate::model::now_epoch_ms;
use crate::model::validation::{
    max_chars, normalize_list, normalize_optional, optional_http_url, optional_max_chars,
    require_text, ValidationError,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

static SLUG_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid slug strip regex"));
static SLUG_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const FALLBACK_SLUG: &str = "project";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    WebDevelopment,
    MobileApp,
    DesktopApp,
    Api,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebDevelopment => "web-development",
            Self::MobileApp => "mobile-app",
            Self::DesktopApp => "desktop-app",
            Self::Api => "api",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "web-development" => Some(Self::WebDevelopment),
            "mobile-app" => Some(Self::MobileApp),
            "desktop-app" => Some(Self::DesktopApp),
            "api" => Some(Self::Api),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    #[default]
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planning" => Some(Self::Planning),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "on-hold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

/// Thumbnail plus optional carousel images. Values are URLs or upload paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectImages {
    pub thumbnail: String,
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectLinks {
    pub live_demo: Option<String>,
    pub github: Option<String>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seo {
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub category: Category,
    pub images: ProjectImages,
    pub links: ProjectLinks,
    pub status: ProjectStatus,
    pub display_order: i64,
    pub is_featured: bool,
    pub is_published: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub seo: Seo,
    pub views: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Technology list accepted either as a JSON array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    Many(Vec<String>),
    Csv(String),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(values) => values,
            Self::Csv(text) => text.split(',').map(str::to_string).collect(),
        }
    }
}

/// Admin-supplied project fields.
///
/// Used for both create (absent required fields are validation errors) and
/// partial update (absent fields keep their stored value). An empty
/// `endDate` string clears the end date on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<StringList>,
    pub category: Option<Category>,
    pub images: Option<ProjectImages>,
    pub links: Option<ProjectLinks>,
    pub status: Option<ProjectStatus>,
    pub display_order: Option<i64>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub seo: Option<Seo>,
}

impl Project {
    /// Builds a new validated project from admin input.
    ///
    /// The slug is derived from the title; callers that need a unique slug
    /// must resolve collisions before persisting.
    pub fn create(input: ProjectInput) -> Result<Self, ValidationError> {
        let start_date = match input.start_date.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => parse_calendar_date("startDate", value)?,
            _ => {
                return Err(ValidationError::new(
                    "startDate",
                    "Project start date is required",
                ))
            }
        };

        let title = input.title.unwrap_or_default().trim().to_string();
        let now = now_epoch_ms();
        let mut project = Self {
            id: Uuid::new_v4(),
            slug: slugify(&title),
            title,
            short_description: input.short_description.unwrap_or_default().trim().to_string(),
            description: input.description.unwrap_or_default().trim().to_string(),
            technologies: normalize_list(
                input.technologies.map(StringList::into_vec).unwrap_or_default(),
            ),
            category: input.category.unwrap_or_default(),
            images: normalize_images(input.images.unwrap_or_default()),
            links: normalize_links(input.links.unwrap_or_default()),
            status: input.status.unwrap_or_default(),
            display_order: input.display_order.unwrap_or(0),
            is_featured: input.is_featured.unwrap_or(false),
            is_published: input.is_published.unwrap_or(false),
            start_date,
            end_date: None,
            seo: normalize_seo(input.seo.unwrap_or_default()),
            views: 0,
            created_at: now,
            updated_at: now,
        };
        if let Some(end) = input.end_date {
            project.end_date = parse_optional_date("endDate", &end)?;
        }

        project.validate()?;
        Ok(project)
    }

    /// Merges present input fields into this project and re-validates.
    ///
    /// Returns whether the title changed, in which case `slug` has been
    /// re-derived.
    pub fn apply(&mut self, input: ProjectInput) -> Result<bool, ValidationError> {
        let mut title_changed = false;
        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title != self.title {
                self.slug = slugify(&title);
                self.title = title;
                title_changed = true;
            }
        }
        if let Some(value) = input.short_description {
            self.short_description = value.trim().to_string();
        }
        if let Some(value) = input.description {
            self.description = value.trim().to_string();
        }
        if let Some(values) = input.technologies {
            self.technologies = normalize_list(values.into_vec());
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(images) = input.images {
            self.images = normalize_images(images);
        }
        if let Some(links) = input.links {
            self.links = normalize_links(links);
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(order) = input.display_order {
            self.display_order = order;
        }
        if let Some(flag) = input.is_featured {
            self.is_featured = flag;
        }
        if let Some(flag) = input.is_published {
            self.is_published = flag;
        }
        if let Some(start) = input.start_date {
            self.start_date = parse_calendar_date("startDate", start.trim())?;
        }
        if let Some(end) = input.end_date {
            self.end_date = parse_optional_date("endDate", &end)?;
        }
        if let Some(seo) = input.seo {
            self.seo = normalize_seo(seo);
        }

        self.validate()?;
        self.updated_at = now_epoch_ms();
        Ok(title_changed)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", "Project title", &self.title)?;
        max_chars("title", "Title", &self.title, 100)?;
        if self.slug.is_empty() {
            return Err(ValidationError::new("slug", "Project slug is required"));
        }
        require_text(
            "shortDescription",
            "Short description",
            &self.short_description,
        )?;
        max_chars(
            "shortDescription",
            "Short description",
            &self.short_description,
            200,
        )?;
        require_text("description", "Project description", &self.description)?;
        max_chars("description", "Description", &self.description, 2000)?;
        if self.technologies.is_empty() {
            return Err(ValidationError::new(
                "technologies",
                "At least one technology must be specified",
            ));
        }
        require_text("images.thumbnail", "Thumbnail image", &self.images.thumbnail)?;
        optional_http_url(
            "links.liveDemo",
            "Live demo",
            self.links.live_demo.as_deref(),
        )?;
        optional_http_url("links.github", "GitHub link", self.links.github.as_deref())?;
        optional_http_url(
            "links.documentation",
            "Documentation link",
            self.links.documentation.as_deref(),
        )?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::new(
                    "endDate",
                    "End date must be after start date",
                ));
            }
        }
        optional_max_chars(
            "seo.metaDescription",
            "Meta description",
            self.seo.meta_description.as_deref(),
            160,
        )?;
        if self.views < 0 {
            return Err(ValidationError::new("views", "View count cannot be negative"));
        }
        Ok(())
    }
}

/// Derives a URL-friendly identifier from a project title.
///
/// Lowercases, strips everything except ASCII letters, digits and
/// whitespace, then joins words with `-`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
    let joined = SLUG_SPACE_RE.replace_all(stripped.trim(), "-");
    let slug = joined.trim_matches('-').to_string();
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Parses `YYYY-MM-DD`, also accepting an RFC 3339 timestamp whose date
/// part is used as-is.
pub fn parse_calendar_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let date_part = match value.split_once('T') {
        Some((date, _)) => date,
        None => value,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ValidationError::new(field, format!("`{value}` is not a valid date")))
}

fn parse_optional_date(
    field: &'static str,
    value: &str,
) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_calendar_date(field, trimmed).map(Some)
}

fn normalize_images(images: ProjectImages) -> ProjectImages {
    ProjectImages {
        thumbnail: images.thumbnail.trim().to_string(),
        gallery: images
            .gallery
            .into_iter()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .collect(),
    }
}

fn normalize_links(links: ProjectLinks) -> ProjectLinks {
    ProjectLinks {
        live_demo: normalize_optional(links.live_demo),
        github: normalize_optional(links.github),
        documentation: normalize_optional(links.documentation),
    }
}

fn normalize_seo(seo: Seo) -> Seo {
    Seo {
        meta_description: normalize_optional(seo.meta_description),
        keywords: normalize_list(seo.keywords),
    }
}
