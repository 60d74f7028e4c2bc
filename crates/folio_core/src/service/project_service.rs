//! Project use-case service.
//!
//! # Responsibility
//! - Public listing/detail of published projects.
//! - Admin create/update/delete with slug uniqueness.
//!
//! # Invariants
//! - Unpublished projects are reported as not found on public paths.
//! - Slugs are unique; collisions get a numeric suffix (`-2`, `-3`, ...).
//! - Update uses partial-merge semantics followed by full validation.

use crate::model::project::{Category, Project, ProjectId, ProjectInput};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use serde::Deserialize;

/// Public listing filters, as sent in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFilter {
    pub is_featured: Option<bool>,
    pub technology: Option<String>,
    pub category: Option<Category>,
}

pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists published projects matching `filter`.
    pub fn list_public(&self, filter: ProjectFilter) -> ServiceResult<Vec<Project>> {
        let query = ProjectListQuery {
            published_only: true,
            featured: filter.is_featured,
            technology: filter.technology,
            category: filter.category,
        };
        Ok(self.repo.list_projects(&query)?)
    }

    /// Lists every project, published or not.
    pub fn list_all(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.list_projects(&ProjectListQuery::default())?)
    }

    /// Returns a published project and counts the view.
    pub fn get_public(&self, id: ProjectId) -> ServiceResult<Project> {
        let mut project = match self.repo.get_project(id)? {
            Some(project) if project.is_published => project,
            _ => return Err(ServiceError::NotFound("project", id)),
        };
        self.repo.increment_views(id)?;
        project.views += 1;
        Ok(project)
    }

    pub fn get(&self, id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .get_project(id)?
            .ok_or(ServiceError::NotFound("project", id))
    }

    pub fn create(&self, input: ProjectInput) -> ServiceResult<Project> {
        let mut project = Project::create(input)?;
        project.slug = self.unique_slug(&project.slug, None)?;

        let id = self.repo.create_project(&project)?;
        info!(
            "event=project_create module=service status=ok project_id={} slug={}",
            id, project.slug
        );
        self.repo
            .get_project(id)?
            .ok_or(ServiceError::InconsistentState(
                "created project not found in read-back",
            ))
    }

    pub fn update(&self, id: ProjectId, input: ProjectInput) -> ServiceResult<Project> {
        let mut project = self.get(id)?;
        let title_changed = project.apply(input)?;
        if title_changed {
            project.slug = self.unique_slug(&project.slug, Some(id))?;
        }

        self.repo.update_project(&project)?;
        info!("event=project_update module=service status=ok project_id={id}");
        self.repo
            .get_project(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated project not found in read-back",
            ))
    }

    pub fn delete(&self, id: ProjectId) -> ServiceResult<()> {
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }

    pub fn count(&self) -> ServiceResult<u64> {
        Ok(self.repo.count_projects()?)
    }

    fn unique_slug(&self, base: &str, exclude: Option<ProjectId>) -> ServiceResult<String> {
        if !self.repo.slug_exists(base, exclude)? {
            return Ok(base.to_string());
        }
        let mut suffix = 2_u32;
        loop {
            let candidate = format!("{base}-{suffix}");
            if !self.repo.slug_exists(&candidate, exclude)? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}
