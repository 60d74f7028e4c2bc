use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use folio_core::{Project, ProjectFilter, ProjectId, ProjectInput};

use crate::{
    auth::AdminUser,
    error::ApiError,
    response::ApiResponse,
    state::{with_db, SharedState},
};

pub async fn list_handler(
    State(state): State<SharedState>,
    filter: Result<Query<ProjectFilter>, QueryRejection>,
) -> Result<ApiResponse<Vec<Project>>, ApiError> {
    let Query(filter) = filter?;
    let projects = with_db(&state, move |state, conn| {
        Ok(state.project_service(conn).list_public(filter)?)
    })
    .await?;

    Ok(ApiResponse::ok(projects))
}

pub async fn list_all_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
) -> Result<ApiResponse<Vec<Project>>, ApiError> {
    let projects = with_db(&state, |state, conn| {
        Ok(state.project_service(conn).list_all()?)
    })
    .await?;

    Ok(ApiResponse::ok(projects))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    id: Result<Path<ProjectId>, PathRejection>,
) -> Result<ApiResponse<Project>, ApiError> {
    let Path(id) = id?;
    let project = with_db(&state, move |state, conn| {
        Ok(state.project_service(conn).get_public(id)?)
    })
    .await?;

    Ok(ApiResponse::ok(project))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<ApiResponse<Project>, ApiError> {
    let Json(input) = payload?;
    let project = with_db(&state, move |state, conn| {
        Ok(state.project_service(conn).create(input)?)
    })
    .await?;

    Ok(ApiResponse::created(project).with_message("Project created successfully"))
}

pub async fn update_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    id: Result<Path<ProjectId>, PathRejection>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<ApiResponse<Project>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let project = with_db(&state, move |state, conn| {
        Ok(state.project_service(conn).update(id, input)?)
    })
    .await?;

    Ok(ApiResponse::ok(project).with_message("Project updated successfully"))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    _admin: AdminUser,
    id: Result<Path<ProjectId>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Path(id) = id?;
    with_db(&state, move |state, conn| {
        Ok(state.project_service(conn).delete(id)?)
    })
    .await?;

    Ok(ApiResponse::ok(()).with_message("Project deleted successfully"))
}
