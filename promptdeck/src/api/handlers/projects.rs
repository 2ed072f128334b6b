//! Project CRUD endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        projects::{ProjectCreate, ProjectResponse, ProjectUpdate},
        users::CurrentUser,
    },
    db::{
        handlers::{
            Repository,
            projects::{ProjectFilter, Projects},
        },
        models::projects::{ProjectCreateDBRequest, ProjectUpdateDBRequest},
    },
    errors::{Error, Result},
    types::ProjectId,
};

/// Fetch a project and verify the caller owns it.
///
/// Another user's project is reported as not found.
async fn get_owned_project(repo: &mut Projects<'_>, id: ProjectId, current_user: &CurrentUser) -> Result<crate::db::models::projects::ProjectDBResponse> {
    match repo.get_by_id(id).await? {
        Some(project) if project.user_id == current_user.id => Ok(project),
        _ => Err(Error::NotFound {
            resource: "project".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/projects",
    tag = "projects",
    summary = "List projects",
    params(Pagination),
    responses(
        (status = 200, description = "List of projects, newest first", body = Vec<ProjectResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_projects(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);

    let (skip, limit) = pagination.params();
    let projects = repo.list(&ProjectFilter::new(current_user.id, skip, limit)).await?;

    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/projects",
    tag = "projects",
    summary = "Create project",
    request_body = ProjectCreate,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    if create.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Project name cannot be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);

    let project = repo
        .create(&ProjectCreateDBRequest {
            user_id: current_user.id,
            name: create.name,
            description: create.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

#[utoipa::path(
    get,
    path = "/projects/{project_id}",
    tag = "projects",
    summary = "Get project",
    params(("project_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(project_id = %project_id))]
pub async fn get_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<ProjectResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);

    let project = get_owned_project(&mut repo, project_id, &current_user).await?;
    Ok(Json(ProjectResponse::from(project)))
}

#[utoipa::path(
    patch,
    path = "/projects/{project_id}",
    tag = "projects",
    summary = "Update project",
    params(("project_id" = String, Path, format = "uuid")),
    request_body = ProjectUpdate,
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(project_id = %project_id))]
pub async fn update_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<ProjectId>,
    Json(update): Json<ProjectUpdate>,
) -> Result<Json<ProjectResponse>> {
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Project name cannot be empty".to_string(),
            });
        }
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);

    get_owned_project(&mut repo, project_id, &current_user).await?;

    let project = repo
        .update(
            project_id,
            &ProjectUpdateDBRequest {
                name: update.name,
                description: update.description,
            },
        )
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

#[utoipa::path(
    delete,
    path = "/projects/{project_id}",
    tag = "projects",
    summary = "Delete project",
    params(("project_id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Project deleted; its prompt templates are removed with it"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(project_id = %project_id))]
pub async fn delete_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(project_id): Path<ProjectId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);

    get_owned_project(&mut repo, project_id, &current_user).await?;
    repo.delete(project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
