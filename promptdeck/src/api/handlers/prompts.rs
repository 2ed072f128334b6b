//! Prompt template CRUD endpoints.
//!
//! Temperature and max_tokens bounds are enforced by database check
//! constraints; violations surface as 400 responses.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        prompts::{ListPromptsQuery, PromptCreate, PromptResponse, PromptUpdate},
        users::CurrentUser,
    },
    db::{
        handlers::{
            Repository,
            projects::Projects,
            prompts::{PromptFilter, Prompts},
        },
        models::prompts::{PromptCreateDBRequest, PromptDBResponse, PromptUpdateDBRequest},
    },
    errors::{Error, Result},
    types::PromptId,
};

/// Fetch a prompt and verify the caller owns its project.
async fn get_owned_prompt(repo: &mut Prompts<'_>, id: PromptId, current_user: &CurrentUser) -> Result<PromptDBResponse> {
    match repo.get_by_id(id).await? {
        Some(prompt) if prompt.owner_id == current_user.id => Ok(prompt),
        _ => Err(Error::NotFound {
            resource: "prompt".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/prompts",
    tag = "prompts",
    summary = "List prompt templates",
    params(ListPromptsQuery),
    responses(
        (status = 200, description = "Prompt templates; ordered by name when filtered to a project, newest first otherwise", body = Vec<PromptResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_prompts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListPromptsQuery>,
) -> Result<Json<Vec<PromptResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Prompts::new(&mut conn);

    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut filter = PromptFilter::new(current_user.id, skip, limit);
    if let Some(project_id) = query.project_id {
        filter = filter.with_project(project_id);
    }

    let prompts = repo.list(&filter).await?;
    Ok(Json(prompts.into_iter().map(PromptResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/prompts",
    tag = "prompts",
    summary = "Create prompt template",
    request_body = PromptCreate,
    responses(
        (status = 201, description = "Prompt template created", body = PromptResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_prompt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<PromptCreate>,
) -> Result<(StatusCode, Json<PromptResponse>)> {
    if create.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Prompt name cannot be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // The parent project must exist and belong to the caller
    let mut projects = Projects::new(&mut conn);
    match projects.get_by_id(create.project_id).await? {
        Some(project) if project.user_id == current_user.id => {}
        _ => {
            return Err(Error::NotFound {
                resource: "project".to_string(),
                id: create.project_id.to_string(),
            });
        }
    }

    let mut repo = Prompts::new(&mut conn);
    let prompt = repo
        .create(&PromptCreateDBRequest {
            project_id: create.project_id,
            name: create.name,
            content: create.content,
            system_message: create.system_message,
            temperature: create.temperature,
            max_tokens: create.max_tokens,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PromptResponse::from(prompt))))
}

#[utoipa::path(
    get,
    path = "/prompts/{prompt_id}",
    tag = "prompts",
    summary = "Get prompt template",
    params(("prompt_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Prompt template", body = PromptResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Prompt not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(prompt_id = %prompt_id))]
pub async fn get_prompt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(prompt_id): Path<PromptId>,
) -> Result<Json<PromptResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Prompts::new(&mut conn);

    let prompt = get_owned_prompt(&mut repo, prompt_id, &current_user).await?;
    Ok(Json(PromptResponse::from(prompt)))
}

#[utoipa::path(
    patch,
    path = "/prompts/{prompt_id}",
    tag = "prompts",
    summary = "Update prompt template",
    params(("prompt_id" = String, Path, format = "uuid")),
    request_body = PromptUpdate,
    responses(
        (status = 200, description = "Updated prompt template", body = PromptResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Prompt not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(prompt_id = %prompt_id))]
pub async fn update_prompt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(prompt_id): Path<PromptId>,
    Json(update): Json<PromptUpdate>,
) -> Result<Json<PromptResponse>> {
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "Prompt name cannot be empty".to_string(),
            });
        }
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Prompts::new(&mut conn);

    get_owned_prompt(&mut repo, prompt_id, &current_user).await?;

    let prompt = repo
        .update(
            prompt_id,
            &PromptUpdateDBRequest {
                name: update.name,
                content: update.content,
                system_message: update.system_message,
                temperature: update.temperature,
                max_tokens: update.max_tokens,
            },
        )
        .await?;

    Ok(Json(PromptResponse::from(prompt)))
}

#[utoipa::path(
    delete,
    path = "/prompts/{prompt_id}",
    tag = "prompts",
    summary = "Delete prompt template",
    params(("prompt_id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Prompt template deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Prompt not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(prompt_id = %prompt_id))]
pub async fn delete_prompt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(prompt_id): Path<PromptId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Prompts::new(&mut conn);

    get_owned_prompt(&mut repo, prompt_id, &current_user).await?;
    repo.delete(prompt_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_project, create_test_app, register_and_login};
    use axum::http::{StatusCode, header::COOKIE};
    use serde_json::json;

    #[test_log::test(sqlx::test)]
    async fn test_prompt_crud_flow(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "prompts@example.com", "password123").await;
        let project_id = create_project(&server, &cookie, "workspace").await;

        let created = server
            .post("/api/v1/prompts")
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({
                "project_id": project_id,
                "name": "summarizer",
                "content": "Summarize: {input}"
            }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let created: serde_json::Value = created.json();
        assert_eq!(created["temperature"], 0.7);
        assert_eq!(created["max_tokens"], 1000);
        let id = created["id"].as_str().unwrap().to_string();

        let updated = server
            .patch(&format!("/api/v1/prompts/{id}"))
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"temperature": 1.2, "system_message": "You are terse."}))
            .await;
        updated.assert_status_ok();
        let updated: serde_json::Value = updated.json();
        assert_eq!(updated["temperature"], 1.2);
        assert_eq!(updated["name"], "summarizer");

        let deleted = server
            .delete(&format!("/api/v1/prompts/{id}"))
            .add_header(COOKIE, cookie.as_str())
            .await;
        deleted.assert_status(StatusCode::NO_CONTENT);
    }

    #[test_log::test(sqlx::test)]
    async fn test_create_in_foreign_project_not_found(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie_a = register_and_login(&server, "powner@example.com", "password123").await;
        let cookie_b = register_and_login(&server, "pother@example.com", "password123").await;
        let project_id = create_project(&server, &cookie_a, "mine").await;

        let response = server
            .post("/api/v1/prompts")
            .add_header(COOKIE, cookie_b.as_str())
            .json(&json!({
                "project_id": project_id,
                "name": "sneaky",
                "content": "hello"
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(sqlx::test)]
    async fn test_out_of_range_temperature_rejected(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "temp@example.com", "password123").await;
        let project_id = create_project(&server, &cookie, "workspace").await;

        let response = server
            .post("/api/v1/prompts")
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({
                "project_id": project_id,
                "name": "too hot",
                "content": "x",
                "temperature": 3.5
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(sqlx::test)]
    async fn test_list_filtered_by_project(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "filter@example.com", "password123").await;
        let project_a = create_project(&server, &cookie, "alpha").await;
        let project_b = create_project(&server, &cookie, "beta").await;

        for (project, name) in [(&project_a, "writer"), (&project_a, "classifier"), (&project_b, "router")] {
            server
                .post("/api/v1/prompts")
                .add_header(COOKIE, cookie.as_str())
                .json(&json!({"project_id": project, "name": name, "content": "x"}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let listed = server
            .get(&format!("/api/v1/prompts?project_id={project_a}"))
            .add_header(COOKIE, cookie.as_str())
            .await;
        listed.assert_status_ok();
        let listed: Vec<serde_json::Value> = listed.json();
        let names: Vec<_> = listed.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["classifier", "writer"]);
    }

    #[test_log::test(sqlx::test)]
    async fn test_project_delete_cascades(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "cascade@example.com", "password123").await;
        let project_id = create_project(&server, &cookie, "doomed").await;

        let created = server
            .post("/api/v1/prompts")
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"project_id": project_id, "name": "orphan", "content": "x"}))
            .await;
        let prompt_id = created.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        server
            .delete(&format!("/api/v1/projects/{project_id}"))
            .add_header(COOKIE, cookie.as_str())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get(&format!("/api/v1/prompts/{prompt_id}"))
            .add_header(COOKIE, cookie.as_str())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
