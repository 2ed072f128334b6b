//! Playground chat endpoints.
//!
//! Sessions live in process memory only. Creating a session preselects the
//! user's first project, that project's first prompt template, and the most
//! recently added active provider, so the playground is usable immediately
//! when the account is already configured.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::SqliteConnection;

use crate::{
    AppState,
    api::models::{
        playground::{ExchangeResponse, SendMessageRequest, SessionResponse, SessionUpdate},
        users::CurrentUser,
    },
    db::handlers::{
        Repository,
        projects::{ProjectFilter, Projects},
        prompts::{PromptFilter, Prompts},
        providers::{ProviderFilter, Providers},
    },
    errors::{Error, Result},
    playground::{ChatMessage, REPLY_DELAY, SessionState},
    types::{PlaygroundSessionId, ProjectId, PromptId, ProviderId, UserId},
};

/// First prompt template of a project, by name.
async fn first_prompt_id(conn: &mut SqliteConnection, user_id: UserId, project_id: ProjectId) -> Result<Option<PromptId>> {
    let mut repo = Prompts::new(conn);
    let prompts = repo.list(&PromptFilter::new(user_id, 0, 1).with_project(project_id)).await?;
    Ok(prompts.first().map(|p| p.id))
}

/// Verify the caller owns `project_id`.
async fn check_project(conn: &mut SqliteConnection, user_id: UserId, project_id: ProjectId) -> Result<()> {
    let mut repo = Projects::new(conn);
    match repo.get_by_id(project_id).await? {
        Some(project) if project.user_id == user_id => Ok(()),
        _ => Err(Error::NotFound {
            resource: "project".to_string(),
            id: project_id.to_string(),
        }),
    }
}

/// Verify the caller owns `provider_id`.
async fn check_provider(conn: &mut SqliteConnection, user_id: UserId, provider_id: ProviderId) -> Result<()> {
    let mut repo = Providers::new(conn);
    match repo.get_by_id(provider_id).await? {
        Some(provider) if provider.user_id == user_id => Ok(()),
        _ => Err(Error::NotFound {
            resource: "provider".to_string(),
            id: provider_id.to_string(),
        }),
    }
}

/// Validate requested selections against the database and fold them into the
/// current `(project, prompt, provider)` triple.
///
/// Switching projects resets the prompt to the new project's first template
/// unless the request picks one explicitly.
async fn resolve_selection(
    conn: &mut SqliteConnection,
    user_id: UserId,
    current: (Option<ProjectId>, Option<PromptId>, Option<ProviderId>),
    update: &SessionUpdate,
) -> Result<(Option<ProjectId>, Option<PromptId>, Option<ProviderId>)> {
    let (mut project_id, mut prompt_id, mut provider_id) = current;

    if let Some(new_project) = update.project_id {
        check_project(conn, user_id, new_project).await?;
        if project_id != Some(new_project) {
            prompt_id = first_prompt_id(conn, user_id, new_project).await?;
        }
        project_id = Some(new_project);
    }

    if let Some(new_prompt) = update.prompt_id {
        let mut repo = Prompts::new(conn);
        let prompt = match repo.get_by_id(new_prompt).await? {
            Some(prompt) if prompt.owner_id == user_id => prompt,
            _ => {
                return Err(Error::NotFound {
                    resource: "prompt".to_string(),
                    id: new_prompt.to_string(),
                });
            }
        };
        if Some(prompt.project_id) != project_id {
            return Err(Error::BadRequest {
                message: "Prompt template does not belong to the selected project".to_string(),
            });
        }
        prompt_id = Some(new_prompt);
    }

    if let Some(new_provider) = update.provider_id {
        check_provider(conn, user_id, new_provider).await?;
        provider_id = Some(new_provider);
    }

    Ok((project_id, prompt_id, provider_id))
}

#[utoipa::path(
    post,
    path = "/playground/sessions",
    tag = "playground",
    summary = "Start a playground session",
    request_body(content = SessionUpdate, description = "Optional initial selections; anything omitted falls back to defaults"),
    responses(
        (status = 201, description = "Session created with default selections", body = SessionResponse),
        (status = 400, description = "Prompt template does not belong to the selected project"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project, prompt, or provider not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: Option<Json<SessionUpdate>>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut session = SessionState::new(current_user.id);

    // Default selections: first project by name, its first prompt, newest
    // active provider.
    let projects = Projects::new(&mut conn)
        .list(&ProjectFilter::new(current_user.id, 0, 1).by_name())
        .await?;
    if let Some(project) = projects.first() {
        session.project_id = Some(project.id);
        session.prompt_id = first_prompt_id(&mut conn, current_user.id, project.id).await?;
    }

    let providers = Providers::new(&mut conn)
        .list(&ProviderFilter::new(current_user.id, 0, 1).active_only())
        .await?;
    session.provider_id = providers.first().map(|p| p.id);

    // Explicit selections in the request body win over defaults
    if let Some(Json(update)) = body {
        let current = (session.project_id, session.prompt_id, session.provider_id);
        let (project_id, prompt_id, provider_id) = resolve_selection(&mut conn, current_user.id, current, &update).await?;
        session.project_id = project_id;
        session.prompt_id = prompt_id;
        session.provider_id = provider_id;
    }

    let response = SessionResponse::from(session.clone());
    state.playground.insert(session);

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/playground/sessions/{session_id}",
    tag = "playground",
    summary = "Get a playground session",
    params(("session_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(session_id = %session_id))]
pub async fn get_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<PlaygroundSessionId>,
) -> Result<Json<SessionResponse>> {
    let session = state.playground.get(session_id, current_user.id)?;
    Ok(Json(SessionResponse::from(session)))
}

#[utoipa::path(
    patch,
    path = "/playground/sessions/{session_id}",
    tag = "playground",
    summary = "Change session selections",
    params(("session_id" = String, Path, format = "uuid")),
    request_body = SessionUpdate,
    responses(
        (status = 200, description = "Updated session state", body = SessionResponse),
        (status = 400, description = "Prompt template does not belong to the selected project"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session, project, prompt, or provider not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(session_id = %session_id))]
pub async fn update_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<PlaygroundSessionId>,
    Json(update): Json<SessionUpdate>,
) -> Result<Json<SessionResponse>> {
    let session = state.playground.get(session_id, current_user.id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let current = (session.project_id, session.prompt_id, session.provider_id);
    let (project_id, prompt_id, provider_id) = resolve_selection(&mut conn, current_user.id, current, &update).await?;

    let updated = state.playground.update(session_id, current_user.id, |s| {
        s.project_id = project_id;
        s.prompt_id = prompt_id;
        s.provider_id = provider_id;
    })?;

    Ok(Json(SessionResponse::from(updated)))
}

#[utoipa::path(
    get,
    path = "/playground/sessions/{session_id}/messages",
    tag = "playground",
    summary = "List session messages",
    params(("session_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Session transcript in order", body = Vec<ChatMessage>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(session_id = %session_id))]
pub async fn list_messages(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<PlaygroundSessionId>,
) -> Result<Json<Vec<ChatMessage>>> {
    let session = state.playground.get(session_id, current_user.id)?;
    Ok(Json(session.messages))
}

#[utoipa::path(
    post,
    path = "/playground/sessions/{session_id}/messages",
    tag = "playground",
    summary = "Send a chat message",
    params(("session_id" = String, Path, format = "uuid")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Completed exchange", body = ExchangeResponse),
        (status = 400, description = "Empty message or session not configured"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "A reply is already pending"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(session_id = %session_id))]
pub async fn send_message(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(session_id): Path<PlaygroundSessionId>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ExchangeResponse>> {
    let user_message = state.playground.begin_exchange(session_id, current_user.id, &request.content)?;

    // Simulated generation time; no session lock is held while waiting. The
    // delay and completion run on a detached task so the reply still lands
    // (and the session returns to idle) even if the client disconnects and
    // this handler future is dropped mid-wait.
    let playground = state.playground.clone();
    let reply = tokio::spawn(async move {
        tokio::time::sleep(REPLY_DELAY).await;
        playground.complete_exchange(session_id)
    });

    let assistant_message = reply.await.map_err(|e| Error::Internal {
        operation: format!("join playground reply task: {e}"),
    })??;

    Ok(Json(ExchangeResponse {
        user_message,
        assistant_message,
    }))
}

#[cfg(test)]
mod tests {
    use crate::playground::{REPLY_TEXT, SETUP_WARNING};
    use crate::test_utils::{create_test_app, register_and_login};
    use axum::http::{StatusCode, header::COOKIE};
    use axum_test::TestServer;
    use serde_json::json;

    async fn create_project(server: &TestServer, cookie: &str, name: &str) -> String {
        let response = server
            .post("/api/v1/projects")
            .add_header(COOKIE, cookie)
            .json(&json!({"name": name}))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string()
    }

    async fn create_prompt(server: &TestServer, cookie: &str, project_id: &str, name: &str) -> String {
        let response = server
            .post("/api/v1/prompts")
            .add_header(COOKIE, cookie)
            .json(&json!({
                "project_id": project_id,
                "name": name,
                "content": "You are {{role}}."
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string()
    }

    async fn create_provider(server: &TestServer, cookie: &str) -> String {
        let response = server
            .post("/api/v1/providers")
            .add_header(COOKIE, cookie)
            .json(&json!({
                "provider_name": "openai",
                "model_name": "gpt-4",
                "api_key": "sk-test-123"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string()
    }

    #[test_log::test(sqlx::test)]
    async fn test_new_session_without_setup_warns(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "bare@example.com", "password123").await;

        let response = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        response.assert_status(StatusCode::CREATED);

        let session: serde_json::Value = response.json();
        assert_eq!(session["can_send"], false);
        assert_eq!(session["warning"], SETUP_WARNING);
        assert!(session["project_id"].is_null());
        assert!(session["provider_id"].is_null());
    }

    #[test_log::test(sqlx::test)]
    async fn test_session_defaults_from_configuration(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "ready@example.com", "password123").await;

        let project_id = create_project(&server, &cookie, "alpha").await;
        create_project(&server, &cookie, "zeta").await;
        let prompt_id = create_prompt(&server, &cookie, &project_id, "greeting").await;
        let provider_id = create_provider(&server, &cookie).await;

        let response = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        response.assert_status(StatusCode::CREATED);

        let session: serde_json::Value = response.json();
        assert_eq!(session["project_id"], project_id.as_str());
        assert_eq!(session["prompt_id"], prompt_id.as_str());
        assert_eq!(session["provider_id"], provider_id.as_str());
        assert_eq!(session["can_send"], true);
        assert!(session["warning"].is_null());
    }

    #[test_log::test(sqlx::test)]
    async fn test_create_session_with_explicit_selection(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "explicit@example.com", "password123").await;

        create_project(&server, &cookie, "alpha").await;
        let project_b = create_project(&server, &cookie, "beta").await;
        let prompt_b = create_prompt(&server, &cookie, &project_b, "b-prompt").await;

        let response = server
            .post("/api/v1/playground/sessions")
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"project_id": project_b}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let session: serde_json::Value = response.json();
        assert_eq!(session["project_id"], project_b.as_str());
        assert_eq!(session["prompt_id"], prompt_b.as_str());
    }

    #[test_log::test(sqlx::test)]
    async fn test_send_message_roundtrip(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "chat@example.com", "password123").await;

        create_project(&server, &cookie, "chat").await;
        create_provider(&server, &cookie).await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        let session_id = session.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/v1/playground/sessions/{session_id}/messages"))
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"content": "Hello!"}))
            .await;
        response.assert_status_ok();

        let exchange: serde_json::Value = response.json();
        assert_eq!(exchange["user_message"]["role"], "user");
        assert_eq!(exchange["user_message"]["content"], "Hello!");
        assert_eq!(exchange["user_message"]["token_count"], 0);
        assert_eq!(exchange["assistant_message"]["role"], "assistant");
        assert_eq!(exchange["assistant_message"]["content"], REPLY_TEXT);
        assert_eq!(exchange["assistant_message"]["token_count"], 50);

        let messages = server
            .get(&format!("/api/v1/playground/sessions/{session_id}/messages"))
            .add_header(COOKIE, cookie.as_str())
            .await;
        assert_eq!(messages.json::<Vec<serde_json::Value>>().len(), 2);
    }

    #[test_log::test(sqlx::test)]
    async fn test_disconnected_send_does_not_wedge_session(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "dropped@example.com", "password123").await;

        create_project(&server, &cookie, "chat").await;
        create_provider(&server, &cookie).await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        let session_id = session.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();
        let url = format!("/api/v1/playground/sessions/{session_id}/messages");

        // Abandon the first send mid-delay, like a client closing the tab
        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            server.post(&url).add_header(COOKIE, cookie.as_str()).json(&json!({"content": "first"})),
        )
        .await;
        assert!(abandoned.is_err());

        // The detached reply task still completes the exchange
        tokio::time::sleep(std::time::Duration::from_millis(2000)).await;

        let response = server
            .post(&url)
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"content": "second"}))
            .await;
        response.assert_status_ok();

        let messages = server.get(&url).add_header(COOKIE, cookie.as_str()).await;
        assert_eq!(messages.json::<Vec<serde_json::Value>>().len(), 4);
    }

    #[test_log::test(sqlx::test)]
    async fn test_send_requires_configuration(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "notready@example.com", "password123").await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        let session_id = session.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/v1/playground/sessions/{session_id}/messages"))
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"content": "Hello!"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(sqlx::test)]
    async fn test_empty_message_rejected(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "empty@example.com", "password123").await;

        create_project(&server, &cookie, "chat").await;
        create_provider(&server, &cookie).await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        let session_id = session.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/v1/playground/sessions/{session_id}/messages"))
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"content": "   "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let messages = server
            .get(&format!("/api/v1/playground/sessions/{session_id}/messages"))
            .add_header(COOKIE, cookie.as_str())
            .await;
        assert!(messages.json::<Vec<serde_json::Value>>().is_empty());
    }

    #[test_log::test(sqlx::test)]
    async fn test_switching_project_reloads_prompt(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "switch@example.com", "password123").await;

        let project_a = create_project(&server, &cookie, "alpha").await;
        let project_b = create_project(&server, &cookie, "beta").await;
        create_prompt(&server, &cookie, &project_a, "a-prompt").await;
        let prompt_b = create_prompt(&server, &cookie, &project_b, "b-prompt").await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        let session: serde_json::Value = session.json();
        let session_id = session["id"].as_str().unwrap().to_string();
        assert_eq!(session["project_id"], project_a.as_str());

        let updated = server
            .patch(&format!("/api/v1/playground/sessions/{session_id}"))
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"project_id": project_b}))
            .await;
        updated.assert_status_ok();

        let updated: serde_json::Value = updated.json();
        assert_eq!(updated["project_id"], project_b.as_str());
        assert_eq!(updated["prompt_id"], prompt_b.as_str());
    }

    #[test_log::test(sqlx::test)]
    async fn test_prompt_must_belong_to_selected_project(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie = register_and_login(&server, "mismatch@example.com", "password123").await;

        let project_a = create_project(&server, &cookie, "alpha").await;
        let project_b = create_project(&server, &cookie, "beta").await;
        let prompt_b = create_prompt(&server, &cookie, &project_b, "b-prompt").await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie.as_str()).await;
        let session_id = session.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        // Session defaults to project_a; prompt from project_b must be refused
        let response = server
            .patch(&format!("/api/v1/playground/sessions/{session_id}"))
            .add_header(COOKIE, cookie.as_str())
            .json(&json!({"project_id": project_a, "prompt_id": prompt_b}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(sqlx::test)]
    async fn test_foreign_session_looks_missing(pool: sqlx::SqlitePool) {
        let server = create_test_app(pool).await;
        let cookie_a = register_and_login(&server, "sowner@example.com", "password123").await;
        let cookie_b = register_and_login(&server, "sother@example.com", "password123").await;

        let session = server.post("/api/v1/playground/sessions").add_header(COOKIE, cookie_a.as_str()).await;
        let session_id = session.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .get(&format!("/api/v1/playground/sessions/{session_id}"))
            .add_header(COOKIE, cookie_b.as_str())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
