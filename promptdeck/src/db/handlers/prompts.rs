//! Database repository for prompt templates.
//!
//! Every query joins the parent project so results carry the owning user,
//! letting the API layer enforce ownership without extra lookups.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::prompts::{PromptCreateDBRequest, PromptDBResponse, PromptUpdateDBRequest},
};
use crate::types::{ProjectId, PromptId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

const SELECT_PROMPT: &str = r#"
    SELECT p.id, p.project_id, pr.user_id AS owner_id, p.name, p.content,
           p.system_message, p.temperature, p.max_tokens, p.created_at, p.updated_at
    FROM prompts p
    JOIN projects pr ON pr.id = p.project_id
"#;

/// Filter for listing prompt templates.
///
/// With `project_id` set, results are that project's templates ordered by
/// name (the playground's dependent load). Without it, all of the user's
/// templates ordered newest first.
#[derive(Debug, Clone)]
pub struct PromptFilter {
    pub user_id: UserId,
    pub project_id: Option<ProjectId>,
    pub skip: i64,
    pub limit: i64,
}

impl PromptFilter {
    pub fn new(user_id: UserId, skip: i64, limit: i64) -> Self {
        Self {
            user_id,
            project_id: None,
            skip,
            limit,
        }
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

// Database entity model (prompt row + joined project owner)
#[derive(Debug, Clone, FromRow)]
struct Prompt {
    pub id: PromptId,
    pub project_id: ProjectId,
    pub owner_id: UserId,
    pub name: String,
    pub content: String,
    pub system_message: Option<String>,
    pub temperature: f64,
    pub max_tokens: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Prompt> for PromptDBResponse {
    fn from(prompt: Prompt) -> Self {
        Self {
            id: prompt.id,
            project_id: prompt.project_id,
            owner_id: prompt.owner_id,
            name: prompt.name,
            content: prompt.content,
            system_message: prompt.system_message,
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
            created_at: prompt.created_at,
            updated_at: prompt.updated_at,
        }
    }
}

pub struct Prompts<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Prompts<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    async fn fetch_joined(&mut self, id: PromptId) -> Result<Option<Prompt>> {
        let prompt = sqlx::query_as::<_, Prompt>(&format!("{SELECT_PROMPT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(prompt)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Prompts<'c> {
    type CreateRequest = PromptCreateDBRequest;
    type UpdateRequest = PromptUpdateDBRequest;
    type Response = PromptDBResponse;
    type Id = PromptId;
    type Filter = PromptFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO prompts (id, project_id, name, content, system_message, temperature, max_tokens, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(id)
        .bind(request.project_id)
        .bind(&request.name)
        .bind(&request.content)
        .bind(&request.system_message)
        .bind(request.temperature)
        .bind(request.max_tokens)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        let prompt = self.fetch_joined(id).await?.ok_or(DbError::NotFound)?;
        Ok(PromptDBResponse::from(prompt))
    }

    #[instrument(skip(self), fields(prompt_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.fetch_joined(id).await?.map(PromptDBResponse::from))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let prompts = if let Some(project_id) = filter.project_id {
            sqlx::query_as::<_, Prompt>(&format!(
                "{SELECT_PROMPT} WHERE pr.user_id = $1 AND p.project_id = $2 ORDER BY p.name ASC LIMIT $3 OFFSET $4"
            ))
            .bind(filter.user_id)
            .bind(project_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?
        } else {
            sqlx::query_as::<_, Prompt>(&format!(
                "{SELECT_PROMPT} WHERE pr.user_id = $1 ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"
            ))
            .bind(filter.user_id)
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?
        };

        Ok(prompts.into_iter().map(PromptDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(prompt_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(prompt_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let result = sqlx::query(
            r#"
            UPDATE prompts SET
                name = COALESCE($2, name),
                content = COALESCE($3, content),
                system_message = COALESCE($4, system_message),
                temperature = COALESCE($5, temperature),
                max_tokens = COALESCE($6, max_tokens),
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.content)
        .bind(&request.system_message)
        .bind(request.temperature)
        .bind(request.max_tokens)
        .bind(Utc::now())
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        let prompt = self.fetch_joined(id).await?.ok_or(DbError::NotFound)?;
        Ok(PromptDBResponse::from(prompt))
    }
}
