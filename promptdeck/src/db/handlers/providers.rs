//! Database repository for provider configurations.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::providers::{ProviderCreateDBRequest, ProviderDBResponse, ProviderUpdateDBRequest},
};
use crate::types::{ProviderId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing provider configurations
#[derive(Debug, Clone)]
pub struct ProviderFilter {
    pub user_id: UserId,
    /// When set, only providers with a matching active flag are returned
    pub active: Option<bool>,
    pub skip: i64,
    pub limit: i64,
}

impl ProviderFilter {
    pub fn new(user_id: UserId, skip: i64, limit: i64) -> Self {
        Self {
            user_id,
            active: None,
            skip,
            limit,
        }
    }

    pub fn active_only(mut self) -> Self {
        self.active = Some(true);
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Provider {
    pub id: ProviderId,
    pub user_id: UserId,
    pub provider_name: String,
    pub model_name: String,
    pub api_key_encrypted: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Provider> for ProviderDBResponse {
    fn from(provider: Provider) -> Self {
        Self {
            id: provider.id,
            user_id: provider.user_id,
            provider_name: provider.provider_name,
            model_name: provider.model_name,
            api_key_encrypted: provider.api_key_encrypted,
            is_active: provider.is_active,
            created_at: provider.created_at,
            updated_at: provider.updated_at,
        }
    }
}

pub struct Providers<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Providers<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Providers<'c> {
    type CreateRequest = ProviderCreateDBRequest;
    type UpdateRequest = ProviderUpdateDBRequest;
    type Response = ProviderDBResponse;
    type Id = ProviderId;
    type Filter = ProviderFilter;

    #[instrument(skip(self, request), fields(provider = %request.provider_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            INSERT INTO llm_providers (id, user_id, provider_name, model_name, api_key_encrypted, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.provider_name)
        .bind(&request.model_name)
        .bind(&request.api_key_encrypted)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ProviderDBResponse::from(provider))
    }

    #[instrument(skip(self), fields(provider_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let provider = sqlx::query_as::<_, Provider>("SELECT * FROM llm_providers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(provider.map(ProviderDBResponse::from))
    }

    // Newest first, matching the console's provider list.
    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let providers = sqlx::query_as::<_, Provider>(
            r#"
            SELECT * FROM llm_providers
            WHERE user_id = $1 AND ($2 IS NULL OR is_active = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.active)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(providers.into_iter().map(ProviderDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(provider_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM llm_providers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(provider_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            UPDATE llm_providers SET
                provider_name = COALESCE($2, provider_name),
                model_name = COALESCE($3, model_name),
                api_key_encrypted = COALESCE($4, api_key_encrypted),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.provider_name)
        .bind(&request.model_name)
        .bind(&request.api_key_encrypted)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ProviderDBResponse::from(provider))
    }
}
