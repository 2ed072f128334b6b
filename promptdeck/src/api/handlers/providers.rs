//! Provider credential endpoints and the static provider catalog.
//!
//! Plaintext API keys are encrypted with the configured key before they touch
//! the database and are never returned by any endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        providers::{CatalogEntry, ListProvidersQuery, PROVIDER_CATALOG, ProviderCreate, ProviderResponse, ProviderUpdate, catalog_entry},
        users::CurrentUser,
    },
    crypto,
    db::{
        handlers::{
            Repository,
            providers::{ProviderFilter, Providers},
        },
        models::providers::{ProviderCreateDBRequest, ProviderDBResponse, ProviderUpdateDBRequest},
    },
    errors::{Error, Result},
    types::ProviderId,
};

/// Fetch a provider credential and verify the caller owns it.
async fn get_owned_provider(repo: &mut Providers<'_>, id: ProviderId, current_user: &CurrentUser) -> Result<ProviderDBResponse> {
    match repo.get_by_id(id).await? {
        Some(provider) if provider.user_id == current_user.id => Ok(provider),
        _ => Err(Error::NotFound {
            resource: "provider".to_string(),
            id: id.to_string(),
        }),
    }
}

/// Encrypt a plaintext API key with the configured encryption key.
fn encrypt_api_key(state: &AppState, api_key: &str) -> Result<String> {
    let key_b64 = state.config.encryption_key.as_ref().ok_or_else(|| Error::Internal {
        operation: "encryption_key is required to store provider credentials".to_string(),
    })?;
    let key = crypto::decode_key(key_b64).map_err(|e| Error::Internal {
        operation: format!("decode encryption key: {e}"),
    })?;
    crypto::encrypt(&key, api_key.as_bytes()).map_err(|e| Error::Internal {
        operation: format!("encrypt provider credential: {e}"),
    })
}

#[utoipa::path(
    get,
    path = "/providers/catalog",
    tag = "providers",
    summary = "List supported providers and models",
    responses(
        (status = 200, description = "Static provider catalog", body = Vec<CatalogEntry>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_catalog(_current_user: CurrentUser) -> Json<&'static [CatalogEntry]> {
    Json(PROVIDER_CATALOG)
}

#[utoipa::path(
    get,
    path = "/providers",
    tag = "providers",
    summary = "List provider credentials",
    params(ListProvidersQuery),
    responses(
        (status = 200, description = "Provider credentials, newest first", body = Vec<ProviderResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_providers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListProvidersQuery>,
) -> Result<Json<Vec<ProviderResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Providers::new(&mut conn);

    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut filter = ProviderFilter::new(current_user.id, skip, limit);
    filter.active = query.active;

    let providers = repo.list(&filter).await?;
    Ok(Json(providers.into_iter().map(ProviderResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/providers",
    tag = "providers",
    summary = "Create provider credential",
    request_body = ProviderCreate,
    responses(
        (status = 201, description = "Provider credential created", body = ProviderResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_provider(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(create): Json<ProviderCreate>,
) -> Result<(StatusCode, Json<ProviderResponse>)> {
    if catalog_entry(&create.provider_name).is_none() {
        return Err(Error::BadRequest {
            message: format!("Unknown provider '{}'", create.provider_name),
        });
    }
    if create.api_key.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "API key cannot be empty".to_string(),
        });
    }
    if create.model_name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Model name cannot be empty".to_string(),
        });
    }

    let api_key_encrypted = encrypt_api_key(&state, &create.api_key)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Providers::new(&mut conn);

    let provider = repo
        .create(&ProviderCreateDBRequest {
            user_id: current_user.id,
            provider_name: create.provider_name,
            model_name: create.model_name,
            api_key_encrypted,
            is_active: create.is_active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProviderResponse::from(provider))))
}

#[utoipa::path(
    get,
    path = "/providers/{provider_id}",
    tag = "providers",
    summary = "Get provider credential",
    params(("provider_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Provider credential", body = ProviderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Provider not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(provider_id = %provider_id))]
pub async fn get_provider(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(provider_id): Path<ProviderId>,
) -> Result<Json<ProviderResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Providers::new(&mut conn);

    let provider = get_owned_provider(&mut repo, provider_id, &current_user).await?;
    Ok(Json(ProviderResponse::from(provider)))
}

#[utoipa::path(
    patch,
    path = "/providers/{provider_id}",
    tag = "providers",
    summary = "Update provider credential",
    params(("provider_id" = String, Path, format = "uuid")),
    request_body = ProviderUpdate,
    responses(
        (status = 200, description = "Updated provider credential", body = ProviderResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Provider not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(provider_id = %provider_id))]
pub async fn update_provider(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(provider_id): Path<ProviderId>,
    Json(update): Json<ProviderUpdate>,
) -> Result<Json<ProviderResponse>> {
    if let Some(provider_name) = &update.provider_name {
        if catalog_entry(provider_name).is_none() {
            return Err(Error::BadRequest {
                message: format!("Unknown provider '{provider_name}'"),
            });
        }
    }

    let api_key_encrypted = match &update.api_key {
        Some(api_key) if api_key.trim().is_empty() => {
            return Err(Error::BadRequest {
                message: "API key cannot be empty".to_string(),
            });
        }
        Some(api_key) => Some(encrypt_api_key(&state, api_key)?),
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Providers::new(&mut conn);

    get_owned_provider(&mut repo, provider_id, &current_user).await?;

    let provider = repo
        .update(
            provider_id,
            &ProviderUpdateDBRequest {
                provider_name: update.provider_name,
                model_name: update.model_name,
                api_key_encrypted,
                is_active: update.is_active,
            },
        )
        .await?;

    Ok(Json(ProviderResponse::from(provider)))
}

#[utoipa::path(
    delete,
    path = "/providers/{provider_id}",
    tag = "providers",
    summary = "Delete provider credential",
    params(("provider_id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Provider credential deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Provider not found"),
    ),
    security(("CookieAuth" = []))
)]
#[tracing::instrument(skip_all, fields(provider_id = %provider_id))]
pub async fn delete_provider(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(provider_id): Path<ProviderId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Providers::new(&mut conn);

    get_owned_provider(&mut repo, provider_id, &current_user).await?;
    repo.delete(provider_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
