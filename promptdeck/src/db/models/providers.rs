//! Database models for provider configurations.

use crate::types::{ProviderId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new provider configuration.
///
/// `api_key_encrypted` is the credential already encrypted by the API layer;
/// plaintext never reaches the database.
#[derive(Debug, Clone)]
pub struct ProviderCreateDBRequest {
    pub user_id: UserId,
    pub provider_name: String,
    pub model_name: String,
    pub api_key_encrypted: String,
    pub is_active: bool,
}

/// Database request for updating a provider configuration
#[derive(Debug, Clone)]
pub struct ProviderUpdateDBRequest {
    pub provider_name: Option<String>,
    pub model_name: Option<String>,
    pub api_key_encrypted: Option<String>,
    pub is_active: Option<bool>,
}

/// Database response for a provider configuration
#[derive(Debug, Clone)]
pub struct ProviderDBResponse {
    pub id: ProviderId,
    pub user_id: UserId,
    pub provider_name: String,
    pub model_name: String,
    pub api_key_encrypted: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
