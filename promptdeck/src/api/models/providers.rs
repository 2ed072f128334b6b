//! Provider credential API models.
//!
//! API keys are accepted in plaintext on create/update, stored encrypted, and
//! never returned. Responses carry a short `api_key_hint` instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::crypto;
use crate::db::models::providers::ProviderDBResponse;
use crate::types::ProviderId;

fn default_is_active() -> bool {
    true
}

/// Payload for creating a provider credential.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProviderCreate {
    /// Provider identifier from the catalog (e.g. "openai")
    pub provider_name: String,
    pub model_name: String,
    /// Plaintext API key, encrypted before storage
    pub api_key: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

/// Payload for updating a provider credential. All fields optional.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProviderUpdate {
    pub provider_name: Option<String>,
    pub model_name: Option<String>,
    /// Replacement plaintext API key, encrypted before storage
    pub api_key: Option<String>,
    pub is_active: Option<bool>,
}

/// Provider credential returned by the API. The key itself is never included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProviderId,
    pub provider_name: String,
    pub model_name: String,
    /// First characters of the stored credential, for display only
    pub api_key_hint: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProviderDBResponse> for ProviderResponse {
    fn from(provider: ProviderDBResponse) -> Self {
        Self {
            id: provider.id,
            provider_name: provider.provider_name,
            model_name: provider.model_name,
            api_key_hint: crypto::api_key_hint(&provider.api_key_encrypted),
            is_active: provider.is_active,
            created_at: provider.created_at,
            updated_at: provider.updated_at,
        }
    }
}

/// Query parameters for listing provider credentials.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListProvidersQuery {
    /// When true, only active providers are returned
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub active: Option<bool>,
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

/// One provider family in the static catalog.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogEntry {
    /// Identifier accepted in `provider_name`
    #[schema(value_type = String)]
    pub provider_name: &'static str,
    /// Human-readable label
    #[schema(value_type = String)]
    pub label: &'static str,
    /// Models offered by this provider
    #[schema(value_type = Vec<String>)]
    pub models: &'static [&'static str],
}

/// Static catalog of supported providers and their models.
pub const PROVIDER_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        provider_name: "openai",
        label: "OpenAI",
        models: &["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo"],
    },
    CatalogEntry {
        provider_name: "anthropic",
        label: "Anthropic",
        models: &["claude-3-opus", "claude-3-sonnet", "claude-3-haiku"],
    },
    CatalogEntry {
        provider_name: "cohere",
        label: "Cohere",
        models: &["command", "command-light"],
    },
    CatalogEntry {
        provider_name: "google",
        label: "Google",
        models: &["gemini-pro", "gemini-ultra"],
    },
];

/// Look up a catalog entry by provider identifier.
pub fn catalog_entry(provider_name: &str) -> Option<&'static CatalogEntry> {
    PROVIDER_CATALOG.iter().find(|e| e.provider_name == provider_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        assert!(catalog_entry("openai").is_some());
        assert!(catalog_entry("anthropic").is_some());
        assert!(catalog_entry("acme-llm").is_none());
    }
}
