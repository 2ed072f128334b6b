//! Prompt template API models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::prompts::PromptDBResponse;
use crate::types::{ProjectId, PromptId};

/// Default sampling temperature for new templates.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default max tokens for new templates.
pub const DEFAULT_MAX_TOKENS: i64 = 1000;

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> i64 {
    DEFAULT_MAX_TOKENS
}

/// Payload for creating a prompt template.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PromptCreate {
    #[schema(value_type = String, format = "uuid")]
    pub project_id: ProjectId,
    pub name: String,
    pub content: String,
    pub system_message: Option<String>,
    /// Sampling temperature, 0.0 to 2.0 (default: 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens to generate, at least 1 (default: 1000)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,
}

/// Payload for updating a prompt template. All fields optional.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PromptUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
    pub system_message: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
}

/// Prompt template returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromptResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PromptId,
    #[schema(value_type = String, format = "uuid")]
    pub project_id: ProjectId,
    pub name: String,
    pub content: String,
    pub system_message: Option<String>,
    pub temperature: f64,
    pub max_tokens: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PromptDBResponse> for PromptResponse {
    fn from(prompt: PromptDBResponse) -> Self {
        Self {
            id: prompt.id,
            project_id: prompt.project_id,
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

/// Query parameters for listing prompt templates.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListPromptsQuery {
    /// Restrict results to one project
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub project_id: Option<ProjectId>,
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,
    #[param(default = 100, minimum = 1, maximum = 1000)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}
