//! Database models for prompt templates.

use crate::types::{ProjectId, PromptId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new prompt template
#[derive(Debug, Clone)]
pub struct PromptCreateDBRequest {
    pub project_id: ProjectId,
    pub name: String,
    pub content: String,
    pub system_message: Option<String>,
    pub temperature: f64,
    pub max_tokens: i64,
}

/// Database request for updating a prompt template
#[derive(Debug, Clone)]
pub struct PromptUpdateDBRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub system_message: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
}

/// Database response for a prompt template.
///
/// `owner_id` is the owning user of the parent project, joined in so the API
/// layer can scope access without a second query.
#[derive(Debug, Clone)]
pub struct PromptDBResponse {
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
