//! Playground session API models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::playground::{ChatMessage, SessionState};
use crate::types::{PlaygroundSessionId, ProjectId, PromptId, ProviderId};

/// Payload for changing a session's selections. All fields optional; selecting
/// a different project reloads its prompt templates.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SessionUpdate {
    #[schema(value_type = Option<String>, format = "uuid")]
    pub project_id: Option<ProjectId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub prompt_id: Option<PromptId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub provider_id: Option<ProviderId>,
}

/// Payload for sending a chat message.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Playground session returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PlaygroundSessionId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub project_id: Option<ProjectId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub prompt_id: Option<PromptId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub provider_id: Option<ProviderId>,
    /// Whether the session is configured enough to accept messages
    pub can_send: bool,
    /// Setup guidance shown when `can_send` is false
    pub warning: Option<String>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<SessionState> for SessionResponse {
    fn from(session: SessionState) -> Self {
        let warning = session.warning().map(str::to_string);
        Self {
            id: session.id,
            project_id: session.project_id,
            prompt_id: session.prompt_id,
            provider_id: session.provider_id,
            can_send: session.can_send(),
            warning,
            message_count: session.messages.len(),
            created_at: session.created_at,
        }
    }
}

/// Both messages produced by one completed chat exchange.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangeResponse {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}
