//! In-memory playground chat sessions.
//!
//! Playground conversations are ephemeral: they live in process memory for the
//! lifetime of the session and are never written to the database. Each session
//! tracks the selected project, prompt template, and provider, plus the message
//! transcript and whether a reply is currently pending.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::types::{PlaygroundSessionId, ProjectId, PromptId, ProviderId, UserId};

/// How long the playground waits before producing the assistant reply.
pub const REPLY_DELAY: Duration = Duration::from_millis(1500);

/// Token count reported for every playground reply.
pub const REPLY_TOKENS: i64 = 50;

/// The canned assistant reply.
pub const REPLY_TEXT: &str = "This is a simulated response from your configured model. \
In a production deployment, this message would be generated by the selected provider \
using your prompt template and parameters.";

/// Shown when the user has not yet configured enough to start chatting.
pub const SETUP_WARNING: &str = "Configure at least one project and one provider to start chatting";

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single message in a playground transcript.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Reported token usage; user messages always report 0
    pub token_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Whether a reply is currently being produced for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    AwaitingReply,
}

/// State of one playground session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: PlaygroundSessionId,
    pub user_id: UserId,
    pub project_id: Option<ProjectId>,
    pub prompt_id: Option<PromptId>,
    pub provider_id: Option<ProviderId>,
    pub messages: Vec<ChatMessage>,
    pub exchange: ExchangeState,
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            project_id: None,
            prompt_id: None,
            provider_id: None,
            messages: Vec::new(),
            exchange: ExchangeState::Idle,
            created_at: Utc::now(),
        }
    }

    /// A message can be sent once a project and a provider are selected.
    pub fn can_send(&self) -> bool {
        self.project_id.is_some() && self.provider_id.is_some()
    }

    /// Setup warning for incomplete sessions, if any.
    pub fn warning(&self) -> Option<&'static str> {
        if self.can_send() { None } else { Some(SETUP_WARNING) }
    }
}

/// Shared store of live playground sessions.
///
/// Guards are never held across await points: callers split a chat exchange
/// into [`Sessions::begin_exchange`] and [`Sessions::complete_exchange`] so the
/// reply delay happens with no map entry locked.
#[derive(Debug, Clone, Default)]
pub struct Sessions {
    inner: Arc<DashMap<PlaygroundSessionId, SessionState>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: SessionState) {
        self.inner.insert(session.id, session);
    }

    /// Fetch a session owned by `user_id`.
    ///
    /// Another user's session is indistinguishable from a missing one.
    pub fn get(&self, id: PlaygroundSessionId, user_id: UserId) -> Result<SessionState> {
        match self.inner.get(&id) {
            Some(session) if session.user_id == user_id => Ok(session.clone()),
            _ => Err(Error::NotFound {
                resource: "playground session".to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Apply `f` to a session owned by `user_id` and return the updated state.
    pub fn update<F>(&self, id: PlaygroundSessionId, user_id: UserId, f: F) -> Result<SessionState>
    where
        F: FnOnce(&mut SessionState),
    {
        match self.inner.get_mut(&id) {
            Some(mut session) if session.user_id == user_id => {
                f(&mut session);
                Ok(session.clone())
            }
            _ => Err(Error::NotFound {
                resource: "playground session".to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Record the user's message and mark the session as awaiting a reply.
    ///
    /// Fails without touching the transcript when the input is blank, the
    /// session is not ready to send, or a reply is already pending.
    pub fn begin_exchange(&self, id: PlaygroundSessionId, user_id: UserId, content: &str) -> Result<ChatMessage> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::BadRequest {
                message: "Message content cannot be empty".to_string(),
            });
        }

        let mut session = match self.inner.get_mut(&id) {
            Some(session) if session.user_id == user_id => session,
            _ => {
                return Err(Error::NotFound {
                    resource: "playground session".to_string(),
                    id: id.to_string(),
                });
            }
        };

        if !session.can_send() {
            return Err(Error::BadRequest {
                message: SETUP_WARNING.to_string(),
            });
        }

        if session.exchange == ExchangeState::AwaitingReply {
            return Err(Error::Conflict {
                message: "A reply is already being generated for this session".to_string(),
            });
        }

        let message = ChatMessage {
            role: MessageRole::User,
            content: content.to_string(),
            token_count: Some(0),
            created_at: Utc::now(),
        };
        session.messages.push(message.clone());
        session.exchange = ExchangeState::AwaitingReply;

        Ok(message)
    }

    /// Append the assistant reply and return the session to idle.
    ///
    /// Sessions can only disappear on process restart, in which case the reply
    /// has nowhere to go and the exchange reports not-found.
    pub fn complete_exchange(&self, id: PlaygroundSessionId) -> Result<ChatMessage> {
        let mut session = self.inner.get_mut(&id).ok_or_else(|| Error::NotFound {
            resource: "playground session".to_string(),
            id: id.to_string(),
        })?;

        let message = ChatMessage {
            role: MessageRole::Assistant,
            content: REPLY_TEXT.to_string(),
            token_count: Some(REPLY_TOKENS),
            created_at: Utc::now(),
        };
        session.messages.push(message.clone());
        session.exchange = ExchangeState::Idle;

        Ok(message)
    }
}
