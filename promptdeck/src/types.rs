//! Common type definitions.
//!
//! Type aliases for entity IDs plus small utilities shared across layers.

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ProjectId = Uuid;
pub type PromptId = Uuid;
pub type ProviderId = Uuid;
pub type ConversationId = Uuid;
pub type PlaygroundSessionId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
