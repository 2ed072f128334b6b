//! Database models for projects.

use crate::types::{ProjectId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new project
#[derive(Debug, Clone)]
pub struct ProjectCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub description: String,
}

/// Database request for updating a project
#[derive(Debug, Clone)]
pub struct ProjectUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Database response for a project
#[derive(Debug, Clone)]
pub struct ProjectDBResponse {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
