//! Project API models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::projects::ProjectDBResponse;
use crate::types::ProjectId;

/// Payload for creating a project.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectCreate {
    pub name: String,
    /// Optional description, defaults to empty
    #[serde(default)]
    pub description: String,
}

/// Payload for updating a project. All fields optional.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Project returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectDBResponse> for ProjectResponse {
    fn from(project: ProjectDBResponse) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}
