//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, registration, session info
//! - **Projects** (`/api/v1/projects/*`): Project CRUD
//! - **Prompts** (`/api/v1/prompts/*`): Prompt template CRUD
//! - **Providers** (`/api/v1/providers/*`): Provider credential CRUD and catalog
//! - **Playground** (`/api/v1/playground/*`): Ephemeral chat sessions
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
