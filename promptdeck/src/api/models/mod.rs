//! API request and response data models.
//!
//! These are distinct from the database models in [`crate::db::models`], so the
//! public API contract can evolve independently of storage. All models carry
//! `utoipa` annotations for the generated OpenAPI document.

pub mod auth;
pub mod pagination;
pub mod playground;
pub mod projects;
pub mod prompts;
pub mod providers;
pub mod users;
