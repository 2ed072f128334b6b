//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and ownership checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, logout, and session info
//! - [`projects`]: Project CRUD
//! - [`prompts`]: Prompt template CRUD
//! - [`providers`]: Provider credential CRUD and the static catalog
//! - [`playground`]: Ephemeral chat sessions and message exchange
//!
//! # Authentication
//!
//! All handlers outside `/authentication` require a session cookie. The
//! [`crate::auth::current_user`] extractor resolves the current user.
//!
//! # Ownership
//!
//! Resources are scoped per user: a row owned by someone else is reported as
//! not found, never as forbidden.

pub mod auth;
pub mod playground;
pub mod projects;
pub mod prompts;
pub mod providers;
