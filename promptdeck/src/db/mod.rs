//! Database layer: repositories over SQLite.
//!
//! Each entity has a model module (request/response shapes) and a handler
//! module (the repository that runs the queries).

pub mod errors;
pub mod handlers;
pub mod models;
