//! Database request/response models.

pub mod projects;
pub mod prompts;
pub mod providers;
pub mod users;
