//! Database repositories.

pub mod projects;
pub mod prompts;
pub mod providers;
pub mod repository;
pub mod users;

pub use projects::Projects;
pub use prompts::Prompts;
pub use providers::Providers;
pub use repository::Repository;
pub use users::Users;
