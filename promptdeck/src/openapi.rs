//! OpenAPI documentation for the management API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::{api, playground};

/// Session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "CookieAuth".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("promptdeck_session"))),
            );
        }
    }
}

/// Resource endpoints nested under `/api/v1`.
#[derive(OpenApi)]
#[openapi(paths(
    api::handlers::projects::list_projects,
    api::handlers::projects::create_project,
    api::handlers::projects::get_project,
    api::handlers::projects::update_project,
    api::handlers::projects::delete_project,
    api::handlers::prompts::list_prompts,
    api::handlers::prompts::create_prompt,
    api::handlers::prompts::get_prompt,
    api::handlers::prompts::update_prompt,
    api::handlers::prompts::delete_prompt,
    api::handlers::providers::get_catalog,
    api::handlers::providers::list_providers,
    api::handlers::providers::create_provider,
    api::handlers::providers::get_provider,
    api::handlers::providers::update_provider,
    api::handlers::providers::delete_provider,
    api::handlers::playground::create_session,
    api::handlers::playground::get_session,
    api::handlers::playground::update_session,
    api::handlers::playground::list_messages,
    api::handlers::playground::send_message,
))]
struct V1ApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "promptdeck API",
        description = "Admin console API for managing LLM projects, prompt templates, provider credentials, and a playground for trying prompts out."
    ),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
    ),
    nest(
        (path = "/api/v1", api = V1ApiDoc)
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::RegisterRequest,
        api::models::auth::AuthResponse,
        api::models::auth::LogoutResponse,
        api::models::users::UserResponse,
        api::models::projects::ProjectCreate,
        api::models::projects::ProjectUpdate,
        api::models::projects::ProjectResponse,
        api::models::prompts::PromptCreate,
        api::models::prompts::PromptUpdate,
        api::models::prompts::PromptResponse,
        api::models::providers::ProviderCreate,
        api::models::providers::ProviderUpdate,
        api::models::providers::ProviderResponse,
        api::models::providers::CatalogEntry,
        api::models::playground::SessionUpdate,
        api::models::playground::SendMessageRequest,
        api::models::playground::SessionResponse,
        api::models::playground::ExchangeResponse,
        playground::ChatMessage,
        playground::MessageRole,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Registration, login, and session management"),
        (name = "projects", description = "Project management"),
        (name = "prompts", description = "Prompt template management"),
        (name = "providers", description = "Provider credential management"),
        (name = "playground", description = "Playground chat sessions"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_builds() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json().unwrap();
        assert!(json.contains("/api/v1/projects"));
        assert!(json.contains("/api/v1/playground/sessions"));
        assert!(json.contains("/authentication/login"));
    }
}
