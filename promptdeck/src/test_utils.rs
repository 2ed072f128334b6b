//! Test utilities for integration testing.

use axum_test::TestServer;
use base64::Engine;
use sqlx::SqlitePool;

use crate::config::Config;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        encryption_key: Some(base64::engine::general_purpose::STANDARD.encode([0u8; 32])),
        auth: crate::config::AuthConfig {
            allow_registration: true,
            session: crate::config::SessionConfig {
                // Tests run over plain HTTP
                cookie_secure: false,
                ..Default::default()
            },
            password: crate::config::PasswordConfig {
                // Fast hashing for tests
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Build a test server on an already-migrated pool.
pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    let config = create_test_config();
    let app = crate::Application::from_pool(config, pool).expect("Failed to create application");
    app.into_test_server()
}

/// Register a user and return their session cookie value.
pub async fn register_and_login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/authentication/register")
        .json(&serde_json::json!({"email": email, "password": password}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("registration should set a session cookie")
        .to_str()
        .expect("cookie header should be valid UTF-8");

    // Keep only the name=value pair
    set_cookie.split(';').next().expect("cookie should have a value").to_string()
}

/// Create a project and return its id.
pub async fn create_project(server: &TestServer, cookie: &str, name: &str) -> String {
    let response = server
        .post("/api/v1/projects")
        .add_header(axum::http::header::COOKIE, cookie)
        .json(&serde_json::json!({"name": name}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["id"].as_str().expect("project id").to_string()
}
