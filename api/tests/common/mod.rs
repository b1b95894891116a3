//! Shared fixtures for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;

use tg_api::routes::AppState;
use tg_core::services::{
    AuthService, AuthServiceConfig, CredentialSigner, SessionService, TokenServiceConfig,
};
use tg_infra::memory::{InMemoryTokenRepository, InMemoryUserRepository};
use tg_shared::config::JwtConfig;

pub type TestState = AppState<InMemoryUserRepository, InMemoryTokenRepository>;

pub const LOGIN_IP: &str = "198.51.100.10";
pub const OTHER_IP: &str = "203.0.113.99";

/// Services over empty in-memory stores, with a cheap bcrypt cost
pub fn test_state() -> web::Data<TestState> {
    let signer = CredentialSigner::new(TokenServiceConfig::from(&JwtConfig::new(
        "api-test-access-secret",
        "api-test-refresh-secret",
    )))
    .unwrap();

    let tokens = Arc::new(InMemoryTokenRepository::new());
    let session_service = Arc::new(SessionService::new(tokens, signer));
    let auth_service = Arc::new(AuthService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::clone(&session_service),
        AuthServiceConfig {
            bcrypt_cost: 4,
            ..AuthServiceConfig::default()
        },
    ));

    web::Data::new(AppState::new(auth_service, session_service))
}

/// Call the service and decode the JSON body
macro_rules! call_json {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        (status, body)
    }};
}

/// Request builders
pub mod requests {
    use actix_web::test::TestRequest;
    use serde_json::json;

    pub fn register(username: &str, password: &str) -> TestRequest {
        TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "username": username, "password": password }))
    }

    pub fn login(username: &str, password: &str, ip: &str) -> TestRequest {
        TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("X-Forwarded-For", ip))
            .set_json(json!({ "username": username, "password": password }))
    }

    pub fn login_scoped(username: &str, password: &str, ip: &str, scopes: &[&str]) -> TestRequest {
        TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("X-Forwarded-For", ip))
            .set_json(json!({ "username": username, "password": password, "allowedIps": scopes }))
    }

    pub fn refresh(refresh_token: &str, ip: &str) -> TestRequest {
        TestRequest::post()
            .uri("/api/auth/refresh")
            .insert_header(("X-Forwarded-For", ip))
            .set_json(json!({ "refreshToken": refresh_token }))
    }

    pub fn authed_get(uri: &str, access_token: &str, ip: &str) -> TestRequest {
        TestRequest::get()
            .uri(uri)
            .insert_header(("Authorization", format!("Bearer {}", access_token)))
            .insert_header(("X-Forwarded-For", ip))
    }

    pub fn logout(access_token: &str, ip: &str) -> TestRequest {
        TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(("Authorization", format!("Bearer {}", access_token)))
            .insert_header(("X-Forwarded-For", ip))
    }
}
