//! Application factory
//!
//! Builds the Actix-web application: shared state, JSON handling, request
//! tracing, and the route table with the authentication gateway applied to the
//! routes that need it.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::InternalError,
    http::StatusCode,
    web, App, Error, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use tg_core::repositories::{TokenRepository, UserRepository};
use tg_shared::config::ServerConfig;

use crate::dto::ErrorResponse;
use crate::middleware::auth::{AccessValidator, IpScopedAuth};
use crate::routes::auth::{login::login, logout::logout, refresh::refresh, register::register};
use crate::routes::protected::{info, profile, protected, public};
use crate::routes::AppState;

/// Create and configure the application with all dependencies
pub fn create_app<U, T>(
    app_state: web::Data<AppState<U, T>>,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    let validator: Arc<dyn AccessValidator> = app_state.session_service.clone();
    let required = IpScopedAuth::required(Arc::clone(&validator));
    let optional = IpScopedAuth::optional(validator);

    App::new()
        .app_data(app_state)
        .app_data(json_config(server.max_payload_size))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(register::<U, T>))
                        .route("/login", web::post().to(login::<U, T>))
                        .route("/refresh", web::post().to(refresh::<U, T>))
                        .service(
                            web::resource("/logout")
                                .wrap(required.clone())
                                .route(web::post().to(logout::<U, T>)),
                        ),
                )
                .service(
                    web::resource("/protected")
                        .wrap(required.clone())
                        .route(web::get().to(protected)),
                )
                .service(
                    web::resource("/profile")
                        .wrap(required)
                        .route(web::get().to(profile::<U, T>)),
                )
                .service(
                    web::resource("/public")
                        .wrap(optional)
                        .route(web::get().to(public)),
                )
                .route("/info", web::get().to(info)),
        )
        .default_service(web::route().to(not_found))
}

/// JSON extractor configuration answering malformed bodies in the API error format
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let response = ErrorResponse::new(format!("Invalid JSON body: {}", err))
                .with_code("INVALID_JSON")
                .to_response(StatusCode::BAD_REQUEST);
            InternalError::from_response(err, response).into()
        })
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tokengate",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    ErrorResponse::new("Route not found")
        .with_code("NOT_FOUND")
        .to_response(StatusCode::NOT_FOUND)
}
