//! HTTP surface: routes, request validation, error mapping and API documentation.

/// Error type returned by handlers.
pub mod error;
/// JSON extractor that validates after decoding.
pub mod extractors;
/// Route handlers.
pub mod handlers;
/// Request logging.
pub mod middleware;
/// Request and response bodies.
pub mod models;
/// OpenAPI document served by Swagger UI.
pub mod openapi;
/// Field validation rules.
pub mod validation;

use crate::users::UserRepository;

use axum::{Router, routing::get};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// User persistence.
    pub users: UserRepository,
    /// Cancelled when the server gives up waiting for in-flight requests.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Bundles the repository with the server's shutdown token.
    pub fn new(users: UserRepository, shutdown: CancellationToken) -> Self {
        Self { users, shutdown }
    }
}

/// Builds the application router with every route and middleware.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::read_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        );

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger").url("/swagger/doc.json", openapi::ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::log_request))
        .with_state(state)
}
