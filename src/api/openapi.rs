use crate::api::{
    handlers,
    models::{CreateUserRequest, HealthResponse, UpdateUserRequest, UserResponse},
};

use utoipa::OpenApi;

/// OpenAPI document for the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Service API",
        version = "1.0",
        description = "User management over a single-table DynamoDB layout",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::health,
        handlers::create_user,
        handlers::list_users,
        handlers::read_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Users", description = "User management operations")
    )
)]
pub struct ApiDoc;
