use crate::users::{User, UserPatch};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Liveness response.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok`.
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    pub(crate) fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Body of `POST /api/users`. Absent fields decode as empty and fail validation.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    /// Display name, at least 2 characters once trimmed.
    #[validate(custom(function = "crate::api::validation::validate_name"))]
    #[schema(example = "Ann Example", min_length = 2)]
    pub name: String,
    /// Contact email.
    #[validate(custom(function = "crate::api::validation::validate_email"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
    /// Password, at least 8 characters.
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "correct-horse", min_length = 8)]
    pub password: String,
}

/// Body of `PATCH /api/users/{id}`. Empty or absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateUserRequest {
    /// Replacement display name.
    #[validate(custom(function = "crate::api::validation::validate_optional_name"))]
    #[schema(example = "Annie Example")]
    pub name: String,
    /// Replacement email.
    #[validate(custom(function = "crate::api::validation::validate_optional_email"))]
    pub email: String,
    /// Replacement password.
    #[validate(custom(function = "crate::api::validation::validate_optional_password"))]
    pub password: String,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

/// A user as returned by the API.
#[derive(Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct UserResponse {
    /// Identifier minted at creation.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Password as stored.
    pub password: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            password: user.password,
        }
    }
}
