use crate::{api::validation::Problems, users::RepositoryError};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as _;
use thiserror::Error;

/// Failure of a request, rendered as a sanitized response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not valid JSON for the request type.
    #[error("request body rejected: {0}")]
    InvalidBody(#[from] JsonRejection),
    /// The body decoded but some fields break their rules.
    #[error("request failed validation")]
    Validation(Problems),
    /// The path id is not a valid identifier.
    #[error("invalid user id `{0}`")]
    InvalidId(String),
    /// The repository call failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::Validation(_) | Self::InvalidId(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::AlreadyExists) => StatusCode::CONFLICT,
            Self::Repository(RepositoryError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) | Self::Validation(_) => "Invalid request body",
            Self::InvalidId(_) => "Invalid ID",
            Self::Repository(RepositoryError::NotFound) => "User not found",
            Self::Repository(RepositoryError::AlreadyExists) => "User already exists",
            Self::Repository(RepositoryError::Io(_)) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(problems) => {
                tracing::info!(?problems, "request failed validation");
                (status, Json(problems)).into_response()
            }
            err => {
                tracing::error!(
                    error = %err,
                    source = ?err.source().map(ToString::to_string),
                    status = status.as_u16(),
                    "request failed"
                );
                (status, err.message()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[rstest]
    #[case::invalid_id(
        ApiError::InvalidId("nope".to_string()),
        StatusCode::BAD_REQUEST,
        "Invalid ID"
    )]
    #[case::not_found(
        ApiError::Repository(RepositoryError::NotFound),
        StatusCode::NOT_FOUND,
        "User not found"
    )]
    #[case::already_exists(
        ApiError::Repository(RepositoryError::AlreadyExists),
        StatusCode::CONFLICT,
        "User already exists"
    )]
    #[case::io_hides_details(
        ApiError::Repository(RepositoryError::Io(StoreError::Transport("10.0.0.7 refused".to_string()))),
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error"
    )]
    #[case::cancelled(
        ApiError::Repository(RepositoryError::Io(StoreError::Cancelled)),
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error"
    )]
    #[tokio::test]
    async fn test_error_responses(
        #[case] err: ApiError,
        #[case] expected_status: StatusCode,
        #[case] expected_body: &str,
    ) {
        let (status, body) = render(err).await;
        assert_eq!(status, expected_status);
        assert_eq!(body, expected_body);
    }

    #[tokio::test]
    async fn test_validation_response_is_a_problem_map() {
        let problems = Problems::from([("email".to_string(), "invalid email format".to_string())]);
        let (status, body) = render(ApiError::Validation(problems)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"email":"invalid email format"}"#);
    }
}
