use crate::api::{error::ApiError, validation};

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has been decoded and then validated.
///
/// A body that does not decode is rejected with [`ApiError::InvalidBody`]; one that decodes but
/// breaks a field rule is rejected with [`ApiError::Validation`] listing every offending field.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|errors| ApiError::Validation(validation::problems(&errors)))?;
        Ok(Self(value))
    }
}
