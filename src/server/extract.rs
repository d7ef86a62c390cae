use axum::Json;
use axum::extract::{FromRequest, Request};
use mizar_schema::{FieldError, Validate};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor that runs schema validation before the handler.
///
/// Shape errors (malformed JSON, a missing required field, a wrong type)
/// surface through the `Json` rejection, whose text names the offending
/// field; value constraints are then checked by [`Validate`], which
/// reports every violation at once. Both paths end in the same 422
/// validation response.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::validation(vec![FieldError::new("body", rejection.body_text())])
            })?;

        value.validate().map_err(ApiError::validation)?;
        Ok(ValidJson(value))
    }
}
