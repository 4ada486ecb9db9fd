//! Extractors that turn malformed input into `ServiceError` responses.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::validation::{FromQueryParams, QueryParams};

/// Query string coerced into a typed list query.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: FromQueryParams,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ServiceError::bad_request(e.body_text()))?;

        let query = T::from_query_params(&QueryParams::from(raw))?;
        Ok(ValidQuery(query))
    }
}

/// JSON request body. Decode failures become `400` with the decoder's message.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ServiceError::bad_request(e.body_text()))?;
        Ok(JsonBody(value))
    }
}
