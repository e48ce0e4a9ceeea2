//! Request decoding: path ids and JSON bodies.
//!
//! Both extractors reject with [`ApiError::BadRequest`] so handlers never
//! see undecodable input. No field-level validation happens here.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::response::ApiError;
use crate::error::DecodeError;
use crate::items::ItemId;

/// Item id taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub ItemId);

/// JSON request body, decoded regardless of the request's content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBody<T>(pub T);

/// Parse a raw path segment into an item id.
pub fn parse_id(raw: &str) -> Result<ItemId, DecodeError> {
    raw.parse()
        .map_err(|_| DecodeError::InvalidId(raw.to_string()))
}

/// Decode a JSON document into `T`.
pub fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError::Body(e.to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| DecodeError::InvalidId(e.body_text()))?;

        let id = parse_id(&raw).inspect_err(|e| debug!(error = %e, "Rejected path id"))?;
        Ok(PathId(id))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| DecodeError::Body(e.body_text()))?;

        let value = decode_body(&bytes).inspect_err(|e| debug!(error = %e, "Rejected body"))?;
        Ok(JsonBody(value))
    }
}
