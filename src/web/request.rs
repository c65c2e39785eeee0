use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request},
    http::{header, HeaderMap},
    RequestExt,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// Read a JSON body into `T` and run its validation rules.
///
/// Malformed JSON, unknown fields and oversized bodies are bad requests;
/// rule violations come back keyed by field.
pub async fn decode<T>(req: Request) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let bytes = Bytes::from_request(req, &())
        .await
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let value: T = serde_json::from_slice(&bytes).map_err(|e| ApiError::bad_request(e.to_string()))?;
    value.validate()?;
    Ok(value)
}

/// Named path parameter of the matched route
pub async fn path_param(req: &mut Request, name: &str) -> Result<String, ApiError> {
    let Path(mut params) = req
        .extract_parts::<Path<HashMap<String, String>>>()
        .await
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    params
        .remove(name)
        .ok_or_else(|| ApiError::internal(format!("route has no {} parameter", name)))
}

/// Email and password from an `Authorization: Basic` header
pub fn basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}
