use anyhow::Context;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;

use crate::web::Outcome;

/// Serialize `value` as the JSON body with `status`. A 204 carries no body.
pub fn respond<T: Serialize>(value: &T, status: StatusCode) -> Outcome {
    if status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }

    let body = serde_json::to_vec(value).context("marshalling value to json")?;
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
        .into_response())
}
