//! Normalized result shape returned by every request

use newwork_core::{ErrorContext, NewworkError, NewworkResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// Structured body of a successful response, decoded as the caller's type
    Json(T),
    /// Structured body of a non-success response (backend error document)
    Problem(serde_json::Value),
    /// Any non-structured body, surfaced verbatim
    Text(String),
}

/// Uniform success/payload/status/concurrency-token shape
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T> {
    /// Success classification of `status` (2xx)
    pub ok: bool,
    /// `None` when the response body was empty
    pub data: Option<Payload<T>>,
    /// The origin's current version marker (`ETag`), verbatim
    pub concurrency_token: Option<String>,
    pub status: u16,
}

impl<T> ResponseEnvelope<T> {
    pub fn json(&self) -> Option<&T> {
        match &self.data {
            Some(Payload::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<T> {
        match self.data {
            Some(Payload::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            Some(Payload::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn problem(&self) -> Option<&serde_json::Value> {
        match &self.data {
            Some(Payload::Problem(value)) => Some(value),
            _ => None,
        }
    }

    /// The `error` code of a backend error document, e.g. `version_mismatch`
    pub fn error_code(&self) -> Option<&str> {
        self.problem()?.get("error")?.as_str()
    }

    /// Version the server holds after a lost optimistic-concurrency race
    pub fn current_version(&self) -> Option<i64> {
        self.problem()?.get("currentVersion")?.as_i64()
    }

    /// Session expired or credential missing
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == StatusCode::FORBIDDEN.as_u16()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    /// Version mismatch: someone else updated the resource first
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT.as_u16()
    }

    /// The supplied precondition was rejected
    pub fn is_precondition_failed(&self) -> bool {
        self.status == StatusCode::PRECONDITION_FAILED.as_u16()
    }

    /// The write was refused because no precondition was supplied
    pub fn is_precondition_required(&self) -> bool {
        self.status == StatusCode::PRECONDITION_REQUIRED.as_u16()
    }
}

/// Whether a `Content-Type` value denotes structured (JSON) data
pub fn is_structured(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type == "application/json" || media_type.ends_with("+json")
}

/// Decode a response body according to its content kind and status
pub fn decode_payload<T: DeserializeOwned>(
    status: StatusCode,
    structured: bool,
    body: &[u8],
) -> NewworkResult<Option<Payload<T>>> {
    if body.is_empty() {
        return Ok(None);
    }

    if !structured {
        return Ok(Some(Payload::Text(
            String::from_utf8_lossy(body).into_owned(),
        )));
    }

    let decoded = if status.is_success() {
        serde_json::from_slice::<T>(body).map(Payload::Json)
    } else {
        serde_json::from_slice::<serde_json::Value>(body).map(Payload::Problem)
    };

    decoded.map(Some).map_err(|e| NewworkError::Decode {
        message: format!("Response declared JSON but the body could not be decoded: {}", e),
        status: status.as_u16(),
        source: Some(Box::new(e)),
        context: ErrorContext::new("api_client")
            .with_operation("decode_payload")
            .with_suggestion("Check that the response type matches the endpoint"),
    })
}
