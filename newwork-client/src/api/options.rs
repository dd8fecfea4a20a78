//! Per-call request descriptor

use newwork_core::{ErrorContext, NewworkError, NewworkResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// HTTP verbs understood by the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(format!("Unsupported method: {}", s)),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Options bundle for a single call through [`super::ApiClient::request`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Serialized JSON body
    pub body: Option<Vec<u8>>,
    /// Opaque version marker sent as `If-Match`
    pub if_match: Option<String>,
    /// Additional request headers
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    pub fn put() -> Self {
        Self::new(Method::Put)
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    /// Attach a JSON body, serializing it now
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> NewworkResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| NewworkError::InvalidRequest {
            message: format!("Failed to serialize request body: {}", e),
            field: Some("body".to_string()),
            context: ErrorContext::new("request_options").with_operation("json"),
        })?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Attach an already-serialized JSON body
    pub fn raw_json(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Make the call conditional on the resource still carrying `token`
    pub fn if_match(mut self, token: impl Into<String>) -> Self {
        self.if_match = Some(token.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
