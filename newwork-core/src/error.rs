//! Unified error handling system
//!
//! Structured error types with context, recovery suggestions, and proper error chaining.
//! Protocol-level failures (non-success HTTP statuses) are NOT errors here; they travel
//! inside the request layer's result envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type NewworkResult<T> = Result<T, NewworkError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Newwork client stack
#[derive(Error, Debug)]
pub enum NewworkError {
    /// The request never produced an HTTP response (DNS, connect, TLS, timeout...)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// The response claimed structured content but the body could not be decoded
    #[error("Decode error (HTTP {status}): {message}")]
    Decode {
        message: String,
        status: u16,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// The request could not be assembled (bad header name/value, bad body)
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl NewworkError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            NewworkError::Transport { context, .. }
            | NewworkError::Decode { context, .. }
            | NewworkError::InvalidRequest { context, .. }
            | NewworkError::Config { context, .. }
            | NewworkError::Timeout { context, .. }
            | NewworkError::Internal { context, .. } => context,
        }
    }

    /// HTTP status associated with the failure, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            NewworkError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if error is recoverable by simply trying again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NewworkError::Transport { .. } | NewworkError::Timeout { .. }
        )
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            NewworkError::Transport { .. } => Some(1000),
            NewworkError::Timeout { .. } => Some(2000),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().error_id.as_str();
        match self {
            NewworkError::Transport { .. } | NewworkError::Timeout { .. } => {
                warn!(
                    error_id = %error_id,
                    error = %self,
                    "Transport error (may be recoverable)"
                );
            }
            NewworkError::Config { .. } | NewworkError::InvalidRequest { .. } => {
                error!(
                    error_id = %error_id,
                    error = %self,
                    "Configuration or request construction error"
                );
            }
            _ => {
                error!(
                    error_id = %error_id,
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::NewworkError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check NEWWORK_API_URL or your configuration file"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::NewworkError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check NEWWORK_API_URL or your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! transport_error {
    ($msg:expr, $component:expr) => {
        $crate::NewworkError::Transport {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check network connectivity and that the backend is running"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::NewworkError::Transport {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check network connectivity and that the backend is running"),
        }
    };
}

#[macro_export]
macro_rules! invalid_request_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::NewworkError::InvalidRequest {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Header names and values must be valid HTTP tokens"),
        }
    };
}
