use serde::{Deserialize, Serialize};

/// Error categories for the download listener and its hosts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Id or selector resolved to zero elements
    TargetNotFound,
    /// A bound element has no usable URL
    MalformedUrl,
    /// The host refused a cookie read or write
    CookieUnavailable,
    /// The completion callback returned an error or panicked
    CallbackFailed,
    /// JavaScript execution errors
    Script,
    /// Navigation or page load errors
    Navigation,
    /// Browser/driver errors
    Browser,
    /// Parsing errors (HTML/selector)
    Parsing,
    /// HTTP transport errors
    Network,
}

/// Structured error with context for debugging
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{category:?}] {message}")]
pub struct ListenError {
    /// Error category for programmatic handling
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Optional context (selector, url, cookie name, etc.)
    pub context: serde_json::Value,
}

impl ListenError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    // Convenience constructors
    pub fn target_not_found(target: impl std::fmt::Display) -> Self {
        let target = target.to_string();
        Self::new(ErrorCategory::TargetNotFound, format!("No element matches {}", target))
            .with_context(serde_json::json!({ "target": target }))
    }

    pub fn malformed_url(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::MalformedUrl, message)
    }

    pub fn cookie_unavailable(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::CookieUnavailable, message)
            .with_context(serde_json::json!({ "cookie": name }))
    }

    pub fn callback_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::CallbackFailed, message)
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Script, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parsing, message)
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }
}
