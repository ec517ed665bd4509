//! Shared types for detecting when a link-triggered download has finished.
//!
//! A click stamps the link with a fresh token; the server echoes the token
//! into a cookie once the file is ready; the page polls that cookie.

mod config;
mod error;
mod handshake;
mod host;
pub mod query;
mod target;
mod token;

pub use config::{
    Callback, DisabledFn, ListenConfig, ListenOptions, SharedParams, DEFAULT_ATTEMPTS,
    DEFAULT_MESSAGE, DEFAULT_TOKEN_NAME,
};
pub use error::{ErrorCategory, ListenError};
pub use handshake::{ServerHandshake, COOKIE_SENTINEL, TOKEN_NAME_PARAM, TOKEN_VALUE_PARAM};
pub use host::{CookieStore, Document, Host, Indicator, Navigator};
pub use target::{BindingContext, ElementHandle, Target};
pub use token::Token;

/// Fixed id of the indicator node.
pub const INDICATOR_ID: &str = "down-loading";
