//! The cookie contract between the page and the download endpoint.
//!
//! The client puts `downloadTokenName` and `downloadTokenValue` on the
//! download URL. Once the file is ready to stream, the server sets a cookie
//! named by the first with the value of the second, on path `/`, readable by
//! page script.

use crate::query::query_parameter;

pub const TOKEN_NAME_PARAM: &str = "downloadTokenName";
pub const TOKEN_VALUE_PARAM: &str = "downloadTokenValue";

/// Value the handshake cookie holds between cycles. Never a valid token.
pub const COOKIE_SENTINEL: &str = "0";

/// What a download endpoint received and must echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandshake {
    pub cookie_name: String,
    pub token: String,
}

impl ServerHandshake {
    /// Both parameters must be present and non-empty.
    pub fn from_url(url: &str) -> Option<Self> {
        let cookie_name = query_parameter(url, TOKEN_NAME_PARAM).filter(|s| !s.is_empty())?;
        let token = query_parameter(url, TOKEN_VALUE_PARAM).filter(|s| !s.is_empty())?;
        Some(Self { cookie_name, token })
    }

    /// `Set-Cookie` header value the endpoint should send with the file.
    pub fn set_cookie_header(&self) -> String {
        format!("{}={}; Path=/", self.cookie_name, self.token)
    }
}
