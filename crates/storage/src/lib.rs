use async_trait::async_trait;
use dlwatch_core::{CookieStore, ListenError};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// `expires` attribute that deletes a cookie.
pub const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Find `name` in a `document.cookie` style string (`a=1; b=2`).
pub fn read_cookie(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

/// Assignment string for `document.cookie` that sets `name` site-wide.
pub fn cookie_assignment(name: &str, value: &str) -> String {
    format!("{}={}; path=/", name, value)
}

/// Assignment string for `document.cookie` that deletes `name`.
pub fn expiry_assignment(name: &str) -> String {
    format!("{}=deleted; expires={}; path=/", name, EPOCH_EXPIRES)
}

/// The parts of a `Set-Cookie` header the handshake cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub http_only: bool,
    pub expired: bool,
}

impl SetCookie {
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        if name.is_empty() {
            return None;
        }

        let mut cookie = Self {
            name: name.to_string(),
            value: value.trim_matches('"').to_string(),
            path: None,
            http_only: false,
            expired: false,
        };

        for attr in parts {
            let (key, val) = attr.trim().split_once('=').unwrap_or((attr.trim(), ""));
            match key.to_ascii_lowercase().as_str() {
                "path" => cookie.path = Some(val.to_string()),
                "httponly" => cookie.http_only = true,
                "max-age" => cookie.expired |= val.trim().parse::<i64>().is_ok_and(|age| age <= 0),
                "expires" => cookie.expired |= val.contains("1970"),
                _ => {}
            }
        }
        Some(cookie)
    }

    /// Whether page script on any path could read it.
    pub fn visible_to_page(&self) -> bool {
        !self.http_only && self.path.as_deref().is_none_or(|p| p == "/")
    }
}

/// In-memory cookie namespace for one page.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a response header the way a browser would for page script.
    pub async fn apply_set_cookie(&self, header: &str) {
        let Some(cookie) = SetCookie::parse(header) else {
            tracing::debug!(header, "ignoring unparsable Set-Cookie");
            return;
        };
        if !cookie.visible_to_page() {
            tracing::debug!(name = %cookie.name, "ignoring cookie hidden from page script");
            return;
        }
        let mut cookies = self.cookies.lock().await;
        if cookie.expired {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name, cookie.value);
        }
    }

    /// `document.cookie` rendering, sorted by name.
    pub async fn header(&self) -> String {
        let cookies = self.cookies.lock().await;
        let mut pairs: Vec<_> = cookies.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        pairs.sort();
        pairs.join("; ")
    }
}

#[async_trait]
impl CookieStore for MemoryCookieJar {
    async fn get(&self, name: &str) -> Result<Option<String>, ListenError> {
        Ok(self.cookies.lock().await.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), ListenError> {
        self.cookies.lock().await.insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn expire(&self, name: &str) -> Result<(), ListenError> {
        self.cookies.lock().await.remove(name);
        Ok(())
    }
}

/// A page with cookies turned off: writes vanish, reads find nothing.
#[derive(Debug, Default)]
pub struct DisabledCookieJar;

#[async_trait]
impl CookieStore for DisabledCookieJar {
    async fn get(&self, _name: &str) -> Result<Option<String>, ListenError> {
        Ok(None)
    }

    async fn set(&self, _name: &str, _value: &str) -> Result<(), ListenError> {
        Ok(())
    }

    async fn expire(&self, _name: &str) -> Result<(), ListenError> {
        Ok(())
    }
}
