use async_trait::async_trait;
use std::sync::Arc;

use crate::{ElementHandle, ListenError, Target};

/// Element lookup and URL access on the page.
#[async_trait]
pub trait Document: Send + Sync {
    /// All elements the target names, in document order. Zero is not an error.
    async fn resolve(&self, target: &Target) -> Result<Vec<ElementHandle>, ListenError>;

    /// The element's current URL, `None` when it has none.
    async fn href(&self, element: &ElementHandle) -> Result<Option<String>, ListenError>;

    async fn set_href(&self, element: &ElementHandle, href: &str) -> Result<(), ListenError>;
}

/// The page-wide cookie namespace. Writes are scoped to path `/`.
#[async_trait]
pub trait CookieStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>, ListenError>;

    async fn set(&self, name: &str, value: &str) -> Result<(), ListenError>;

    /// Delete the cookie so later reads see it absent.
    async fn expire(&self, name: &str) -> Result<(), ListenError>;
}

/// The blocking "generating/downloading" indicator. A singleton per page.
#[async_trait]
pub trait Indicator: Send + Sync {
    /// Show with `message`; a no-op when already shown.
    async fn show(&self, message: &str) -> Result<(), ListenError>;

    async fn hide(&self) -> Result<(), ListenError>;

    async fn is_shown(&self) -> Result<bool, ListenError>;
}

/// The default action of a click: follow the element's URL.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), ListenError>;
}

/// The capabilities a binding runs against.
#[derive(Clone)]
pub struct Host {
    pub document: Arc<dyn Document>,
    pub cookies: Arc<dyn CookieStore>,
    pub indicator: Arc<dyn Indicator>,
    pub navigator: Arc<dyn Navigator>,
}

impl Host {
    pub fn new(
        document: Arc<dyn Document>,
        cookies: Arc<dyn CookieStore>,
        indicator: Arc<dyn Indicator>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { document, cookies, indicator, navigator }
    }
}
