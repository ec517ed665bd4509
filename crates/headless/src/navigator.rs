use async_trait::async_trait;
use dlwatch_core::{ListenError, Navigator};
use dlwatch_storage::MemoryCookieJar;
use reqwest::{Client, Url};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Follows clicked links over HTTP the way a browser starts a download.
///
/// The request runs in the background. Response `Set-Cookie` headers land in
/// the page's cookie jar as soon as the headers arrive; the body is drained
/// and discarded.
pub struct HttpNavigator {
    client: Client,
    base: Url,
    cookies: Arc<MemoryCookieJar>,
}

impl HttpNavigator {
    /// `base` resolves relative hrefs, like the page's own URL would.
    pub fn new(base: &str, cookies: Arc<MemoryCookieJar>) -> Result<Self, ListenError> {
        let base = Url::parse(base)
            .map_err(|e| ListenError::navigation_error(format!("Invalid base URL '{}': {}", base, e)))?;
        Ok(Self {
            client: Client::new(),
            base,
            cookies,
        })
    }

    async fn download(client: Client, url: Url, cookies: Arc<MemoryCookieJar>) -> Result<u64, ListenError> {
        let mut response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ListenError::network_error(format!("GET {} failed: {}", url, e)))?;

        for header in response.headers().get_all(reqwest::header::SET_COOKIE) {
            match header.to_str() {
                Ok(value) => cookies.apply_set_cookie(value).await,
                Err(_) => tracing::debug!(url = %url, "skipping non-ASCII Set-Cookie"),
            }
        }

        let mut received = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ListenError::network_error(format!("Reading {} failed: {}", url, e)))?
        {
            received += chunk.len() as u64;
        }
        Ok(received)
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&self, url: &str) -> Result<(), ListenError> {
        let url = self
            .base
            .join(url)
            .map_err(|e| ListenError::navigation_error(format!("Invalid URL '{}': {}", url, e)))?;

        tracing::debug!(url = %url, "starting download");
        let (client, cookies) = (self.client.clone(), Arc::clone(&self.cookies));
        tokio::spawn(async move {
            match Self::download(client, url.clone(), cookies).await {
                Ok(bytes) => tracing::debug!(url = %url, bytes, "download finished"),
                Err(e) => tracing::warn!(error = %e, "download failed"),
            }
        });
        Ok(())
    }
}

/// Remembers where clicks went without leaving the page.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn visited(&self) -> Vec<String> {
        self.visited.lock().await.clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, url: &str) -> Result<(), ListenError> {
        self.visited.lock().await.push(url.to_string());
        Ok(())
    }
}
