use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use dlwatch_core::ListenError;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::page::ChromiumPage;
use crate::shared::{to_listen_error, LaunchConfig};

/// A launched Chromium process and its event handler task.
pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    config: LaunchConfig,
}

impl ChromiumSession {
    pub async fn launch(config: LaunchConfig) -> Result<Self, ListenError> {
        // A fresh profile per instance avoids SingletonLock conflicts
        let temp_dir = std::env::temp_dir().join(format!("chromium-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)
            .map_err(|e| ListenError::browser_error(format!("Failed to create temp dir: {}", e)))?;

        let mut builder = ChromeConfig::builder()
            .headless_mode(if config.headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(temp_dir);

        if let (Some(w), Some(h)) = (config.viewport_width, config.viewport_height) {
            builder = builder.window_size(w, h);
        }

        let chrome_cfg = builder.build()
            .map_err(|e| ListenError::browser_error(format!("Config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| ListenError::browser_error(format!("Launch failed: {}", e)))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        tracing::debug!(headless = config.headless, "chromium launched");
        Ok(Self { browser, handler, config })
    }

    /// Open `url` in a new tab and wait for it to load.
    pub async fn open(&self, url: &str) -> Result<ChromiumPage, ListenError> {
        let page = self.browser.new_page(url).await
            .map_err(|e| to_listen_error(e, "NewPage"))?;
        let page = ChromiumPage::new(page, self.config.clone());
        page.wait_until_ready().await?;
        Ok(page)
    }

    pub async fn close(mut self) -> Result<(), ListenError> {
        self.browser.close().await
            .map_err(|e| to_listen_error(e, "Close"))?;
        self.handler.abort();
        Ok(())
    }
}
