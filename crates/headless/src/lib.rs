//! A host without a browser: HTML parsed with `scraper`, cookies in memory,
//! downloads over `reqwest`.

mod document;
mod indicator;
mod navigator;

pub use document::StaticDocument;
pub use indicator::{IndicatorNode, MemoryIndicator};
pub use navigator::{HttpNavigator, RecordingNavigator};

use dlwatch_core::Host;
use dlwatch_storage::MemoryCookieJar;
use std::sync::Arc;

/// The pieces of a headless page, kept typed so callers can inspect them.
pub struct HeadlessPage {
    pub document: Arc<StaticDocument>,
    pub cookies: Arc<MemoryCookieJar>,
    pub indicator: Arc<MemoryIndicator>,
    pub navigator: Arc<HttpNavigator>,
}

impl HeadlessPage {
    /// `base` is the page's own URL; relative links resolve against it.
    pub fn new(html: &str, base: &str) -> Result<Self, dlwatch_core::ListenError> {
        let cookies = Arc::new(MemoryCookieJar::new());
        let navigator = Arc::new(HttpNavigator::new(base, Arc::clone(&cookies))?);
        Ok(Self {
            document: Arc::new(StaticDocument::parse(html)),
            cookies,
            indicator: Arc::new(MemoryIndicator::new()),
            navigator,
        })
    }

    pub fn host(&self) -> Host {
        Host::new(
            self.document.clone(),
            self.cookies.clone(),
            self.indicator.clone(),
            self.navigator.clone(),
        )
    }
}
