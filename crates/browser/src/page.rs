use async_trait::async_trait;
use chromiumoxide::page::Page;
use dlwatch_core::{
    CookieStore, Document, ElementHandle, Host, Indicator, ListenError, Navigator, Target,
    INDICATOR_ID,
};
use dlwatch_storage::{cookie_assignment, expiry_assignment, read_cookie};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;

use crate::shared::{js, to_listen_error, LaunchConfig};

/// A live Chromium tab acting as the listener's host.
#[derive(Clone)]
pub struct ChromiumPage {
    page: Page,
    config: LaunchConfig,
}

impl ChromiumPage {
    pub fn new(page: Page, config: LaunchConfig) -> Self {
        Self { page, config }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn host(self: Arc<Self>) -> Host {
        Host::new(self.clone(), self.clone(), self.clone(), self)
    }

    async fn eval(&self, func: &str, args: &[Value], action: &str) -> Result<Value, ListenError> {
        let js = js::build_js_call(func, args);
        let result = self.page.evaluate(js).await
            .map_err(|e| to_listen_error(e, action))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Poll `document.readyState` until the page has loaded.
    pub async fn wait_until_ready(&self) -> Result<(), ListenError> {
        let start = Instant::now();
        loop {
            let state = match self.eval(js::element::CHECK_LOADING, &[], "WaitForReady").await {
                Ok(state) => state,
                // Page is navigating, try again shortly
                Err(e) if e.category == dlwatch_core::ErrorCategory::Navigation => Value::Null,
                Err(e) => return Err(e),
            };

            if state.get("loading").and_then(Value::as_bool) == Some(false) {
                tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "page ready");
                return Ok(());
            }

            if start.elapsed() > self.config.navigation {
                return Err(ListenError::navigation_error("Timed out waiting for page load")
                    .with_context(json!({ "timeout_ms": self.config.navigation.as_millis() as u64 })));
            }
            sleep(self.config.check_interval).await;
        }
    }

    async fn assign_cookie(&self, name: &str, assignment: String) -> Result<(), ListenError> {
        let enabled = self.eval(js::cookie::ASSIGN_COOKIE, &[json!(assignment)], "SetCookie").await?;
        if enabled.as_bool() == Some(false) {
            return Err(ListenError::cookie_unavailable(name, "Cookies are disabled in this page"));
        }
        Ok(())
    }
}

fn target_args(element: &ElementHandle) -> [Value; 3] {
    match &element.target {
        Target::Id(id) => [json!("id"), json!(id), json!(element.position)],
        Target::Selector(selector) => [json!("selector"), json!(selector), json!(element.position)],
    }
}

fn found(result: &Value, element: &ElementHandle) -> Result<(), ListenError> {
    if result.get("found").and_then(Value::as_bool) == Some(true) {
        Ok(())
    } else {
        Err(ListenError::target_not_found(format!("{} [{}]", element.target, element.position)))
    }
}

#[async_trait]
impl Document for ChromiumPage {
    async fn resolve(&self, target: &Target) -> Result<Vec<ElementHandle>, ListenError> {
        let (kind, query) = match target {
            Target::Id(id) => ("id", id),
            Target::Selector(selector) => ("selector", selector),
        };
        let count = self.eval(js::element::COUNT_ELEMENTS, &[json!(kind), json!(query)], "Resolve").await?;
        let count = count.as_u64().unwrap_or(0) as usize;
        Ok((0..count).map(|pos| ElementHandle::new(target.clone(), pos)).collect())
    }

    async fn href(&self, element: &ElementHandle) -> Result<Option<String>, ListenError> {
        let result = self.eval(js::element::GET_HREF, &target_args(element), "GetHref").await?;
        found(&result, element)?;
        Ok(result.get("href").and_then(Value::as_str).map(str::to_string))
    }

    async fn set_href(&self, element: &ElementHandle, href: &str) -> Result<(), ListenError> {
        let [kind, query, position] = target_args(element);
        let result = self.eval(js::element::SET_HREF, &[kind, query, position, json!(href)], "SetHref").await?;
        found(&result, element)
    }
}

#[async_trait]
impl CookieStore for ChromiumPage {
    async fn get(&self, name: &str) -> Result<Option<String>, ListenError> {
        let header = self.eval(js::cookie::READ_COOKIES, &[], "ReadCookie").await?;
        Ok(header.as_str().and_then(|h| read_cookie(h, name)))
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), ListenError> {
        self.assign_cookie(name, cookie_assignment(name, value)).await
    }

    async fn expire(&self, name: &str) -> Result<(), ListenError> {
        self.assign_cookie(name, expiry_assignment(name)).await
    }
}

#[async_trait]
impl Indicator for ChromiumPage {
    async fn show(&self, message: &str) -> Result<(), ListenError> {
        let result = self.eval(js::mask::SHOW_MASK, &[json!(INDICATOR_ID), json!(message)], "ShowMask").await?;
        if result.get("inserted").and_then(Value::as_bool) == Some(false) {
            tracing::debug!("indicator already present");
        }
        Ok(())
    }

    async fn hide(&self) -> Result<(), ListenError> {
        self.eval(js::mask::HIDE_MASK, &[json!(INDICATOR_ID)], "HideMask").await?;
        Ok(())
    }

    async fn is_shown(&self) -> Result<bool, ListenError> {
        let present = self.eval(js::mask::MASK_PRESENT, &[json!(INDICATOR_ID)], "MaskPresent").await?;
        Ok(present.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl Navigator for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<(), ListenError> {
        self.eval(js::element::NAVIGATE, &[json!(url)], "Navigate").await?;
        Ok(())
    }
}
