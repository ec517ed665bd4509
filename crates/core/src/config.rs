use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::BindingContext;

pub const DEFAULT_ATTEMPTS: u32 = 30;
pub const DEFAULT_TOKEN_NAME: &str = "downloadToken";
pub const DEFAULT_MESSAGE: &str = "Generating file... if this takes too long, check back later";

/// Decides once, at bind time, whether clicks on the binding are suppressed.
pub type DisabledFn = Arc<dyn Fn(&BindingContext) -> bool + Send + Sync>;

/// Runs once per finished cycle, after teardown.
pub type Callback = Arc<dyn Fn(&BindingContext) -> anyhow::Result<()> + Send + Sync>;

/// Extra query parameters, re-read on every click.
///
/// Clones share the same mapping, so a caller holding one can change values
/// between clicks.
#[derive(Clone, Default)]
pub struct SharedParams {
    inner: Arc<RwLock<Vec<(String, String)>>>,
}

impl SharedParams {
    pub fn new<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { inner: Arc::new(RwLock::new(pairs)) }
    }

    /// Insert or overwrite one key, keeping its original position.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        let mut pairs = self.inner.write().await;
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
    }

    pub async fn remove(&self, key: &str) {
        self.inner.write().await.retain(|(k, _)| k != key);
    }

    pub async fn snapshot(&self) -> Vec<(String, String)> {
        self.inner.read().await.clone()
    }
}

impl fmt::Debug for SharedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read() {
            Ok(pairs) => f.debug_map().entries(pairs.iter().map(|(k, v)| (k, v))).finish(),
            Err(_) => f.write_str("SharedParams(<locked>)"),
        }
    }
}

impl<'de> Deserialize<'de> for SharedParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(Self::new(map))
    }
}

/// Caller overrides. Every field left `None` falls back to the default table.
///
/// From JSON the recognized keys are `attempts`, `tokenName`, `message` and
/// `param`; anything else is ignored.
#[derive(Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenOptions {
    pub attempts: Option<u32>,
    pub token_name: Option<String>,
    pub message: Option<String>,
    pub param: Option<SharedParams>,
    #[serde(skip)]
    pub is_disabled_func: Option<DisabledFn>,
    #[serde(skip)]
    pub callback: Option<Callback>,
}

impl ListenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn token_name(mut self, name: impl Into<String>) -> Self {
        self.token_name = Some(name.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn param(mut self, param: SharedParams) -> Self {
        self.param = Some(param);
        self
    }

    pub fn is_disabled<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&BindingContext) -> bool + Send + Sync + 'static,
    {
        self.is_disabled_func = Some(Arc::new(predicate));
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BindingContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for ListenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenOptions")
            .field("attempts", &self.attempts)
            .field("token_name", &self.token_name)
            .field("message", &self.message)
            .field("param", &self.param)
            .field("is_disabled_func", &self.is_disabled_func.is_some())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The effective configuration of one binding. Immutable once built.
#[derive(Clone)]
pub struct ListenConfig {
    pub attempts: u32,
    pub token_name: String,
    pub message: String,
    pub is_disabled_func: DisabledFn,
    pub param: Option<SharedParams>,
    pub callback: Option<Callback>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            is_disabled_func: Arc::new(|_: &BindingContext| false),
            param: None,
            callback: None,
        }
    }
}

impl ListenConfig {
    /// Caller overrides over the defaults.
    pub fn merge(options: ListenOptions) -> Self {
        let defaults = Self::default();
        Self {
            attempts: options.attempts.unwrap_or(defaults.attempts),
            token_name: options.token_name.unwrap_or(defaults.token_name),
            message: options.message.unwrap_or(defaults.message),
            is_disabled_func: options.is_disabled_func.unwrap_or(defaults.is_disabled_func),
            param: options.param.or(defaults.param),
            callback: options.callback.or(defaults.callback),
        }
    }
}

impl fmt::Debug for ListenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenConfig")
            .field("attempts", &self.attempts)
            .field("token_name", &self.token_name)
            .field("message", &self.message)
            .field("param", &self.param)
            .field("callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}
