use async_trait::async_trait;
use dlwatch_core::{Indicator, ListenError, INDICATOR_ID};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorNode {
    pub id: &'static str,
    pub message: String,
}

/// The indicator as an in-memory node slot, checked by its fixed id.
#[derive(Debug, Default)]
pub struct MemoryIndicator {
    node: Mutex<Option<IndicatorNode>>,
    insertions: AtomicUsize,
}

impl MemoryIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node(&self) -> Option<IndicatorNode> {
        self.node.lock().await.clone()
    }

    /// How many times a node was actually inserted.
    pub fn insertions(&self) -> usize {
        self.insertions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Indicator for MemoryIndicator {
    async fn show(&self, message: &str) -> Result<(), ListenError> {
        let mut node = self.node.lock().await;
        if node.as_ref().is_some_and(|n| n.id == INDICATOR_ID) {
            return Ok(());
        }
        *node = Some(IndicatorNode {
            id: INDICATOR_ID,
            message: message.to_string(),
        });
        self.insertions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn hide(&self) -> Result<(), ListenError> {
        self.node.lock().await.take();
        Ok(())
    }

    async fn is_shown(&self) -> Result<bool, ListenError> {
        Ok(self.node.lock().await.is_some())
    }
}
