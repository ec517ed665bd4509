use async_trait::async_trait;
use dlwatch_core::{Document, ElementHandle, ListenError, Target};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A parsed HTML page whose element URLs can be rewritten.
///
/// The markup is fixed at construction; only `href` values change.
pub struct StaticDocument {
    source: String,
    hrefs: Mutex<HashMap<usize, String>>,
}

impl StaticDocument {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let hrefs = elements_in_order(&document)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, el)| el.value().attr("href").map(|href| (idx, href.to_string())))
            .collect();

        Self {
            source: html.to_string(),
            hrefs: Mutex::new(hrefs),
        }
    }

    /// Document-order indices of every element `target` names.
    fn matches(&self, target: &Target) -> Result<Vec<usize>, ListenError> {
        let document = Html::parse_document(&self.source);
        let ordered = elements_in_order(&document);

        let indices = match target {
            Target::Id(id) => ordered
                .iter()
                .position(|el| el.value().id() == Some(id.as_str()))
                .into_iter()
                .collect(),
            Target::Selector(selector) => {
                let sel = Selector::parse(selector).map_err(|e| {
                    ListenError::parsing_error(format!("Invalid selector '{}': {}", selector, e))
                })?;
                let positions: HashMap<_, _> =
                    ordered.iter().enumerate().map(|(idx, el)| ((**el).id(), idx)).collect();
                document
                    .select(&sel)
                    .filter_map(|el| positions.get(&(*el).id()).copied())
                    .collect()
            }
        };
        Ok(indices)
    }

    fn index_of(&self, element: &ElementHandle) -> Result<usize, ListenError> {
        self.matches(&element.target)?
            .get(element.position)
            .copied()
            .ok_or_else(|| {
                ListenError::target_not_found(format!("{} [{}]", element.target, element.position))
            })
    }
}

fn elements_in_order(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect()
}

#[async_trait]
impl Document for StaticDocument {
    async fn resolve(&self, target: &Target) -> Result<Vec<ElementHandle>, ListenError> {
        let count = self.matches(target)?.len();
        Ok((0..count).map(|pos| ElementHandle::new(target.clone(), pos)).collect())
    }

    async fn href(&self, element: &ElementHandle) -> Result<Option<String>, ListenError> {
        let idx = self.index_of(element)?;
        Ok(self.hrefs.lock().await.get(&idx).cloned())
    }

    async fn set_href(&self, element: &ElementHandle, href: &str) -> Result<(), ListenError> {
        let idx = self.index_of(element)?;
        self.hrefs.lock().await.insert(idx, href.to_string());
        Ok(())
    }
}
