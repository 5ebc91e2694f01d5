//! Entity renderer: fetch, validate, project, attach
//!
//! `load` is the only entry point that touches the network or disk. Every
//! failure is caught here, logged, and returned as [`RenderResult::Failed`];
//! the page is only mutated once a document has fully validated.

use crate::core::config::{LoadOptions, RendererConfig};
use crate::core::error::EntityError;
use crate::document::EntityDocument;
use crate::fetch::Fetcher;
use crate::interaction::{attach_click_delay, ClickDelay, LinkClassifier};
use crate::view::page::PageSurface;
use crate::view::patch::plan;

/// Outcome of one load
#[derive(Debug, Clone, PartialEq)]
pub enum RenderResult {
    Loaded(EntityDocument),
    Failed(EntityError),
}

impl RenderResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, RenderResult::Loaded(_))
    }

    pub fn document(&self) -> Option<&EntityDocument> {
        match self {
            RenderResult::Loaded(doc) => Some(doc),
            RenderResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&EntityError> {
        match self {
            RenderResult::Loaded(_) => None,
            RenderResult::Failed(err) => Some(err),
        }
    }
}

/// Loads entity documents and renders them onto a page
#[derive(Debug, Clone)]
pub struct EntityRenderer {
    fetcher: Fetcher,
    config: RendererConfig,
    classifier: LinkClassifier,
}

impl Default for EntityRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl EntityRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self::with_fetcher(config, Fetcher::new())
    }

    pub fn with_fetcher(config: RendererConfig, fetcher: Fetcher) -> Self {
        let classifier = LinkClassifier::from_config(&config);
        Self {
            fetcher,
            config,
            classifier,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Fetch `source` (the configured default when `None`) and render it
    ///
    /// Never fails past this boundary: errors come back as
    /// [`RenderResult::Failed`] after being logged.
    pub async fn load<P: PageSurface + ?Sized>(
        &mut self,
        page: &mut P,
        source: Option<&str>,
        options: LoadOptions,
    ) -> RenderResult {
        let source = source
            .unwrap_or(self.config.default_source.as_str())
            .to_string();

        match self.fetch_document(&source, options.bypass_cache).await {
            Ok(doc) => {
                self.render(page, &doc, options);
                tracing::info!(
                    "Rendered entity {:?} from {}",
                    doc.meta.as_ref().and_then(|m| m.entity.as_deref()).unwrap_or(""),
                    source
                );
                RenderResult::Loaded(doc)
            }
            Err(err) => {
                tracing::error!("Entity load failed for {}: {}", source, err);
                RenderResult::Failed(err)
            }
        }
    }

    /// Project an already-validated document and attach link handlers
    pub fn render<P: PageSurface + ?Sized>(
        &self,
        page: &mut P,
        doc: &EntityDocument,
        options: LoadOptions,
    ) {
        let patches = plan(doc);
        let skipped = patches.iter().filter(|patch| !page.apply(patch)).count();
        if skipped > 0 {
            tracing::debug!("{} of {} patches hit absent anchors", skipped, patches.len());
        }

        let handler = ClickDelay::new(options.click_delay_ms, self.config.fade_class.clone());
        attach_click_delay(page, &self.classifier, &handler);
    }

    async fn fetch_document(
        &mut self,
        source: &str,
        bypass_cache: bool,
    ) -> crate::core::error::Result<EntityDocument> {
        let body = self.fetcher.fetch(source, bypass_cache).await?;
        EntityDocument::from_json(source, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::page::Page;
    use crate::view::patch::Anchor;
    use std::path::PathBuf;

    fn fixture_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "entity-sheet-renderer-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        for (file, body) in files {
            std::fs::write(dir.join(file), body).unwrap();
        }
        dir
    }

    fn renderer_in(dir: &PathBuf) -> EntityRenderer {
        EntityRenderer::with_fetcher(RendererConfig::default(), Fetcher::with_base_dir(dir))
    }

    #[tokio::test]
    async fn test_load_default_source() {
        let dir = fixture_dir(
            "default",
            &[(
                "readme.json",
                r#"{ "meta": { "entity": "Drake", "humanName": "Ash Drake" }, "lore": "Old" }"#,
            )],
        );
        let mut renderer = renderer_in(&dir);
        let mut page = Page::standard(None);

        let result = renderer.load(&mut page, None, LoadOptions::default()).await;
        assert!(result.is_loaded());
        assert_eq!(page.document_title, "Drake — Ash Drake");
        assert_eq!(page.text(Anchor::Lore), Some("Old"));
        assert!(page.links()[0].click_delay.is_some());
    }

    #[tokio::test]
    async fn test_schema_failure_leaves_page_untouched() {
        let dir = fixture_dir("schema", &[("bad.json", r#"{ "lore": 42 }"#)]);
        let mut renderer = renderer_in(&dir);
        let mut page = Page::standard(None);
        let before = page.to_html();

        let result = renderer.load(&mut page, Some("bad.json"), LoadOptions::default()).await;
        assert!(result.error().unwrap().is_schema());
        assert_eq!(page.to_html(), before);
        assert!(page.links()[0].click_delay.is_none());
    }

    #[tokio::test]
    async fn test_click_delay_uses_options() {
        let dir = fixture_dir("delay", &[("readme.json", "{}")]);
        let mut renderer = renderer_in(&dir);
        let mut page = Page::standard(None);

        let options = LoadOptions {
            click_delay_ms: 50,
            bypass_cache: true,
        };
        renderer.load(&mut page, None, options).await;
        let handler = page.links()[0].click_delay.as_ref().unwrap();
        assert_eq!(handler.delay.as_millis(), 50);
        assert_eq!(handler.fade_class, "page-fade-out");
    }
}
