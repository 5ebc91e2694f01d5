//! Page-ready auto-initialization
//!
//! The coordinator owns the one piece of mutable state in the system: whether
//! this page has been initialized. It lives exactly as long as the page; a
//! reload means a new coordinator.

use crate::core::config::LoadOptions;
use crate::renderer::{EntityRenderer, RenderResult};
use crate::view::page::{ContainerProbe, PageSurface};

/// Why page-ready did not trigger a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Already initialized, automatically or explicitly
    AlreadyInitialized,
    NoContainer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutoInit {
    Ran(RenderResult),
    Skipped(SkipReason),
}

/// Guards against initializing a page twice
#[derive(Debug, Default)]
pub struct InitCoordinator {
    initialized: bool,
}

impl InitCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handle a page-ready event
    ///
    /// Loads the source named by the container's data attribute (the
    /// configured default when it has none), at most once per coordinator.
    /// The guard is set before the load runs, so a failed
    /// load is not retried automatically.
    pub async fn on_page_ready<P: PageSurface + ?Sized>(
        &mut self,
        renderer: &mut EntityRenderer,
        page: &mut P,
    ) -> AutoInit {
        if self.initialized {
            return AutoInit::Skipped(SkipReason::AlreadyInitialized);
        }

        let source = match page.probe_container(renderer.config()) {
            ContainerProbe::Missing => return AutoInit::Skipped(SkipReason::NoContainer),
            ContainerProbe::Present(Some(source)) if !source.is_empty() => source,
            ContainerProbe::Present(_) => renderer.config().default_source.clone(),
        };

        self.initialized = true;
        tracing::debug!("Auto-initializing entity page from {}", source);
        let options = renderer.config().load_options();
        AutoInit::Ran(renderer.load(page, Some(&source), options).await)
    }

    /// Explicit load; marks the page initialized so page-ready won't repeat it
    pub async fn load<P: PageSurface + ?Sized>(
        &mut self,
        renderer: &mut EntityRenderer,
        page: &mut P,
        source: Option<&str>,
        options: LoadOptions,
    ) -> RenderResult {
        self.initialized = true;
        renderer.load(page, source, options).await
    }
}
