//! Fade-out navigation for outbound links
//!
//! Navigable links get a [`ClickDelay`] handler. Clicking one suppresses the
//! immediate navigation, puts the page in its fading state and schedules the
//! real navigation on a [`NavigationScheduler`] after the configured delay.

pub mod scheduler;

pub use scheduler::{NavigationHandle, NavigationScheduler, Navigator, RecordingNavigator};

use crate::core::config::RendererConfig;
use crate::view::page::{Link, PageSurface};
use std::time::Duration;

/// Handler attached to a navigable link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickDelay {
    pub delay: Duration,
    /// Page-wide class marking the fade-out state
    pub fade_class: String,
}

/// What a handler decides for one click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDecision {
    /// Leave the default behavior alone (fragment or missing href)
    PassThrough,
    /// Suppress navigation now, go to `href` after `delay`
    Defer { href: String, delay: Duration },
}

impl ClickDelay {
    pub fn new(delay_ms: u64, fade_class: impl Into<String>) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            fade_class: fade_class.into(),
        }
    }

    pub fn decide(&self, href: Option<&str>) -> ClickDecision {
        match href {
            None | Some("") => ClickDecision::PassThrough,
            Some(h) if h.starts_with('#') => ClickDecision::PassThrough,
            Some(h) => ClickDecision::Defer {
                href: h.to_string(),
                delay: self.delay,
            },
        }
    }
}

/// Decides which links are navigable: any link carrying one of the
/// configured classes
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    classes: Vec<String>,
}

impl LinkClassifier {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(config.link_classes.clone())
    }

    pub fn is_navigable(&self, link: &Link) -> bool {
        self.classes.iter().any(|class| link.has_class(class))
    }
}

/// Attach `handler` to every navigable link, replacing a previous one.
/// Returns how many links received it.
pub fn attach_click_delay<P: PageSurface + ?Sized>(
    page: &mut P,
    classifier: &LinkClassifier,
    handler: &ClickDelay,
) -> usize {
    let mut attached = 0;
    for link in page.links_mut() {
        if classifier.is_navigable(link) {
            link.click_delay = Some(handler.clone());
            attached += 1;
        }
    }
    tracing::debug!("Attached click delay to {} link(s)", attached);
    attached
}

/// Result of clicking a link on the page
#[derive(Debug)]
pub enum ClickOutcome {
    /// No such link, or no handler attached
    Unhandled,
    /// Handler declined; default behavior proceeds
    PassThrough,
    /// Navigation suppressed and scheduled
    Deferred(NavigationHandle),
}

impl ClickOutcome {
    /// Whether the default navigation was prevented
    pub fn prevented_default(&self) -> bool {
        matches!(self, ClickOutcome::Deferred(_))
    }
}

/// Dispatch a click on the link at `index`
///
/// Must run inside a tokio runtime when the click is deferred. Each deferred
/// click schedules its own navigation; there is no guard against repeats.
pub fn click<P: PageSurface + ?Sized>(
    page: &mut P,
    index: usize,
    scheduler: &mut NavigationScheduler,
) -> ClickOutcome {
    let Some(link) = page.links().get(index) else {
        return ClickOutcome::Unhandled;
    };
    let Some(handler) = link.click_delay.clone() else {
        return ClickOutcome::Unhandled;
    };

    match handler.decide(link.href.as_deref()) {
        ClickDecision::PassThrough => ClickOutcome::PassThrough,
        ClickDecision::Defer { href, delay } => {
            page.add_body_class(&handler.fade_class);
            ClickOutcome::Deferred(scheduler.schedule(href, delay))
        }
    }
}
