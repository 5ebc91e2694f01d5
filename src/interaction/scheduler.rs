//! Delayed navigation tasks scoped to a page
//!
//! Every scheduled navigation is a tokio task owned by the scheduler's
//! `JoinSet`. Dropping the scheduler aborts whatever is still pending, so no
//! timer outlives the page that scheduled it.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinError, JoinSet};

/// Performs the actual navigation once a delay elapses
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, href: &str);
}

/// Remembers every href it was asked to visit, in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, href: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(href.to_string());
        }
    }
}

/// Cancels one scheduled navigation
#[derive(Debug, Clone)]
pub struct NavigationHandle {
    href: String,
    abort: AbortHandle,
}

impl NavigationHandle {
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Cancel the navigation if it has not happened yet
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Owns the pending navigations of one page
pub struct NavigationScheduler {
    tasks: JoinSet<()>,
    navigator: Arc<dyn Navigator>,
}

impl NavigationScheduler {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            tasks: JoinSet::new(),
            navigator,
        }
    }

    /// Navigate to `href` after `delay`. Requires a tokio runtime.
    pub fn schedule(&mut self, href: String, delay: Duration) -> NavigationHandle {
        self.reap();
        tracing::debug!("Scheduling navigation to {} in {:?}", href, delay);
        let navigator = Arc::clone(&self.navigator);
        let target = href.clone();
        let abort = self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(&target);
        });
        NavigationHandle { href, abort }
    }

    /// Drop tasks that already ran or were cancelled
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            log_task_result(result);
        }
    }

    /// Tasks not yet reaped (pending, or finished since the last schedule)
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every pending navigation
    pub fn cancel_all(&mut self) {
        self.tasks.abort_all();
    }

    /// Wait until every scheduled navigation has run or been cancelled
    pub async fn settle(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            log_task_result(result);
        }
    }
}

fn log_task_result(result: Result<(), JoinError>) {
    if let Err(err) = result {
        if !err.is_cancelled() {
            tracing::warn!("Navigation task failed: {}", err);
        }
    }
}

impl std::fmt::Debug for NavigationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationScheduler")
            .field("pending", &self.tasks.len())
            .finish()
    }
}
