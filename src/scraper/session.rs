use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ExtractionFailure;
use crate::scraper::config::ScraperConfig;
use crate::scraper::driver::{DriverError, PageDriver, RawRow, RawTitle};
use crate::scraper::events::{EventSink, Phase, ScrapeEvent};

/// Which language view of the chapter the page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// English, what the site shows on load
    Default,
    /// Ge'ez, shown after clicking the language toggle
    Alternate,
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendering::Default => f.write_str("default"),
            Rendering::Alternate => f.write_str("alternate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Loaded(Rendering),
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unopened => f.write_str("unopened"),
            SessionState::Loaded(r) => write!(f, "loaded({})", r),
            SessionState::Closed => f.write_str("closed"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Timed out loading {url}: {detail}")]
    NavigationTimeout { url: String, detail: String },

    #[error("CAPTCHA detected at {url}")]
    BlockedContent { url: String },

    #[error("Could not switch to {target} rendering: {detail}")]
    ToggleUnavailable { target: Rendering, detail: String },

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("{0}")]
    Page(String),
}

impl SessionError {
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::NavigationTimeout { .. } => "navigation_timeout",
            SessionError::BlockedContent { .. } => "blocked_content",
            SessionError::ToggleUnavailable { .. } => "toggle_unavailable",
            SessionError::InvalidState { .. } => "invalid_state",
            SessionError::Page(_) => "page_error",
        }
    }
}

impl From<SessionError> for ExtractionFailure {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NavigationTimeout { url, .. } => ExtractionFailure::NavigationTimeout { url },
            SessionError::BlockedContent { url } => ExtractionFailure::BlockedContent { url },
            e @ SessionError::ToggleUnavailable { .. } => {
                ExtractionFailure::LanguageSwitchFailed(e.to_string())
            }
            e @ SessionError::InvalidState { .. } => ExtractionFailure::InvalidState(e.to_string()),
            SessionError::Page(msg) => ExtractionFailure::Page(msg),
        }
    }
}

/// One browser handle positioned at one chapter.
///
/// ```text
/// Unopened --open--> Loaded(default) <--switch_language--> Loaded(alternate)
///     \                    |                                     |
///      `------------------ close ------------------------------- ' --> Closed
/// ```
///
/// The handle is released exactly once: by [`close`](Self::close), or when the
/// session is dropped without being closed (an abandoned request).
pub struct PageSession<D: PageDriver> {
    driver: Option<D>,
    state: SessionState,
    url: String,
    config: ScraperConfig,
    sink: Arc<dyn EventSink>,
}

impl<D: PageDriver> PageSession<D> {
    pub fn new(driver: D, config: ScraperConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            driver: Some(driver),
            state: SessionState::Unopened,
            url: String::new(),
            config,
            sink,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// URL passed to the last `open`, empty before that
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Load the chapter and wait for the English verse table.
    pub async fn open(&mut self, url: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Unopened {
            return Err(self.invalid("open"));
        }
        self.url = url.to_string();

        let result = self.load(url).await;
        match &result {
            Ok(()) => {
                self.state = SessionState::Loaded(Rendering::Default);
                self.emit(ScrapeEvent::info(url, Phase::Open, "Page loaded"));
            }
            Err(e) => self.emit(ScrapeEvent::error(url, Phase::Open, e.reason(), e.to_string())),
        }
        result
    }

    async fn load(&mut self, url: &str) -> Result<(), SessionError> {
        let page_load = self.config.page_load_timeout();
        let ready_timeout = self.config.content_ready_timeout();
        let marker = self.config.blocked_marker.to_lowercase();
        let ready_selector = self.config.content_ready_selector.clone();
        let driver = self.driver_mut("open")?;

        driver
            .navigate(url, page_load)
            .await
            .map_err(|e| navigation_error(url, e))?;

        let source = driver
            .page_source()
            .await
            .map_err(|e| SessionError::Page(e.to_string()))?;
        if !marker.is_empty() && source.to_lowercase().contains(&marker) {
            return Err(SessionError::BlockedContent {
                url: url.to_string(),
            });
        }

        driver
            .wait_for(&ready_selector, ready_timeout)
            .await
            .map_err(|e| navigation_error(url, e))
    }

    /// Click the toggle for `target` and wait for its rows to render.
    ///
    /// The page gives no guarantee that toggling into the current view is a
    /// no-op, so the click and readiness check always happen.
    pub async fn switch_language(&mut self, target: Rendering) -> Result<(), SessionError> {
        let timeout = self.config.toggle_timeout();
        let result = self.toggle(target, timeout).await;
        if let Err(e) = &result {
            self.emit(ScrapeEvent::warn(&self.url, Phase::Switch, e.reason(), e.to_string()));
        }
        result
    }

    /// Best-effort switch back to English under the shorter restore budget.
    pub async fn restore_default(&mut self) -> Result<(), SessionError> {
        let timeout = self.config.restore_timeout();
        let result = self.toggle(Rendering::Default, timeout).await;
        match &result {
            Ok(()) => self.emit(ScrapeEvent::info(
                &self.url,
                Phase::Restore,
                "Switched back to English",
            )),
            Err(e) => self.emit(ScrapeEvent::warn(
                &self.url,
                Phase::Restore,
                e.reason(),
                format!("Could not switch back to English: {}", e),
            )),
        }
        result
    }

    async fn toggle(&mut self, target: Rendering, timeout: Duration) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Loaded(_)) {
            return Err(self.invalid("switch language"));
        }

        let (button, ready) = match target {
            Rendering::Default => (
                self.config.default_toggle_selector.clone(),
                self.config.default_container_selector.clone(),
            ),
            Rendering::Alternate => (
                self.config.alternate_toggle_selector.clone(),
                self.config.alternate_rows_selector.clone(),
            ),
        };

        let driver = self.driver_mut("switch language")?;
        let unavailable = |e: DriverError| SessionError::ToggleUnavailable {
            target,
            detail: e.to_string(),
        };
        driver
            .click_when_ready(&button, timeout)
            .await
            .map_err(unavailable)?;
        driver.wait_for(&ready, timeout).await.map_err(unavailable)?;

        self.state = SessionState::Loaded(target);
        Ok(())
    }

    /// Chapter heading as rendered in English
    pub async fn read_title(&mut self) -> Result<Option<RawTitle>, SessionError> {
        if !matches!(self.state, SessionState::Loaded(_)) {
            return Err(self.invalid("read title"));
        }
        let title_selector = self.config.book_title_selector.clone();
        let chapter_class = self.config.chapter_title_class.clone();
        self.driver_mut("read title")?
            .read_title(&title_selector, &chapter_class)
            .await
            .map_err(|e| SessionError::Page(e.to_string()))
    }

    /// Verse rows of one rendering, in page order
    pub async fn read_rows(&mut self, rendering: Rendering) -> Result<Vec<RawRow>, SessionError> {
        if !matches!(self.state, SessionState::Loaded(_)) {
            return Err(self.invalid("read rows"));
        }
        let config = self.config.clone();
        let selectors = match rendering {
            Rendering::Default => config.default_rows(),
            Rendering::Alternate => config.alternate_rows(),
        };
        self.driver_mut("read rows")?
            .read_rows(selectors)
            .await
            .map_err(|e| SessionError::Page(format!("Reading {} rows: {}", rendering, e)))
    }

    /// Restore English if needed, then release the browser. Never fails;
    /// problems are reported to the sink.
    pub async fn close(&mut self) {
        if self.state == SessionState::Loaded(Rendering::Alternate) {
            // Failure is recorded by restore_default itself
            let _ = self.restore_default().await;
        }

        self.state = SessionState::Closed;
        let Some(driver) = self.driver.take() else {
            return;
        };

        match driver.release().await {
            Ok(()) => self.emit(ScrapeEvent::info(&self.url, Phase::Close, "Browser closed")),
            Err(e) => self.emit(ScrapeEvent::warn(
                &self.url,
                Phase::Close,
                "release_failed",
                format!("Browser did not shut down cleanly: {}", e),
            )),
        }
    }

    fn driver_mut(&mut self, operation: &'static str) -> Result<&mut D, SessionError> {
        let state = self.state;
        self.driver
            .as_mut()
            .ok_or(SessionError::InvalidState { operation, state })
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            state: self.state,
        }
    }

    fn emit(&self, event: ScrapeEvent) {
        self.sink.record(&event);
    }
}

impl<D: PageDriver> Drop for PageSession<D> {
    fn drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };

        self.sink.record(&ScrapeEvent::warn(
            &self.url,
            Phase::Close,
            "abandoned",
            "Session dropped without close, releasing browser",
        ));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = driver.release().await {
                        tracing::warn!("Failed to release abandoned browser: {}", e);
                    }
                });
            }
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build();
                match runtime {
                    Ok(rt) => {
                        if let Err(e) = rt.block_on(driver.release()) {
                            tracing::warn!("Failed to release abandoned browser: {}", e);
                        }
                    }
                    Err(e) => tracing::error!("No runtime to release browser: {}", e),
                }
            }
        }
    }
}

fn navigation_error(url: &str, err: DriverError) -> SessionError {
    match err {
        DriverError::Timeout(detail) => SessionError::NavigationTimeout {
            url: url.to_string(),
            detail,
        },
        other => SessionError::Page(format!("Loading {}: {}", url, other)),
    }
}
