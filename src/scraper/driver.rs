use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::scraper::config::RowSelectors;

/// Failures reported by a browser backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Raw text of the chapter heading, before any parsing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTitle {
    pub book: String,
    pub chapter: String,
}

/// One table row as found in the DOM. A `None` cell was missing from the row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    pub number: Option<String>,
    pub content: Option<String>,
}

impl RawRow {
    pub fn new(number: &str, content: &str) -> Self {
        Self {
            number: Some(number.to_string()),
            content: Some(content.to_string()),
        }
    }
}

/// The narrow set of browser operations a page session needs.
///
/// Every wait is bounded by the timeout passed in; implementations must not
/// retry beyond it.
#[async_trait]
pub trait PageDriver: Send + 'static {
    /// Load `url`, failing with [`DriverError::Timeout`] past `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> DriverResult<()>;

    /// Current serialized DOM
    async fn page_source(&mut self) -> DriverResult<String>;

    /// Wait until at least one element matches `selector`
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// Wait until the element matching `selector` is clickable, then click it
    async fn click_when_ready(&mut self, selector: &str, timeout: Duration) -> DriverResult<()>;

    /// Read the book and chapter headings, `None` if either is missing
    async fn read_title(
        &mut self,
        title_selector: &str,
        chapter_class: &str,
    ) -> DriverResult<Option<RawTitle>>;

    /// Read every row matching the selectors, in document order
    async fn read_rows(&mut self, selectors: RowSelectors<'_>) -> DriverResult<Vec<RawRow>>;

    /// Shut the browser down
    async fn release(self) -> DriverResult<()>;
}
