//! In-memory page used to drive sessions and extraction without a browser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::scraper::config::{RowSelectors, ScraperConfig};
use crate::scraper::driver::{DriverError, DriverResult, PageDriver, RawRow, RawTitle};

/// A fake chapter page. Fields are public so each test can break the page
/// the way it needs to.
pub struct ScriptedPage {
    pub source: String,
    pub navigation_timeout: bool,
    pub content_ready: bool,
    pub title: Option<RawTitle>,
    pub english_rows: Vec<RawRow>,
    pub geez_rows: Vec<RawRow>,
    pub alternate_toggle: bool,
    pub default_toggle: bool,
    /// Rows of the Ge'ez table fail to read
    pub broken_geez_table: bool,
    pub showing_alternate: bool,
    pub actions: Arc<Mutex<Vec<String>>>,
    pub releases: Arc<AtomicUsize>,
    config: ScraperConfig,
}

impl ScriptedPage {
    /// A well-formed page with `verses` rows in both languages
    pub fn chapter(verses: usize) -> Self {
        let english_rows = (1..=verses)
            .map(|n| RawRow::new(&format!("10:{}", n), &format!("  English   verse\n{}  ", n)))
            .collect();
        let geez_rows = (1..=verses)
            .map(|n| RawRow::new(&format!("፲:{}", n), &format!("ግዕዝ  ቃል\t{} ", n)))
            .collect();

        Self {
            source: "<html><body><div class=\"mainChapterContainer\"></div></body></html>".into(),
            navigation_timeout: false,
            content_ready: true,
            title: Some(RawTitle {
                book: "Deuteronomy Chapter 10".into(),
                chapter: "Chapter 10".into(),
            }),
            english_rows,
            geez_rows,
            alternate_toggle: true,
            default_toggle: true,
            broken_geez_table: false,
            showing_alternate: false,
            actions: Arc::new(Mutex::new(Vec::new())),
            releases: Arc::new(AtomicUsize::new(0)),
            config: ScraperConfig::default(),
        }
    }

    fn log(&self, action: String) {
        if let Ok(mut actions) = self.actions.lock() {
            actions.push(action);
        }
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> DriverResult<()> {
        self.log(format!("navigate {}", url));
        if self.navigation_timeout {
            return Err(DriverError::Timeout(format!("loading {}", url)));
        }
        self.showing_alternate = false;
        Ok(())
    }

    async fn page_source(&mut self) -> DriverResult<String> {
        self.log("source".into());
        Ok(self.source.clone())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> DriverResult<()> {
        self.log(format!("wait {}", selector));
        let present = if selector == self.config.content_ready_selector {
            self.content_ready
        } else if selector == self.config.alternate_rows_selector {
            self.showing_alternate
        } else if selector == self.config.default_container_selector {
            !self.showing_alternate
        } else {
            false
        };

        if present {
            Ok(())
        } else {
            Err(DriverError::Timeout(format!("waiting for {}", selector)))
        }
    }

    async fn click_when_ready(&mut self, selector: &str, _timeout: Duration) -> DriverResult<()> {
        self.log(format!("click {}", selector));
        if selector == self.config.alternate_toggle_selector && self.alternate_toggle {
            self.showing_alternate = true;
            Ok(())
        } else if selector == self.config.default_toggle_selector && self.default_toggle {
            self.showing_alternate = false;
            Ok(())
        } else {
            Err(DriverError::NotFound(selector.to_string()))
        }
    }

    async fn read_title(
        &mut self,
        _title_selector: &str,
        _chapter_class: &str,
    ) -> DriverResult<Option<RawTitle>> {
        self.log("title".into());
        Ok(self.title.clone())
    }

    async fn read_rows(&mut self, selectors: RowSelectors<'_>) -> DriverResult<Vec<RawRow>> {
        self.log(format!("rows {}", selectors.rows));
        if selectors.rows == self.config.alternate_rows_selector {
            if self.broken_geez_table {
                return Err(DriverError::Script("table detached".into()));
            }
            Ok(self.geez_rows.clone())
        } else {
            Ok(self.english_rows.clone())
        }
    }

    async fn release(self) -> DriverResult<()> {
        self.log("release".into());
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
