use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the chapter scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page load timeout in seconds (default: 30)
    pub page_load_timeout_secs: u64,

    /// How long to wait for the verse table to appear after load (default: 15)
    pub content_ready_timeout_secs: u64,

    /// How long to wait for a language toggle to take effect (default: 10)
    pub toggle_timeout_secs: u64,

    /// How long to wait when restoring the English rendering (default: 5)
    pub restore_timeout_secs: u64,

    /// Interval between DOM readiness checks in milliseconds (default: 100)
    pub poll_interval_ms: u64,

    /// Case-insensitive marker that identifies a CAPTCHA page
    pub blocked_marker: String,

    /// Element that must exist before the page counts as loaded
    pub content_ready_selector: String,

    /// Verse rows of the English rendering
    pub default_rows_selector: String,

    /// Verse rows of the Ge'ez rendering
    pub alternate_rows_selector: String,

    /// Book title element in the English rendering
    pub book_title_selector: String,

    /// Class of the chapter title inside the book title element
    pub chapter_title_class: String,

    /// Button that switches the page to Ge'ez
    pub alternate_toggle_selector: String,

    /// Button that switches the page back to English
    pub default_toggle_selector: String,

    /// Element present once the English rendering is showing
    pub default_container_selector: String,

    /// Class of the verse number cell in a row
    pub verse_number_class: String,

    /// Class of the verse text cell in a row
    pub verse_content_class: String,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            page_load_timeout_secs: 30,
            content_ready_timeout_secs: 15,
            toggle_timeout_secs: 10,
            restore_timeout_secs: 5,
            poll_interval_ms: 100,
            blocked_marker: "captcha".to_string(),
            content_ready_selector: ".kjvBibleChapterContainer tbody tr".to_string(),
            default_rows_selector: ".kjvBibleChapterContainer tbody tr".to_string(),
            alternate_rows_selector: ".geezBibleChapterContainer tbody tr".to_string(),
            book_title_selector: ".kjvBibleChapterContainer .bookTitle".to_string(),
            chapter_title_class: "chapterTitle".to_string(),
            alternate_toggle_selector: "button.language.geez".to_string(),
            default_toggle_selector: "button.colorizer[value='0']".to_string(),
            default_container_selector: ".kjvBibleChapterContainer".to_string(),
            verse_number_class: "verseNumCell".to_string(),
            verse_content_class: "verseContentCell".to_string(),
            user_agent: Some(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScraperConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn content_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.content_ready_timeout_secs)
    }

    pub fn toggle_timeout(&self) -> Duration {
        Duration::from_secs(self.toggle_timeout_secs)
    }

    pub fn restore_timeout(&self) -> Duration {
        Duration::from_secs(self.restore_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Selectors for reading the English rows
    pub fn default_rows(&self) -> RowSelectors<'_> {
        RowSelectors {
            rows: &self.default_rows_selector,
            number_class: &self.verse_number_class,
            content_class: &self.verse_content_class,
        }
    }

    /// Selectors for reading the Ge'ez rows
    pub fn alternate_rows(&self) -> RowSelectors<'_> {
        RowSelectors {
            rows: &self.alternate_rows_selector,
            number_class: &self.verse_number_class,
            content_class: &self.verse_content_class,
        }
    }

    /// Config with tight timeouts, useful for local test pages.
    pub fn fast() -> Self {
        Self {
            page_load_timeout_secs: 10,
            content_ready_timeout_secs: 5,
            toggle_timeout_secs: 3,
            restore_timeout_secs: 2,
            poll_interval_ms: 50,
            ..Default::default()
        }
    }
}

/// Where the cells of a verse table live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSelectors<'a> {
    pub rows: &'a str,
    pub number_class: &'a str,
    pub content_class: &'a str,
}
