//! Browser-driven extraction of parallel English/Ge'ez chapters.
//!
//! # Architecture
//!
//! ```text
//! ChapterRequest → PageSession (open) → ChapterExtractor → ChapterResult
//!                        └──────────── close (always) ───────────┘
//! ```
//!
//! - [`PageDriver`]: the narrow set of browser operations, implemented by
//!   [`ChromePage`] and by a scripted page in tests
//! - [`PageSession`]: navigation, CAPTCHA detection and the language toggle
//! - [`ChapterExtractor`]: reads both renderings and aligns them by position
//!
//! # Usage
//!
//! ```rust,ignore
//! use geez_corpus::scraper::{scrape_chapter, ChromePage, ScraperConfig, TracingSink};
//!
//! let config = ScraperConfig::default();
//! let page = ChromePage::launch(&config).await?;
//! let chapter = scrape_chapter(page, &config, Arc::new(TracingSink), url).await?;
//! ```

mod align;
mod chrome;
mod config;
mod driver;
mod events;
mod extractor;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use align::{align, normalize_whitespace, Alignment, RowDefect, SkippedRow};
pub use chrome::ChromePage;
pub use config::{RowSelectors, ScraperConfig};
pub use driver::{DriverError, DriverResult, PageDriver, RawRow, RawTitle};
pub use events::{EventLevel, EventSink, MemorySink, Phase, ScrapeEvent, TracingSink};
pub use extractor::{parse_title, ChapterExtractor};
pub use session::{PageSession, Rendering, SessionError, SessionState};

use std::sync::Arc;

use crate::domain::{ChapterResult, ExtractionFailure};

/// Fetch one chapter with a fresh session.
///
/// The driver is released before this returns, whatever the outcome. If the
/// returned future is dropped early the session's drop guard releases it
/// instead.
pub async fn scrape_chapter<D: PageDriver>(
    driver: D,
    config: &ScraperConfig,
    sink: Arc<dyn EventSink>,
    url: &str,
) -> Result<ChapterResult, ExtractionFailure> {
    let mut session = PageSession::new(driver, config.clone(), sink.clone());
    let outcome = open_and_extract(&mut session, sink, url).await;
    session.close().await;
    outcome
}

async fn open_and_extract<D: PageDriver>(
    session: &mut PageSession<D>,
    sink: Arc<dyn EventSink>,
    url: &str,
) -> Result<ChapterResult, ExtractionFailure> {
    session.open(url).await?;
    ChapterExtractor::new(sink).extract(session).await
}
