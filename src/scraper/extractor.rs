use std::sync::Arc;

use crate::domain::{ChapterResult, ExtractionFailure, UNKNOWN};
use crate::scraper::align::align;
use crate::scraper::driver::{PageDriver, RawTitle};
use crate::scraper::events::{EventSink, Phase, ScrapeEvent};
use crate::scraper::session::{PageSession, Rendering, SessionState};

/// Turns an opened page into an aligned English/Ge'ez chapter
pub struct ChapterExtractor {
    sink: Arc<dyn EventSink>,
}

impl ChapterExtractor {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Extract both renderings of the chapter the session is showing.
    ///
    /// Whatever happens after the language toggle is attempted, the session
    /// is asked to go back to English before this returns.
    pub async fn extract<D: PageDriver>(
        &self,
        session: &mut PageSession<D>,
    ) -> Result<ChapterResult, ExtractionFailure> {
        if session.state() != SessionState::Loaded(Rendering::Default) {
            return Err(ExtractionFailure::InvalidState(format!(
                "extraction needs a page showing English, session is {}",
                session.state()
            )));
        }
        let url = session.url().to_string();

        let (book, chapter) = self.read_metadata(session, &url).await;
        let outcome = self.extract_verses(session, &url, book, chapter).await;

        // restore_default reports its own failure; it never decides the outcome
        let _ = session.restore_default().await;

        match &outcome {
            Ok(result) => self.sink.record(&ScrapeEvent::info(
                &url,
                Phase::Align,
                format!("Successfully scraped {} verses", result.verses().len()),
            )),
            Err(failure) => self.sink.record(&ScrapeEvent::error(
                &url,
                phase_of(failure),
                failure.reason(),
                failure.to_string(),
            )),
        }
        outcome
    }

    async fn read_metadata<D: PageDriver>(
        &self,
        session: &mut PageSession<D>,
        url: &str,
    ) -> (String, String) {
        match session.read_title().await {
            Ok(Some(raw)) => parse_title(&raw),
            Ok(None) => {
                self.sink.record(&ScrapeEvent::warn(
                    url,
                    Phase::Metadata,
                    "title_missing",
                    "Could not extract chapter title",
                ));
                (UNKNOWN.to_string(), UNKNOWN.to_string())
            }
            Err(e) => {
                self.sink.record(&ScrapeEvent::warn(
                    url,
                    Phase::Metadata,
                    e.reason(),
                    format!("Could not extract chapter title: {}", e),
                ));
                (UNKNOWN.to_string(), UNKNOWN.to_string())
            }
        }
    }

    async fn extract_verses<D: PageDriver>(
        &self,
        session: &mut PageSession<D>,
        url: &str,
        book: String,
        chapter: String,
    ) -> Result<ChapterResult, ExtractionFailure> {
        session
            .switch_language(Rendering::Alternate)
            .await
            .map_err(ExtractionFailure::from)?;
        self.sink
            .record(&ScrapeEvent::info(url, Phase::Switch, "Switched to Ge'ez version"));

        let english = session.read_rows(Rendering::Default).await?;
        let geez = session.read_rows(Rendering::Alternate).await?;

        let alignment = align(&english, &geez)?;
        for skipped in &alignment.skipped {
            self.sink.record(&ScrapeEvent::warn(
                url,
                Phase::Align,
                skipped.defect.as_str(),
                format!("Error processing verse at row {}", skipped.index + 1),
            ));
        }

        Ok(ChapterResult::new(
            url.to_string(),
            book,
            chapter,
            alignment.verses,
        ))
    }
}

/// Split `"Deuteronomy Chapter 10"` / `"Chapter 10"` into book and chapter label
pub fn parse_title(raw: &RawTitle) -> (String, String) {
    let book = match raw.book.split_once("Chapter") {
        Some((before, _)) => before.trim(),
        None => raw.book.trim(),
    };
    let chapter = raw.chapter.replace("Chapter", "");
    let chapter = chapter.trim();

    let or_unknown = |s: &str| {
        if s.is_empty() {
            UNKNOWN.to_string()
        } else {
            s.to_string()
        }
    };
    (or_unknown(book), or_unknown(chapter))
}

fn phase_of(failure: &ExtractionFailure) -> Phase {
    match failure {
        ExtractionFailure::LanguageSwitchFailed(_) => Phase::Switch,
        ExtractionFailure::VerseCountMismatch { .. } => Phase::Align,
        ExtractionFailure::NavigationTimeout { .. } | ExtractionFailure::BlockedContent { .. } => {
            Phase::Open
        }
        ExtractionFailure::InvalidState(_) | ExtractionFailure::Page(_) => Phase::Rows,
    }
}
