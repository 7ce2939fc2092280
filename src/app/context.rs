use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::{ChapterRequest, ChapterResult, ExtractionFailure};
use crate::output::ChapterWriter;
use crate::scraper::{scrape_chapter, ChromePage, EventSink, Phase, ScrapeEvent, TracingSink};

pub struct AppContext {
    pub config: Config,
    pub sink: Arc<dyn EventSink>,
    pub writer: ChapterWriter,
}

impl AppContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(p) => Config::load_from(&p)?,
            None => Config::load()?,
        };
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
            writer: ChapterWriter::new(),
        }
    }

    /// Default file for a chapter: the last URL path segment under the
    /// configured output directory.
    pub fn default_destination(&self, url: &str) -> PathBuf {
        self.config
            .output
            .directory
            .join(format!("{}.json", chapter_file_stem(url)))
    }

    /// Scrape one chapter in its own browser and persist it.
    ///
    /// The outer error is for problems around the chapter (browser launch,
    /// disk); the inner one is the chapter's own extraction failure.
    pub async fn run_chapter(&self, request: &ChapterRequest) -> ChapterOutcome {
        let page = ChromePage::launch(&self.config.scraper).await?;
        let sink = self.sink.clone();
        tracing::info!("Navigating to {}", request.url());

        match scrape_chapter(page, &self.config.scraper, sink, request.url()).await {
            Ok(chapter) => Ok(Ok(self.persist(&chapter, request.destination())?)),
            Err(failure) => Ok(Err(failure)),
        }
    }

    fn persist(&self, chapter: &ChapterResult, target: &Path) -> Result<PathBuf> {
        match self.writer.write(chapter, target) {
            Ok(path) => Ok(path),
            Err(e) => {
                self.sink.record(&ScrapeEvent::error(
                    chapter.url(),
                    Phase::Persist,
                    "write_failed",
                    format!("Error saving chapter to JSON: {}", e),
                ));
                Err(e)
            }
        }
    }
}

/// Outcome of one chapter: the saved path or the chapter's own failure.
/// The outer error is for problems that end the whole run.
pub type ChapterOutcome = Result<std::result::Result<PathBuf, ExtractionFailure>>;

/// Something that can fetch and persist one chapter
#[async_trait]
pub trait ChapterRunner: Send + Sync {
    async fn run_chapter(&self, request: &ChapterRequest) -> ChapterOutcome;
}

#[async_trait]
impl ChapterRunner for AppContext {
    async fn run_chapter(&self, request: &ChapterRequest) -> ChapterOutcome {
        AppContext::run_chapter(self, request).await
    }
}

/// File-system friendly name from the URL's last path segment
pub fn chapter_file_stem(url: &str) -> String {
    let segment = url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.rfind(|seg| !seg.is_empty()).map(str::to_string))
        })
        .unwrap_or_default();

    let decoded = urlencoding::decode(&segment)
        .map(|d| d.into_owned())
        .unwrap_or(segment);
    let stem: String = decoded
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    if stem.is_empty() {
        "chapter".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_decodes_ethiopic_segment() {
        let url = "https://www.ethiopicbible.com/books/%E1%8A%A6%E1%88%AA%E1%89%B5-%E1%8B%98%E1%8B%B3%E1%8C%8D%E1%88%9D-10";
        assert_eq!(chapter_file_stem(url), "ኦሪት-ዘዳግም-10");
    }

    #[test]
    fn test_stem_ignores_trailing_slash_and_sanitizes() {
        assert_eq!(chapter_file_stem("https://example.com/books/gen 1/"), "gen_1");
        assert_eq!(chapter_file_stem("https://example.com/"), "chapter");
    }

    #[test]
    fn test_stem_keeps_malformed_escapes_literal() {
        assert_eq!(chapter_file_stem("https://example.com/a%+1b"), "a__1b");
        assert_eq!(chapter_file_stem("https://example.com/deut%2"), "deut_2");
    }

    #[test]
    fn test_stem_falls_back_when_escape_is_not_utf8() {
        assert_eq!(chapter_file_stem("https://example.com/gen%FF1"), "gen_FF1");
    }

    #[test]
    fn test_default_destination_uses_output_dir() {
        let ctx = AppContext::with_config(Config::default());
        assert_eq!(
            ctx.default_destination("https://example.com/books/deut-10"),
            PathBuf::from("output/deut-10.json")
        );
    }
}
