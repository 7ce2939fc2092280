use std::fs;
use std::path::{Path, PathBuf};

use crate::app::{AppContext, ChapterRunner, CorpusError, Result};
use crate::corpus;
use crate::domain::ChapterRequest;

pub async fn scrape(ctx: &AppContext, url: &str, output: Option<PathBuf>) -> Result<()> {
    let destination = output.unwrap_or_else(|| ctx.default_destination(url));
    let request = ChapterRequest::new(url, destination)?;

    match ctx.run_chapter(&request).await? {
        Ok(path) => {
            println!("Saved chapter to {}", path.display());
            Ok(())
        }
        Err(failure) => Err(CorpusError::Other(format!(
            "Failed to scrape {}: {}",
            request.url(),
            failure
        ))),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub failed: usize,
    pub not_attempted: usize,
}

pub async fn batch(ctx: &AppContext, manifest: &Path) -> Result<BatchSummary> {
    let content = fs::read_to_string(manifest)?;
    let requests = parse_manifest(ctx, &content)?;

    if requests.is_empty() {
        println!("No chapters in {}", manifest.display());
        return Ok(BatchSummary::default());
    }

    println!("Scraping {} chapters...", requests.len());
    let summary = run_batch(ctx, &requests).await?;

    println!(
        "\nBatch complete: {} saved, {} failed, {} not attempted",
        summary.saved, summary.failed, summary.not_attempted
    );
    Ok(summary)
}

/// Chapters run strictly one after another. A CAPTCHA stops the whole run;
/// other failures only skip their chapter.
pub async fn run_batch<R: ChapterRunner>(
    runner: &R,
    requests: &[ChapterRequest],
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (i, request) in requests.iter().enumerate() {
        match runner.run_chapter(request).await? {
            Ok(path) => {
                summary.saved += 1;
                println!("  + {} -> {}", request.url(), path.display());
            }
            Err(failure) => {
                summary.failed += 1;
                eprintln!("  ! {} - {}", request.url(), failure);
                if failure.halts_run() {
                    summary.not_attempted = requests.len() - i - 1;
                    tracing::error!(
                        reason = failure.reason(),
                        remaining = summary.not_attempted,
                        "Stopping run: site is challenging automated access"
                    );
                    break;
                }
            }
        }
    }

    Ok(summary)
}

/// Parse `URL [OUTPUT]` lines, defaulting OUTPUT from the URL
pub fn parse_manifest(ctx: &AppContext, content: &str) -> Result<Vec<ChapterRequest>> {
    let mut requests = Vec::new();

    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(url), output, None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CorpusError::Manifest {
                line: n + 1,
                content: line.to_string(),
            });
        };

        let destination = output
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.default_destination(url));
        requests.push(ChapterRequest::new(url, destination)?);
    }

    Ok(requests)
}

pub fn merge(dir: &Path, output: &Path) -> Result<()> {
    let report = corpus::merge_chapters(dir, output)?;
    for path in &report.skipped_files {
        eprintln!("  ! skipped {}", path.display());
    }
    println!(
        "Merged {} chapters ({} verses) into {}",
        report.chapters,
        report.verses,
        output.display()
    );
    Ok(())
}

pub fn clean(ctx: &AppContext, input: &Path, output: &Path) -> Result<()> {
    let report = corpus::clean_file(input, output, ctx.config.cleaning.clone())?;
    println!(
        "Cleaned file saved with {} rows ({} read, {} empty, {} duplicates)",
        report.written, report.read, report.dropped_empty, report.dropped_duplicate
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::app::ChapterOutcome;
    use crate::config::Config;
    use crate::domain::ExtractionFailure;

    /// Runner replaying canned outcomes and recording which URLs it saw
    struct ScriptedRunner {
        outcomes: Mutex<VecDeque<ChapterOutcome>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(outcomes: Vec<ChapterOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChapterRunner for ScriptedRunner {
        async fn run_chapter(&self, request: &ChapterRequest) -> ChapterOutcome {
            self.seen.lock().unwrap().push(request.url().to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Ok(request.destination().to_path_buf())))
        }
    }

    fn requests(n: usize) -> Vec<ChapterRequest> {
        (1..=n)
            .map(|i| {
                let url = format!("https://example.com/books/deut-{}", i);
                ChapterRequest::new(&url, PathBuf::from(format!("out/deut-{}.json", i))).unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_captcha_stops_the_run() {
        let runner = ScriptedRunner::new(vec![
            Ok(Ok(PathBuf::from("out/deut-1.json"))),
            Ok(Err(ExtractionFailure::BlockedContent {
                url: "https://example.com/books/deut-2".into(),
            })),
        ]);

        let summary = run_batch(&runner, &requests(4)).await.unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                saved: 1,
                failed: 1,
                not_attempted: 2
            }
        );
        assert_eq!(runner.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mismatch_skips_only_its_chapter() {
        let runner = ScriptedRunner::new(vec![
            Ok(Ok(PathBuf::from("out/deut-1.json"))),
            Ok(Err(ExtractionFailure::VerseCountMismatch { english: 5, geez: 4 })),
        ]);

        let summary = run_batch(&runner, &requests(4)).await.unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                saved: 3,
                failed: 1,
                not_attempted: 0
            }
        );
        assert_eq!(
            runner.seen.lock().unwrap().last().map(String::as_str),
            Some("https://example.com/books/deut-4")
        );
    }

    #[tokio::test]
    async fn test_disk_error_aborts_the_run() {
        let runner = ScriptedRunner::new(vec![Err(CorpusError::Other("disk full".into()))]);

        let err = run_batch(&runner, &requests(3)).await.unwrap_err();

        assert!(matches!(err, CorpusError::Other(_)));
        assert_eq!(runner.seen.lock().unwrap().len(), 1);
    }

    fn ctx() -> AppContext {
        AppContext::with_config(Config::default())
    }

    #[test]
    fn test_parse_manifest() {
        let content = "\
# Deuteronomy
https://example.com/books/deut-10 out/deut_10.json

https://example.com/books/deut-11
";
        let requests = parse_manifest(&ctx(), content).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].destination(), Path::new("out/deut_10.json"));
        assert_eq!(requests[1].url(), "https://example.com/books/deut-11");
        assert_eq!(requests[1].destination(), Path::new("output/deut-11.json"));
    }

    #[test]
    fn test_parse_manifest_rejects_extra_fields() {
        let err = parse_manifest(&ctx(), "https://example.com/a a.json extra\n").unwrap_err();
        assert!(matches!(err, CorpusError::Manifest { line: 1, .. }));
    }

    #[test]
    fn test_parse_manifest_rejects_bad_urls() {
        let err = parse_manifest(&ctx(), "# header\nfile:///etc/passwd\n").unwrap_err();
        assert!(matches!(err, CorpusError::UnsupportedScheme(_)));
    }
}
