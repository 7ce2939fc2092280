//! # geez-corpus
//!
//! Builds a parallel English–Ge'ez biblical corpus for machine translation by
//! driving a browser over a bilingual site, then cleans the pairs.
//!
//! ## Architecture
//!
//! ```text
//! Chapter URL → PageSession → ChapterExtractor → JSON → merge → clean → CSV
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # One chapter
//! geez-corpus scrape https://www.ethiopicbible.com/books/... -o output/deut_10.json
//!
//! # Many chapters, strictly one at a time
//! geez-corpus batch chapters.txt
//!
//! # Training data
//! geez-corpus merge output -o merged.csv
//! geez-corpus clean merged.csv -o final.csv
//! ```

/// Application context and error handling.
pub mod app;

/// Command-line interface using clap.
///
/// - `scrape <url>` - Fetch one chapter
/// - `batch <manifest>` - Fetch chapters listed in a file
/// - `merge <dir>` - Chapter JSON files to a pair CSV
/// - `clean <csv>` - Clean a pair CSV for training
pub mod cli;

/// Configuration loaded from `~/.config/geez-corpus/config.toml`.
pub mod config;

/// Merging and cleaning of English/Ge'ez pairs.
pub mod corpus;

/// Core domain models.
///
/// - [`ChapterRequest`](domain::ChapterRequest): what to fetch and where to save it
/// - [`ChapterResult`](domain::ChapterResult): an aligned chapter
/// - [`ExtractionFailure`](domain::ExtractionFailure): why a chapter produced nothing
pub mod domain;

/// Writing chapters to disk without replacing earlier runs.
pub mod output;

/// Browser session and chapter extraction.
///
/// - [`PageSession`](scraper::PageSession): navigation and the language toggle
/// - [`ChapterExtractor`](scraper::ChapterExtractor): dual-rendering extraction and alignment
/// - [`ChromePage`](scraper::ChromePage): chromiumoxide backend
pub mod scraper;
