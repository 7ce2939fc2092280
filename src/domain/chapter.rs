use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::app::{CorpusError, Result};

/// Placeholder used when the chapter title could not be read from the page.
pub const UNKNOWN: &str = "Unknown";

/// One chapter to fetch: where it lives and where its JSON should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRequest {
    url: String,
    destination: PathBuf,
}

impl ChapterRequest {
    /// Build a request, rejecting anything that is not an http(s) URL.
    pub fn new(url: &str, destination: impl Into<PathBuf>) -> Result<Self> {
        let parsed = url::Url::parse(url)?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(CorpusError::UnsupportedScheme(other.to_string())),
        }

        Ok(Self {
            url: url.to_string(),
            destination: destination.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// An aligned English/Ge'ez verse pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub verse: String,
    pub english: String,
    pub geez: String,
}

/// A fully extracted chapter. Built once by the extractor, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterResult {
    url: String,
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    book: String,
    chapter: String,
    verses: Vec<VerseRecord>,
}

impl ChapterResult {
    pub(crate) fn new(
        url: String,
        book: String,
        chapter: String,
        verses: Vec<VerseRecord>,
    ) -> Self {
        Self {
            url,
            timestamp: Local::now().naive_local(),
            book,
            chapter,
            verses,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    pub fn verses(&self) -> &[VerseRecord] {
        &self.verses
    }
}

/// `YYYY-MM-DD HH:MM:SS`, the layout written into every chapter file.
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
