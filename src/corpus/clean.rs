use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app::{CorpusError, Result};
use crate::corpus::{ENGLISH_COLUMN, GEEZ_COLUMN};
use crate::scraper::normalize_whitespace;

/// Decimal digits of any script plus Ethiopic numerals (፩..፼), which are not `Nd`
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Nd}\x{1369}-\x{137C}]+").expect("valid digit pattern"));

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“”]"#).expect("valid quote pattern"));

/// Ethiopic wordspace, full stop, comma, semicolon, colons and paragraph marks
static ETHIOPIC_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{1360}-\x{1368}]").expect("valid Ethiopic punctuation pattern")
});

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Remove digits and Ethiopic numerals (default: true)
    pub strip_digits: bool,

    /// Remove punctuation and quotes (default: true)
    pub strip_punctuation: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            strip_digits: true,
            strip_punctuation: true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub read: usize,
    pub dropped_empty: usize,
    pub dropped_duplicate: usize,
    pub written: usize,
}

/// Script-aware cleanup of English/Ge'ez pairs
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn clean_english(&self, text: &str) -> String {
        let mut text = text.to_string();
        if self.config.strip_punctuation {
            text = QUOTES.replace_all(&text, "").into_owned();
        }
        if self.config.strip_digits {
            text = DIGITS.replace_all(&text, "").into_owned();
        }
        if self.config.strip_punctuation {
            text = NON_WORD.replace_all(&text, "").into_owned();
        }
        normalize_whitespace(&text)
    }

    /// Ethiopic separators split words, so they become spaces rather than
    /// vanishing and fusing neighbours together.
    pub fn clean_geez(&self, text: &str) -> String {
        let mut text = text.to_string();
        if self.config.strip_punctuation {
            text = QUOTES.replace_all(&text, "").into_owned();
        }
        if self.config.strip_digits {
            text = DIGITS.replace_all(&text, "").into_owned();
        }
        if self.config.strip_punctuation {
            text = ETHIOPIC_PUNCTUATION.replace_all(&text, " ").into_owned();
            text = NON_WORD.replace_all(&text, "").into_owned();
        }
        normalize_whitespace(&text)
    }

    /// Clean every pair, dropping empties and repeats. Order of first
    /// occurrence is kept.
    pub fn clean_pairs<I>(&self, pairs: I) -> (Vec<(String, String)>, CleanReport)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut report = CleanReport::default();
        let mut seen = HashSet::new();
        let mut cleaned = Vec::new();

        for (english, geez) in pairs {
            report.read += 1;
            let pair = (self.clean_english(&english), self.clean_geez(&geez));

            if pair.0.is_empty() || pair.1.is_empty() {
                report.dropped_empty += 1;
                continue;
            }
            if !seen.insert(pair.clone()) {
                report.dropped_duplicate += 1;
                continue;
            }
            cleaned.push(pair);
        }

        report.written = cleaned.len();
        (cleaned, report)
    }
}

/// Clean an `English,Geez` CSV into `output`
pub fn clean_file(input: &Path, output: &Path, config: CleaningConfig) -> Result<CleanReport> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| CorpusError::MissingColumn {
                column: name,
                path: input.to_path_buf(),
            })
    };
    let english_idx = column(ENGLISH_COLUMN)?;
    let geez_idx = column(GEEZ_COLUMN)?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let english = record.get(english_idx).unwrap_or_default().to_string();
        let geez = record.get(geez_idx).unwrap_or_default().to_string();
        pairs.push((english, geez));
    }

    let (cleaned, report) = Cleaner::new(config).clean_pairs(pairs);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([ENGLISH_COLUMN, GEEZ_COLUMN])?;
    for (english, geez) in &cleaned {
        writer.write_record([english, geez])?;
    }
    writer.flush()?;

    tracing::info!(
        read = report.read,
        dropped_empty = report.dropped_empty,
        dropped_duplicate = report.dropped_duplicate,
        "Cleaned file saved with {} rows",
        report.written
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(en: &str, gz: &str) -> (String, String) {
        (en.to_string(), gz.to_string())
    }

    #[test]
    fn test_clean_example_pair() {
        let cleaner = Cleaner::default();
        assert_eq!(cleaner.clean_english("Hello, World! 123"), "Hello World");
        assert_eq!(cleaner.clean_geez("ሰላም፤ ዓለም።"), "ሰላም ዓለም");
    }

    #[test]
    fn test_geez_wordspace_splits_words() {
        let cleaner = Cleaner::default();
        assert_eq!(cleaner.clean_geez("ወይቤሎ፡እግዚአብሔር፡ለሙሴ።"), "ወይቤሎ እግዚአብሔር ለሙሴ");
    }

    #[test]
    fn test_strips_ethiopic_numerals_and_quotes() {
        let cleaner = Cleaner::default();
        assert_eq!(cleaner.clean_geez("፲ ወይቤ “ንዑ”"), "ወይቤ ንዑ");
        assert_eq!(cleaner.clean_english("\"Come,\" he said 10"), "Come he said");
    }

    #[test]
    fn test_english_contractions_stay_joined() {
        let cleaner = Cleaner::default();
        assert_eq!(cleaner.clean_english("don't  fear;"), "dont fear");
    }

    #[test]
    fn test_flags_can_keep_digits() {
        let cleaner = Cleaner::new(CleaningConfig {
            strip_digits: false,
            strip_punctuation: true,
        });
        assert_eq!(cleaner.clean_english("Psalm 23!"), "Psalm 23");
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let cleaner = Cleaner::default();
        let (cleaned, report) = cleaner.clean_pairs(vec![
            pair("a", "ሀ"),
            pair("b", "ለ"),
            pair("a!", "ሀ።"),
            pair("c", "ሐ"),
            pair("b", "ለ"),
        ]);

        assert_eq!(cleaned, vec![pair("a", "ሀ"), pair("b", "ለ"), pair("c", "ሐ")]);
        assert_eq!(report.read, 5);
        assert_eq!(report.dropped_duplicate, 2);
        assert_eq!(report.written, 3);
    }

    #[test]
    fn test_empty_after_cleaning_is_dropped() {
        let cleaner = Cleaner::default();
        let (cleaned, report) =
            cleaner.clean_pairs(vec![pair("123", "ሰላም"), pair("Peace", "።"), pair("Peace", "ሰላም")]);

        assert_eq!(cleaned, vec![pair("Peace", "ሰላም")]);
        assert_eq!(report.dropped_empty, 2);
    }

    #[test]
    fn test_clean_is_stable() {
        let cleaner = Cleaner::default();
        let once = cleaner.clean_geez("ወይቤሎ፡ እግዚአብሔር፤ ፲፪");
        assert_eq!(cleaner.clean_geez(&once), once);
    }

    #[test]
    fn test_clean_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("merged.csv");
        fs::write(
            &input,
            "English,Geez\n\"Hello, World! 123\",ሰላም፤ ዓለም።\nHello World,ሰላም ዓለም\n42,፵፪\n",
        )
        .unwrap();
        let output = dir.path().join("clean/final.csv");

        let report = clean_file(&input, &output, CleaningConfig::default()).unwrap();

        assert_eq!(report.read, 3);
        assert_eq!(report.dropped_duplicate, 1);
        assert_eq!(report.dropped_empty, 1);
        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content, "English,Geez\nHello World,ሰላም ዓለም\n");
    }

    #[test]
    fn test_clean_file_needs_columns() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.csv");
        fs::write(&input, "en,gz\na,b\n").unwrap();

        let err = clean_file(&input, &dir.path().join("out.csv"), CleaningConfig::default())
            .unwrap_err();
        assert!(matches!(err, CorpusError::MissingColumn { column: "English", .. }));
    }
}
