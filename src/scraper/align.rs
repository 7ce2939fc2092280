use crate::domain::{ExtractionFailure, VerseRecord};
use crate::scraper::driver::RawRow;

/// Why a single row pair was left out of the chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDefect {
    MissingVerseNumber,
    MissingEnglish,
    MissingGeez,
}

impl RowDefect {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowDefect::MissingVerseNumber => "missing_verse_number",
            RowDefect::MissingEnglish => "missing_english_cell",
            RowDefect::MissingGeez => "missing_geez_cell",
        }
    }
}

/// A row pair dropped during alignment, by 0-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    pub index: usize,
    pub defect: RowDefect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub verses: Vec<VerseRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Pair English and Ge'ez rows by position.
///
/// Verse number cells are not compared: they differ between renderings
/// (Ethiopic numerals) and are not a reliable key. Unequal lengths fail the
/// whole chapter; a row missing a cell is skipped on its own.
pub fn align(english: &[RawRow], geez: &[RawRow]) -> Result<Alignment, ExtractionFailure> {
    if english.len() != geez.len() {
        return Err(ExtractionFailure::VerseCountMismatch {
            english: english.len(),
            geez: geez.len(),
        });
    }

    let mut alignment = Alignment::default();
    for (index, (en, gz)) in english.iter().zip(geez).enumerate() {
        match pair(en, gz) {
            Ok(record) => alignment.verses.push(record),
            Err(defect) => alignment.skipped.push(SkippedRow { index, defect }),
        }
    }

    Ok(alignment)
}

fn pair(english: &RawRow, geez: &RawRow) -> Result<VerseRecord, RowDefect> {
    let verse = english
        .number
        .as_deref()
        .ok_or(RowDefect::MissingVerseNumber)?;
    let english_text = english.content.as_deref().ok_or(RowDefect::MissingEnglish)?;
    let geez_text = geez.content.as_deref().ok_or(RowDefect::MissingGeez)?;

    Ok(VerseRecord {
        verse: verse.trim().to_string(),
        english: normalize_whitespace(english_text),
        geez: normalize_whitespace(geez_text),
    })
}

/// Collapse every whitespace run to one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
