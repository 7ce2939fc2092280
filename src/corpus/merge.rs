use std::fs;
use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::corpus::{ENGLISH_COLUMN, GEEZ_COLUMN};
use crate::domain::ChapterResult;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub chapters: usize,
    pub verses: usize,
    pub skipped_files: Vec<PathBuf>,
}

/// Concatenate every chapter JSON in `dir` into one pair CSV, ordered by file
/// name and then verse. Files that do not parse as chapters are skipped.
pub fn merge_chapters(dir: &Path, output: &Path) -> Result<MergeReport> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([ENGLISH_COLUMN, GEEZ_COLUMN])?;

    let mut report = MergeReport::default();
    for path in files {
        let chapter = match read_chapter(&path) {
            Ok(chapter) => chapter,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                report.skipped_files.push(path);
                continue;
            }
        };

        for verse in chapter.verses() {
            writer.write_record([verse.english.as_str(), verse.geez.as_str()])?;
        }
        report.chapters += 1;
        report.verses += chapter.verses().len();
    }

    writer.flush()?;
    tracing::info!(
        chapters = report.chapters,
        verses = report.verses,
        "Merged chapters into {}",
        output.display()
    );
    Ok(report)
}

fn read_chapter(path: &Path) -> Result<ChapterResult> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
