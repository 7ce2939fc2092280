//! Persisting chapters as JSON without ever replacing an existing file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::Result;
use crate::domain::ChapterResult;

/// Give up after this many collisions on the same timestamped name
const MAX_ATTEMPTS: usize = 1000;

#[derive(Debug, Default, Clone, Copy)]
pub struct ChapterWriter;

impl ChapterWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `chapter` to `target`, or next to it under a timestamped name if
    /// `target` already exists. Returns the path actually written.
    pub fn write(&self, chapter: &ChapterResult, target: &Path) -> Result<PathBuf> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(chapter)?;
        let (path, file) = create_unique(target)?;
        fill_or_remove(&path, file, json.as_bytes())?;

        tracing::info!(
            chapter = %chapter.chapter(),
            verses = chapter.verses().len(),
            "Saved chapter to {}",
            path.display()
        );
        Ok(path)
    }
}

/// Create a new file at `target` or the first free disambiguated name.
/// `create_new` makes the existence check and creation one step.
fn create_unique(target: &Path) -> Result<(PathBuf, File)> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut candidates = std::iter::once(target.to_path_buf())
        .chain(std::iter::once(with_suffix(target, &stamp)))
        .chain((2..).map(|n| with_suffix(target, &format!("{}_{}", stamp, n))));

    for _ in 0..MAX_ATTEMPTS {
        let Some(path) = candidates.next() else {
            break;
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("No free file name next to {}", target.display()),
    )
    .into())
}

/// Write `bytes` and a trailing newline; a partial file is removed on failure
fn fill_or_remove<W: Write>(path: &Path, mut out: W, bytes: &[u8]) -> Result<()> {
    let written = out
        .write_all(bytes)
        .and_then(|_| out.write_all(b"\n"))
        .and_then(|_| out.flush());
    drop(out);

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!("Could not remove partial file {}: {}", path.display(), cleanup);
        }
        return Err(e.into());
    }
    Ok(())
}

/// `out/deut_10.json` + `20240101_120000` → `out/deut_10_20240101_120000.json`
fn with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerseRecord;

    fn chapter() -> ChapterResult {
        ChapterResult::new(
            "https://example.com/books/deut-10".into(),
            "Deuteronomy".into(),
            "10".into(),
            vec![VerseRecord {
                verse: "10:1".into(),
                english: "At that time the LORD said unto me".into(),
                geez: "ወበውእቱ መዋዕል ይቤለኒ እግዚአብሔር".into(),
            }],
        )
    }

    /// Accepts a few bytes, then fails like a full disk
    struct FullDisk(usize);

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.0 == 0 {
                return Err(std::io::Error::new(ErrorKind::Other, "no space left"));
            }
            let n = buf.len().min(self.0);
            self.0 -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deut_10.json");
        fs::write(&path, "{\"url\":").unwrap();

        let result = fill_or_remove(&path, FullDisk(8), b"{\"url\": \"https://example.com\"}");

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_writes_utf8_json() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deut_10.json");

        let written = ChapterWriter::new().write(&chapter(), &target).unwrap();

        assert_eq!(written, target);
        let content = fs::read_to_string(&written).unwrap();
        assert!(content.contains("ወበውእቱ መዋዕል"));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["verses"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_existing_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("deut_10.json");
        fs::write(&target, "previous run").unwrap();

        let first = ChapterWriter::new().write(&chapter(), &target).unwrap();
        let second = ChapterWriter::new().write(&chapter(), &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "previous run");
        assert_ne!(first, target);
        assert_ne!(second, target);
        assert_ne!(first, second);
        assert_eq!(first.extension().unwrap(), "json");
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("deut_10_"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("out/a.json"), "20240101_000000"),
            PathBuf::from("out/a_20240101_000000.json")
        );
        assert_eq!(
            with_suffix(Path::new("plain"), "x"),
            PathBuf::from("plain_x")
        );
    }
}
