//! Turning scraped chapters into training pairs.
//!
//! ```text
//! chapter JSON files → merge → English,Geez CSV → clean → training CSV
//! ```

mod clean;
mod merge;

pub use clean::{clean_file, CleanReport, Cleaner, CleaningConfig};
pub use merge::{merge_chapters, MergeReport};

/// Header of every pair file this crate reads or writes
pub const ENGLISH_COLUMN: &str = "English";
pub const GEEZ_COLUMN: &str = "Geez";
