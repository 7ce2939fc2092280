pub mod chapter;
pub mod failure;

pub use chapter::{ChapterRequest, ChapterResult, VerseRecord, UNKNOWN};
pub use failure::ExtractionFailure;
