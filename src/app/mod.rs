pub mod context;
pub mod error;

pub use context::{AppContext, ChapterOutcome, ChapterRunner};
pub use error::{CorpusError, Result};
