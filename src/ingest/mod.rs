//! Session log ingest
//!
//! CSV → [`RawFrame`] → [`preprocess`] → [`CanonicalFrame`].

mod frame;
mod preprocess;
pub mod timestamp;

pub use frame::{normalize_column_name, RawFrame};
pub use preprocess::{
    preprocess, CanonicalFrame, CellFallbacks, DefaultedColumns, PreprocessReport, Preprocessed,
};

use std::path::Path;

use crate::error::PipelineResult;

/// Read a session log from disk and preprocess it.
pub fn load_session_log(path: &Path) -> PipelineResult<Preprocessed> {
    let raw = RawFrame::from_path(path)?;
    preprocess(&raw)
}
