//! Offline analysis of per-subject trial logs.

pub mod anonymize;
pub mod dataset;
pub mod summary;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use anonymize::anonymize;
pub use dataset::{Dataset, SubjectRow, load_dir, parse_log};
pub use summary::{AccuracyCurve, PhaseAccuracy, RtCell, moving_average};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{subject}: unexpected header {found:?}")]
    Header { subject: String, found: String },
    #[error("{subject} line {line}: {message}")]
    Parse {
        subject: String,
        line: usize,
        message: String,
    },
}
