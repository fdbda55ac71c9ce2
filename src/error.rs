use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of an evaluation run.
///
/// Unreadable images are not listed here: they are scored as zero overlap and
/// the batch carries on.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ground truth line {line}: expected 4 comma-separated integers, found {fields} field(s) in {content:?}")]
    MalformedRecord {
        line: usize,
        content: String,
        fields: usize,
    },

    #[error("ground truth line {line}: field {field:?} is not an integer")]
    InvalidNumber { line: usize, field: String },

    #[error("ground truth line {line}: width and height must not be negative")]
    NegativeSize { line: usize },

    #[error("ground truth has {records} record(s) but {images} image(s) were requested")]
    GroundTruthMismatch { images: usize, records: usize },
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
