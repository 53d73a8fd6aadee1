//! Error taxonomy for record I/O and annotation lookups.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use crate::services::ServiceError;

/// An error returned when a raw interval record fails to parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The reference sequence name is missing.
    #[error("missing reference sequence name")]
    MissingChrom,
    /// The start position is missing.
    #[error("missing start position")]
    MissingStart,
    /// The start position is not a valid integer.
    #[error("invalid start position")]
    InvalidStart(#[source] lexical::Error),
    /// The end position is missing.
    #[error("missing end position")]
    MissingEnd,
    /// The end position is not a valid integer.
    #[error("invalid end position")]
    InvalidEnd(#[source] lexical::Error),
    /// The score field is not numeric.
    #[error("invalid score")]
    InvalidScore(#[source] lexical::Error),
    /// The strand field is not one of `+`, `-`, `.`.
    #[error("invalid strand: {0}")]
    InvalidStrand(String),
}

/// A violation of the interval invariants.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// `start > end`.
    #[error("invalid interval {chrom}:{start}-{end}: start > end")]
    InvertedInterval {
        chrom: String,
        start: u64,
        end: u64,
    },
    /// The reference sequence name is empty.
    #[error("empty reference sequence name")]
    EmptyChrom,
    /// A field required by the output format is absent and the writer runs
    /// with [`MissingFieldPolicy::Strict`](crate::io::MissingFieldPolicy).
    #[error("record has no '{field}' field required by the output format")]
    MissingField { field: &'static str },
}

/// The crate-level error type. Every failure surfaces to the caller
/// immediately; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed record line. `line` is the 1-based physical line number.
    #[error("line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },
    /// An interval invariant violated while reading or writing records.
    /// `line` is the line number in the file being read or produced.
    #[error("line {line}: {source}")]
    Validation {
        line: u64,
        #[source]
        source: ValidationError,
    },
    /// The file could not be opened, read, or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Two collections carry different reference-genome tags.
    #[error("genome tag mismatch: '{left}' vs '{right}'")]
    TagMismatch { left: String, right: String },
    /// An external annotation service call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The offending line number, if this error came from record I/O.
    pub fn line(&self) -> Option<u64> {
        match self {
            Error::Parse { line, .. } | Error::Validation { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_numbers() {
        let parse = Error::Parse {
            line: 3,
            source: ParseError::MissingEnd,
        };
        assert_eq!(parse.line(), Some(3));

        let validation = Error::Validation {
            line: 7,
            source: ValidationError::EmptyChrom,
        };
        assert_eq!(validation.line(), Some(7));

        let mismatch = Error::TagMismatch {
            left: "hg38".to_string(),
            right: "mm10".to_string(),
        };
        assert_eq!(mismatch.line(), None);
    }
}
