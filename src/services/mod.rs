//! Narrow client interfaces to external annotation databases.
//!
//! Each collaborator (reference sequence store, transcript database,
//! identifier mapping, ontology graph, pathway database) is an opaque
//! request/response service: a trait exposes only the operations the rest of
//! the crate needs, and one concrete implementation backs it with a local
//! file or an in-memory table. Transport details never leak past these
//! modules. Calls block, fail outright, and are never retried.

pub mod mapping;
pub mod ontology;
pub mod pathway;
pub mod sequence;
pub mod transcript;

use thiserror::Error;

/// An error returned by an annotation service call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service has no record for the identifier.
    #[error("unknown {kind} identifier: {id}")]
    UnknownId { kind: String, id: String },
    /// The reference sequence name is not part of the assembly.
    #[error("unknown reference sequence: {0}")]
    UnknownChrom(String),
    /// The requested region falls outside the reference sequence.
    #[error("region {chrom}:{start}-{end} is out of bounds")]
    OutOfBounds {
        chrom: String,
        start: u64,
        end: u64,
    },
    /// The service could not be reached or read.
    #[error("service I/O failure")]
    Transport(#[from] std::io::Error),
    /// The service answered with something unintelligible.
    #[error("malformed service response: {0}")]
    Malformed(String),
}

impl ServiceError {
    pub(crate) fn unknown_id(kind: &str, id: &str) -> Self {
        ServiceError::UnknownId {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}
