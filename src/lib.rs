//! Utilities for genomic interval records and annotation database access.
//!
//! The core of the crate is a line-oriented reader/writer for BED-like
//! interval records ([`io`]) feeding an ordered [`IntervalCollection`] that
//! carries an optional reference-genome tag. Combining collections checks
//! the tags: differing tags fail, missing tags are flagged as unverified.
//!
//! External annotation databases (reference sequences, transcript models,
//! identifier mappings, ontology terms, pathways) are reached through the
//! narrow clients in [`services`]; their storage and query machinery stay
//! external.
//!
//! ```no_run
//! use annot_utils::{read_intervals, write_intervals, Format};
//!
//! # fn main() -> Result<(), annot_utils::Error> {
//! let mut peaks = read_intervals("peaks.bedgraph", Format::BedGraph)?;
//! peaks.set_genome("hg38");
//! write_intervals(&peaks, "peaks_out.bedgraph", Format::BedGraph)?;
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod error;
pub mod index;
pub mod interval;
pub mod io;
pub mod services;

pub use collection::{compatibility, Compatibility, IntervalCollection};
pub use error::{Error, ParseError, ValidationError};
pub use index::IntervalIndex;
pub use interval::{ExtraFields, GenomicFeature, GenomicInterval, Score, Strand};
pub use io::{
    read_intervals, read_intervals_lenient, write_intervals, write_intervals_with, Format,
    MissingFieldPolicy, Reader, Writer,
};
pub use services::ServiceError;
