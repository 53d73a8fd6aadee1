//! The in-memory representation of a genomic interval record.
//!
//! Coordinates are 0-based, half-open, measured against whatever reference
//! assembly the surrounding [`IntervalCollection`](crate::IntervalCollection)
//! is tagged with. `start <= end` and a non-empty chromosome name are
//! enforced at construction.

pub use self::{score::Score, strand::Strand};
mod score;
mod strand;

use std::fmt::{self, Write};
use std::ops::Deref;

use crate::error::ValidationError;

pub(crate) const DELIMITER: char = '\t';
pub(crate) const MISSING_FIELD: &str = ".";

/// Common accessors for anything that occupies a genomic region.
pub trait GenomicFeature {
    /// The chromosome (reference sequence) name.
    fn chrom(&self) -> &str;

    /// The 0-based start position.
    fn start(&self) -> u64;

    /// The end position (non-inclusive).
    fn end(&self) -> u64;

    /// The strand, if known.
    fn strand(&self) -> Option<Strand> {
        None
    }

    /// The length of the region.
    fn len(&self) -> u64 {
        self.end() - self.start()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A `chrom:start-end` rendering of the region.
    fn locus(&self) -> String {
        format!("{}:{}-{}", self.chrom(), self.start(), self.end())
    }
}

impl<T: GenomicFeature + ?Sized> GenomicFeature for &T {
    fn chrom(&self) -> &str {
        (**self).chrom()
    }

    fn start(&self) -> u64 {
        (**self).start()
    }

    fn end(&self) -> u64 {
        (**self).end()
    }

    fn strand(&self) -> Option<Strand> {
        (**self).strand()
    }
}

/// A single genomic interval record.
#[derive(Clone, Debug, PartialEq)]
pub struct GenomicInterval {
    chrom: String,
    start: u64,
    end: u64,
    name: Option<String>,
    score: Option<Score>,
    strand: Option<Strand>,
    extra: ExtraFields,
}

impl GenomicInterval {
    /// Creates an interval, checking the invariants: non-empty chromosome
    /// name and `start <= end`.
    pub fn new<C>(chrom: C, start: u64, end: u64) -> Result<Self, ValidationError>
    where
        C: Into<String>,
    {
        let chrom = chrom.into();
        if chrom.is_empty() {
            return Err(ValidationError::EmptyChrom);
        }
        if start > end {
            return Err(ValidationError::InvertedInterval { chrom, start, end });
        }
        Ok(Self {
            chrom,
            start,
            end,
            name: None,
            score: None,
            strand: None,
            extra: ExtraFields::default(),
        })
    }

    pub fn with_name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_score<S: Into<Score>>(mut self, score: S) -> Self {
        self.score = Some(score.into());
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = Some(strand);
        self
    }

    pub fn with_extra<E: Into<ExtraFields>>(mut self, extra: E) -> Self {
        self.extra = extra.into();
        self
    }

    pub(crate) fn set_optional(
        &mut self,
        name: Option<String>,
        score: Option<Score>,
        strand: Option<Strand>,
        extra: ExtraFields,
    ) {
        self.name = name;
        self.score = score;
        self.strand = strand;
        self.extra = extra;
    }

    /// The record name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The record score, if any.
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// Extra columns beyond the named fields, in file order.
    pub fn extra(&self) -> &ExtraFields {
        &self.extra
    }
}

impl GenomicFeature for GenomicInterval {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn strand(&self) -> Option<Strand> {
        self.strand
    }
}

/// Extra record columns, positionally appended after the format's named
/// fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtraFields(Vec<String>);

impl Deref for ExtraFields {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ExtraFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(DELIMITER)?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for ExtraFields {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl FromIterator<String> for ExtraFields {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
