//! An ordered collection of interval records with a reference-genome tag.

use std::slice;

use log::warn;

use crate::error::Error;
use crate::interval::GenomicInterval;

/// The outcome of a genome-tag compatibility check between two collections.
///
/// `Unverified` means at least one side carried no tag, so compatibility
/// could not be checked; the combination is permitted but flagged.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Compatibility {
    Verified,
    Unverified,
}

/// Checks two optional genome tags. Both set and different is an error;
/// both set and equal verifies the combination; anything else leaves it
/// unverified.
pub fn compatibility(left: Option<&str>, right: Option<&str>) -> Result<Compatibility, Error> {
    match (left, right) {
        (Some(l), Some(r)) if l == r => Ok(Compatibility::Verified),
        (Some(l), Some(r)) => Err(Error::TagMismatch {
            left: l.to_string(),
            right: r.to_string(),
        }),
        _ => Ok(Compatibility::Unverified),
    }
}

/// An ordered sequence of interval records. Insertion order is preserved and
/// reflects file order when built by the parser. The record sequence is
/// immutable once built; only the genome tag may be set afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntervalCollection {
    genome: Option<String>,
    intervals: Vec<GenomicInterval>,
}

impl IntervalCollection {
    /// The reference assembly the coordinates were measured against, e.g.
    /// `hg38`. Unset unless the caller tagged the collection explicitly.
    pub fn genome(&self) -> Option<&str> {
        self.genome.as_deref()
    }

    /// Tags the collection with a reference assembly identifier.
    pub fn set_genome<S: Into<String>>(&mut self, genome: S) -> &mut Self {
        self.genome = Some(genome.into());
        self
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GenomicInterval> {
        self.intervals.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, GenomicInterval> {
        self.intervals.iter()
    }

    /// Appends `other` to `self`, preserving record order. Fails with
    /// [`Error::TagMismatch`] if both collections are tagged with different
    /// genomes; combining with an untagged collection succeeds but is
    /// reported (and logged) as [`Compatibility::Unverified`]. The result
    /// keeps whichever tag was set.
    pub fn concat(&self, other: &Self) -> Result<(Self, Compatibility), Error> {
        let compat = compatibility(self.genome(), other.genome())?;
        if compat == Compatibility::Unverified {
            warn!(
                "combining collections with unverified genome compatibility ({:?} vs {:?})",
                self.genome(),
                other.genome()
            );
        }
        let combined = Self {
            genome: self.genome.clone().or_else(|| other.genome.clone()),
            intervals: self
                .intervals
                .iter()
                .chain(other.intervals.iter())
                .cloned()
                .collect(),
        };
        Ok((combined, compat))
    }
}

impl FromIterator<GenomicInterval> for IntervalCollection {
    fn from_iter<I: IntoIterator<Item = GenomicInterval>>(iter: I) -> Self {
        Self {
            genome: None,
            intervals: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for IntervalCollection {
    type Item = GenomicInterval;
    type IntoIter = std::vec::IntoIter<GenomicInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntervalCollection {
    type Item = &'a GenomicInterval;
    type IntoIter = slice::Iter<'a, GenomicInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
