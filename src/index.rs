//! A per-chromosome interval tree used for region queries.

use std::collections::HashMap;
use std::ops::Range;

use bio::data_structures::interval_tree::{IntervalTree, IntervalTreeIterator};

use crate::interval::GenomicFeature;

/// Maps genomic regions to associated data, one interval tree per
/// chromosome. Built once from an iterator; queried with any
/// [`GenomicFeature`].
pub struct IntervalIndex<D>(HashMap<String, IntervalTree<u64, D>>);

impl<D> Default for IntervalIndex<D> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<D, F: GenomicFeature> FromIterator<(F, D)> for IntervalIndex<D> {
    fn from_iter<I: IntoIterator<Item = (F, D)>>(iter: I) -> Self {
        let mut trees: HashMap<String, IntervalTree<u64, D>> = HashMap::new();
        for (feature, data) in iter {
            trees
                .entry(feature.chrom().to_string())
                .or_default()
                .insert(feature.start()..feature.end(), data);
        }
        Self(trees)
    }
}

impl<D> IntervalIndex<D> {
    /// Returns the entries overlapping the query region.
    pub fn find<F: GenomicFeature>(&self, query: &F) -> Hits<'_, D> {
        self.find_region(query.chrom(), query.start(), query.end())
    }

    pub fn find_region(&self, chrom: &str, start: u64, end: u64) -> Hits<'_, D> {
        Hits {
            inner: self.0.get(chrom).map(|tree| tree.find(start..end)),
        }
    }

    pub fn is_overlapped<F: GenomicFeature>(&self, query: &F) -> bool {
        self.find(query).next().is_some()
    }
}

/// Iterator over index entries overlapping a query, yielding the stored
/// interval and its data.
pub struct Hits<'a, D> {
    inner: Option<IntervalTreeIterator<'a, u64, D>>,
}

impl<'a, D> Iterator for Hits<'a, D> {
    type Item = (Range<u64>, &'a D);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.as_mut()?.next()?;
        let interval = entry.interval();
        Some((interval.start..interval.end, entry.data()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::GenomicInterval;

    #[test]
    fn test_overlap_query() {
        let index: IntervalIndex<usize> = vec![
            (GenomicInterval::new("chr1", 200, 500).unwrap(), 0),
            (GenomicInterval::new("chr1", 1000, 2000).unwrap(), 1),
        ]
        .into_iter()
        .collect();

        let query = GenomicInterval::new("chr1", 100, 210).unwrap();
        let hits: Vec<usize> = index.find(&query).map(|(_, d)| *d).collect();
        assert_eq!(hits, vec![0]);

        let miss = GenomicInterval::new("chr1", 500, 900).unwrap();
        assert!(!index.is_overlapped(&miss));

        let other_chrom = GenomicInterval::new("chr2", 200, 500).unwrap();
        assert!(!index.is_overlapped(&other_chrom));
    }

    #[test]
    fn test_hit_interval() {
        let index: IntervalIndex<()> =
            vec![(GenomicInterval::new("chrX", 10, 20).unwrap(), ())]
                .into_iter()
                .collect();
        let hits: Vec<Range<u64>> = index.find_region("chrX", 0, 100).map(|(r, _)| r).collect();
        assert_eq!(hits, vec![10..20]);
    }
}
