//! Reference sequence lookup.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use noodles::core::{Position, Region};
use noodles::fasta;

use crate::interval::GenomicFeature;
use crate::services::ServiceError;

/// Chromosome names and lengths of a reference assembly, in assembly order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ChromSizes(IndexMap<String, u64>);

impl ChromSizes {
    pub fn get(&self, chrom: &str) -> Option<u64> {
        self.0.get(chrom).copied()
    }

    pub fn contains(&self, chrom: &str) -> bool {
        self.0.contains_key(chrom)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.0.iter().map(|(chrom, size)| (chrom.as_str(), *size))
    }
}

impl<S> FromIterator<(S, u64)> for ChromSizes
where
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        ChromSizes(iter.into_iter().map(|(s, l)| (s.into(), l)).collect())
    }
}

/// The reference sequence service: nucleotides by region, measured against
/// one named assembly. Coordinates are 0-based, half-open.
pub trait ReferenceSequence {
    /// The assembly identifier the served coordinates belong to, usable as
    /// a collection genome tag.
    fn assembly(&self) -> &str;

    /// The chromosomes the service knows about.
    fn chrom_sizes(&self) -> &ChromSizes;

    /// Fetches the nucleotide symbols of a region.
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>, ServiceError>;

    /// Fetches the nucleotides covered by a feature.
    fn fetch_feature<F: GenomicFeature>(&mut self, feature: &F) -> Result<Vec<u8>, ServiceError>
    where
        Self: Sized,
    {
        self.fetch(feature.chrom(), feature.start(), feature.end())
    }
}

/// A reference sequence store backed by a FASTA file with a `.fai` index
/// sidecar.
pub struct IndexedFasta {
    reader: fasta::IndexedReader<fasta::io::BufReader<File>>,
    assembly: String,
    sizes: ChromSizes,
}

impl IndexedFasta {
    /// Opens `<path>` and its `<path>.fai` index. `assembly` names the
    /// reference build the file contains, e.g. `hg38`.
    pub fn open<P: AsRef<Path>, S: Into<String>>(path: P, assembly: S) -> Result<Self> {
        let path = path.as_ref();
        let fai = path.with_extension(match path.extension().and_then(|x| x.to_str()) {
            Some(ext) => format!("{}.fai", ext),
            None => "fai".to_string(),
        });
        let sizes = read_fai(&fai)?;
        let reader = fasta::indexed_reader::Builder::default()
            .build_from_path(path)
            .with_context(|| format!("cannot open FASTA file: {}", path.display()))?;
        Ok(Self {
            reader,
            assembly: assembly.into(),
            sizes,
        })
    }
}

impl ReferenceSequence for IndexedFasta {
    fn assembly(&self) -> &str {
        &self.assembly
    }

    fn chrom_sizes(&self) -> &ChromSizes {
        &self.sizes
    }

    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>, ServiceError> {
        let size = self
            .sizes
            .get(chrom)
            .ok_or_else(|| ServiceError::UnknownChrom(chrom.to_string()))?;
        if start > end || end > size {
            return Err(ServiceError::OutOfBounds {
                chrom: chrom.to_string(),
                start,
                end,
            });
        }
        if start == end {
            return Ok(Vec::new());
        }
        // The query interval is 1-based inclusive.
        let interval = Position::try_from(start as usize + 1)
            .and_then(|s| Position::try_from(end as usize).map(|e| s..=e))
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        let record = self.reader.query(&Region::new(chrom, interval))?;
        Ok(record.sequence().as_ref().to_vec())
    }
}

/// Parses a FASTA index: one sequence per line, name and length in the
/// first two tab-delimited columns.
fn read_fai(path: &Path) -> Result<ChromSizes> {
    let file =
        File::open(path).with_context(|| format!("cannot open FASTA index: {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .map(|line| {
            let line = line?;
            let mut fields = line.split('\t');
            let name = fields
                .next()
                .filter(|x| !x.is_empty())
                .with_context(|| format!("missing sequence name in {}", path.display()))?
                .to_string();
            let length: u64 = fields
                .next()
                .context("missing sequence length")
                .and_then(|x| {
                    lexical::parse(x)
                        .with_context(|| format!("invalid sequence length for {}", name))
                })?;
            Ok((name, length))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FASTA: &str = ">chr1\nACGTACGTAC\nGTACGTACGT\n>chrM\nTTTTAAAA\n";
    // name, length, offset, line bases, line width
    const FAI: &str = "chr1\t20\t6\t10\t11\nchrM\t8\t34\t8\t9\n";

    fn fixture() -> (tempfile::TempDir, IndexedFasta) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa");
        File::create(&path)
            .unwrap()
            .write_all(FASTA.as_bytes())
            .unwrap();
        File::create(dir.path().join("ref.fa.fai"))
            .unwrap()
            .write_all(FAI.as_bytes())
            .unwrap();
        let fasta = IndexedFasta::open(&path, "hg38").unwrap();
        (dir, fasta)
    }

    #[test]
    fn test_chrom_sizes() {
        let (_dir, fasta) = fixture();
        assert_eq!(fasta.assembly(), "hg38");
        assert_eq!(fasta.chrom_sizes().get("chr1"), Some(20));
        assert_eq!(fasta.chrom_sizes().get("chrM"), Some(8));
        assert_eq!(fasta.chrom_sizes().total_size(), 28);
    }

    #[test]
    fn test_fetch_region() {
        let (_dir, mut fasta) = fixture();
        assert_eq!(fasta.fetch("chr1", 0, 4).unwrap(), b"ACGT");
        assert_eq!(fasta.fetch("chr1", 8, 12).unwrap(), b"ACGT");
        assert_eq!(fasta.fetch("chrM", 0, 8).unwrap(), b"TTTTAAAA");
        assert!(fasta.fetch("chr1", 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_errors() {
        let (_dir, mut fasta) = fixture();
        assert!(matches!(
            fasta.fetch("chr2", 0, 4),
            Err(ServiceError::UnknownChrom(_))
        ));
        assert!(matches!(
            fasta.fetch("chr1", 0, 100),
            Err(ServiceError::OutOfBounds { .. })
        ));
    }
}
