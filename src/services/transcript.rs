//! Transcript and gene model lookup.
//!
//! Transcript records are parsed from GTF or GFF3 annotation files with
//! noodles and served through [`TranscriptStore`], which answers lookups by
//! transcript id, by gene name, and by genomic region.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use noodles::core::Position;
use noodles::{gff, gtf};

use crate::index::IntervalIndex;
use crate::interval::{GenomicFeature, Strand};
use crate::io::open_for_read;
use crate::services::ServiceError;

/// A transcript model. Positions are 1-based, inclusive, as annotated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transcript {
    pub id: String,
    pub name: Option<String>,
    pub gene_id: String,
    pub gene_name: String,
    pub is_coding: Option<bool>,
    pub chrom: String,
    pub left: Position,
    pub right: Position,
    pub strand: Option<Strand>,
}

impl GenomicFeature for Transcript {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        usize::from(self.left) as u64 - 1
    }

    fn end(&self) -> u64 {
        usize::from(self.right) as u64
    }

    fn strand(&self) -> Option<Strand> {
        self.strand
    }
}

/// Which attribute keys carry the transcript and gene identifiers. The
/// defaults match GENCODE annotation.
pub struct AttributeKeys {
    pub transcript_id: String,
    pub transcript_name: String,
    pub gene_id: String,
    pub gene_name: String,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            transcript_id: "transcript_id".to_string(),
            transcript_name: "transcript_name".to_string(),
            gene_id: "gene_id".to_string(),
            gene_name: "gene_name".to_string(),
        }
    }
}

fn from_gtf(record: &gtf::Record, keys: &AttributeKeys) -> Result<Transcript> {
    if record.ty() != "transcript" {
        bail!("record is not a transcript");
    }

    let attributes: HashMap<&str, &str> = record
        .attributes()
        .iter()
        .map(|x| (x.key(), x.value()))
        .collect();
    let get_attr = |key: &str| -> Result<String> {
        attributes
            .get(key)
            .map(|x| x.to_string())
            .with_context(|| format!("missing attribute '{}' in record: {}", key, record))
    };

    Ok(Transcript {
        id: get_attr(&keys.transcript_id)?,
        name: attributes.get(keys.transcript_name.as_str()).map(|x| x.to_string()),
        gene_id: get_attr(&keys.gene_id)?,
        gene_name: get_attr(&keys.gene_name)?,
        is_coding: attributes
            .get("transcript_type")
            .map(|x| *x == "protein_coding"),
        chrom: record.reference_sequence_name().to_string(),
        left: record.start(),
        right: record.end(),
        strand: match record.strand() {
            Some(gtf::record::Strand::Forward) => Some(Strand::Forward),
            Some(gtf::record::Strand::Reverse) => Some(Strand::Reverse),
            None => None,
        },
    })
}

fn from_gff(record: &gff::Record, keys: &AttributeKeys) -> Result<Transcript> {
    if record.ty() != "transcript" {
        bail!("record is not a transcript");
    }

    let attributes = record.attributes();
    let get_attr = |key: &str| -> Result<String> {
        attributes
            .get(key)
            .map(|x| x.to_string())
            .with_context(|| format!("missing attribute '{}' in record: {}", key, record))
    };

    Ok(Transcript {
        id: get_attr(&keys.transcript_id)?,
        name: attributes
            .get(keys.transcript_name.as_str())
            .map(|x| x.to_string()),
        gene_id: get_attr(&keys.gene_id)?,
        gene_name: get_attr(&keys.gene_name)?,
        is_coding: attributes
            .get("transcript_type")
            .map(|x| x.as_string() == Some("protein_coding")),
        chrom: record.reference_sequence_name().to_string(),
        left: record.start(),
        right: record.end(),
        strand: match record.strand() {
            gff::record::Strand::Forward => Some(Strand::Forward),
            gff::record::Strand::Reverse => Some(Strand::Reverse),
            _ => None,
        },
    })
}

pub fn read_transcripts_from_gtf<R>(input: R, keys: &AttributeKeys) -> Result<Vec<Transcript>>
where
    R: BufRead,
{
    let mut results = Vec::new();
    input.lines().try_for_each(|line| {
        let line = line?;
        let line = gtf::Line::from_str(&line)
            .with_context(|| format!("failed to parse GTF line: {}", line))?;
        if let gtf::line::Line::Record(rec) = line {
            if rec.ty() == "transcript" {
                results.push(from_gtf(&rec, keys)?);
            }
        }
        anyhow::Ok(())
    })?;
    Ok(results)
}

pub fn read_transcripts_from_gff<R>(input: R, keys: &AttributeKeys) -> Result<Vec<Transcript>>
where
    R: BufRead,
{
    let mut results = Vec::new();
    input.lines().try_for_each(|line| {
        let line = line?;
        let line = gff::Line::from_str(&line)
            .with_context(|| format!("failed to parse GFF line: {}", line))?;
        if let gff::line::Line::Record(rec) = line {
            if rec.ty() == "transcript" {
                results.push(from_gff(&rec, keys)?);
            }
        }
        anyhow::Ok(())
    })?;
    Ok(results)
}

/// The transcript/gene database: structured transcript records by
/// identifier or by genomic region.
pub struct TranscriptStore {
    transcripts: Vec<Transcript>,
    by_id: HashMap<String, usize>,
    by_gene: HashMap<String, Vec<usize>>,
    regions: IntervalIndex<usize>,
}

impl TranscriptStore {
    pub fn new(transcripts: Vec<Transcript>) -> Self {
        let by_id = transcripts
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let by_gene = transcripts
            .iter()
            .enumerate()
            .map(|(i, t)| (t.gene_name.clone(), i))
            .into_group_map();
        let regions = transcripts.iter().enumerate().map(|(i, t)| (t, i)).collect();
        Self {
            transcripts,
            by_id,
            by_gene,
            regions,
        }
    }

    /// Loads transcripts from a GTF file, possibly gzip-compressed.
    pub fn from_gtf_file<P: AsRef<Path>>(path: P, keys: &AttributeKeys) -> Result<Self> {
        let path = path.as_ref();
        let input = open_for_read(path)
            .with_context(|| format!("cannot open annotation file: {}", path.display()))?;
        Ok(Self::new(read_transcripts_from_gtf(
            BufReader::new(input),
            keys,
        )?))
    }

    /// Loads transcripts from a GFF3 file, possibly gzip-compressed.
    pub fn from_gff_file<P: AsRef<Path>>(path: P, keys: &AttributeKeys) -> Result<Self> {
        let path = path.as_ref();
        let input = open_for_read(path)
            .with_context(|| format!("cannot open annotation file: {}", path.display()))?;
        Ok(Self::new(read_transcripts_from_gff(
            BufReader::new(input),
            keys,
        )?))
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transcript> {
        self.transcripts.iter()
    }

    /// Looks up a transcript by its identifier.
    pub fn get(&self, transcript_id: &str) -> Result<&Transcript, ServiceError> {
        self.by_id
            .get(transcript_id)
            .map(|&i| &self.transcripts[i])
            .ok_or_else(|| ServiceError::unknown_id("transcript", transcript_id))
    }

    /// Looks up all transcripts of a gene, in annotation order.
    pub fn gene(&self, gene_name: &str) -> Result<Vec<&Transcript>, ServiceError> {
        self.by_gene
            .get(gene_name)
            .map(|is| is.iter().map(|&i| &self.transcripts[i]).collect())
            .ok_or_else(|| ServiceError::unknown_id("gene", gene_name))
    }

    /// Returns the transcripts overlapping a genomic region.
    pub fn in_region<F: GenomicFeature>(&self, region: &F) -> Vec<&Transcript> {
        let mut indices: Vec<usize> = self.regions.find(region).map(|(_, &i)| i).collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.transcripts[i]).collect()
    }
}
