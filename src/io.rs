//! Reading and writing line-oriented interval record files.
//!
//! One record per line, tab-delimited. Blank lines and lines starting with
//! `#` are skipped on input. Gzip-compressed input is detected from the file
//! content; output is gzip-compressed when the target path ends in `.gz`.
//!
//! A malformed line aborts the whole parse with an error naming the 1-based
//! line number. [`read_intervals_lenient`] is the explicit opt-in that skips
//! malformed lines and hands them back to the caller instead.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use log::info;

use crate::collection::IntervalCollection;
use crate::error::{Error, ParseError, ValidationError};
use crate::interval::{ExtraFields, GenomicFeature, GenomicInterval, Score, Strand};
use crate::interval::{DELIMITER, MISSING_FIELD};

/// The supported record formats. The named columns, in canonical order:
///
/// * `Bed3` - chrom, start, end
/// * `BedGraph` - chrom, start, end, score
/// * `Bed6` - chrom, start, end, name, score, strand
///
/// On input, trailing columns beyond the named ones are kept as extra
/// fields; on output, extra fields are appended after the named columns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Bed3,
    BedGraph,
    Bed6,
}

/// What the writer does when a record lacks an optional field that the
/// output format has a column for.
///
/// The default is `Placeholder`, which writes `.` in place of the missing
/// value; the parser reads `.` back as an absent field, so the policy
/// round-trips. `Strict` fails with a validation error naming the field
/// instead of writing a placeholder.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MissingFieldPolicy {
    #[default]
    Placeholder,
    Strict,
}

/// An interval record reader over a declared format.
pub struct Reader<R> {
    inner: R,
    format: Format,
    path: Option<PathBuf>,
    line: u64,
}

impl<R> Reader<R>
where
    R: BufRead,
{
    pub fn new(inner: R, format: Format) -> Self {
        Self {
            inner,
            format,
            path: None,
            line: 0,
        }
    }

    /// Attach a path for error reporting.
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns an iterator over records starting from the current stream
    /// position.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            inner: self,
            buf: String::new(),
        }
    }

    /// Reads a single raw line, stripping the terminator. Returns the number
    /// of bytes consumed; 0 means end of stream.
    fn read_record(&mut self, buf: &mut String) -> std::io::Result<usize> {
        let n = read_line(&mut self.inner, buf)?;
        if n > 0 {
            self.line += 1;
        }
        Ok(n)
    }

    fn stream_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("-"))
    }
}

/// An iterator over the records of a [`Reader`].
pub struct Records<'a, R> {
    inner: &'a mut Reader<R>,
    buf: String,
}

impl<R> Iterator for Records<'_, R>
where
    R: BufRead,
{
    type Item = Result<GenomicInterval, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_record(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    if self.buf.is_empty() || self.buf.starts_with('#') {
                        continue;
                    }
                    let line = self.inner.line;
                    return Some(parse_record(&self.buf, self.inner.format).map_err(
                        |e| match e {
                            RecordError::Parse(source) => Error::Parse { line, source },
                            RecordError::Validation(source) => Error::Validation { line, source },
                        },
                    ));
                }
                Err(e) => return Some(Err(Error::io(&self.inner.stream_path(), e))),
            }
        }
    }
}

fn read_line<R>(reader: &mut R, buf: &mut String) -> std::io::Result<usize>
where
    R: BufRead,
{
    const LINE_FEED: char = '\n';
    const CARRIAGE_RETURN: char = '\r';

    let n = reader.read_line(buf)?;
    if buf.ends_with(LINE_FEED) {
        buf.pop();
        if buf.ends_with(CARRIAGE_RETURN) {
            buf.pop();
        }
    }
    Ok(n)
}

enum RecordError {
    Parse(ParseError),
    Validation(ValidationError),
}

impl From<ParseError> for RecordError {
    fn from(e: ParseError) -> Self {
        RecordError::Parse(e)
    }
}

impl From<ValidationError> for RecordError {
    fn from(e: ValidationError) -> Self {
        RecordError::Validation(e)
    }
}

fn parse_record(s: &str, format: Format) -> Result<GenomicInterval, RecordError> {
    let mut fields = s.split(DELIMITER);
    let chrom = fields.next().ok_or(ParseError::MissingChrom)?;
    let start = fields
        .next()
        .ok_or(ParseError::MissingStart)
        .and_then(|s| lexical::parse(s).map_err(ParseError::InvalidStart))?;
    let end = fields
        .next()
        .ok_or(ParseError::MissingEnd)
        .and_then(|s| lexical::parse(s).map_err(ParseError::InvalidEnd))?;
    let mut record = GenomicInterval::new(chrom, start, end)?;

    let (name, score, strand) = match format {
        Format::Bed3 => (None, None, None),
        Format::BedGraph => (None, parse_score(&mut fields)?, None),
        Format::Bed6 => (
            parse_name(&mut fields),
            parse_score(&mut fields)?,
            parse_strand(&mut fields)?,
        ),
    };
    let extra: ExtraFields = fields.map(|x| x.to_string()).collect();
    record.set_optional(name, score, strand, extra);
    Ok(record)
}

fn parse_name<'a, I>(fields: &mut I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    match fields.next() {
        None | Some(MISSING_FIELD) => None,
        Some(s) => Some(s.to_string()),
    }
}

fn parse_score<'a, I>(fields: &mut I) -> Result<Option<Score>, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    match fields.next() {
        None | Some(MISSING_FIELD) => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

fn parse_strand<'a, I>(fields: &mut I) -> Result<Option<Strand>, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    match fields.next() {
        None | Some(MISSING_FIELD) => Ok(None),
        Some(s) => Strand::from_str(s).map(Some),
    }
}

/// Displays a record as one line of the given format, with `.` standing in
/// for absent optional fields.
struct DisplayRecord<'a> {
    record: &'a GenomicInterval,
    format: Format,
}

impl fmt::Display for DisplayRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rec = self.record;
        write!(
            f,
            "{}{}{}{}{}",
            rec.chrom(),
            DELIMITER,
            rec.start(),
            DELIMITER,
            rec.end()
        )?;
        match self.format {
            Format::Bed3 => {}
            Format::BedGraph => {
                write!(f, "{}", DELIMITER)?;
                match rec.score() {
                    Some(score) => write!(f, "{}", score)?,
                    None => f.write_str(MISSING_FIELD)?,
                }
            }
            Format::Bed6 => {
                write!(f, "{}{}", DELIMITER, rec.name().unwrap_or(MISSING_FIELD))?;
                write!(f, "{}", DELIMITER)?;
                match rec.score() {
                    Some(score) => write!(f, "{}", score)?,
                    None => f.write_str(MISSING_FIELD)?,
                }
                write!(f, "{}", DELIMITER)?;
                match rec.strand() {
                    Some(strand) => write!(f, "{}", strand)?,
                    None => f.write_str(MISSING_FIELD)?,
                }
            }
        }
        if !rec.extra().is_empty() {
            write!(f, "{}{}", DELIMITER, rec.extra())?;
        }
        Ok(())
    }
}

/// The first optional field absent from `rec` that `format` has a column
/// for, if any.
fn missing_required_field(rec: &GenomicInterval, format: Format) -> Option<&'static str> {
    match format {
        Format::Bed3 => None,
        Format::BedGraph => rec.score().is_none().then_some("score"),
        Format::Bed6 => {
            if rec.name().is_none() {
                Some("name")
            } else if rec.score().is_none() {
                Some("score")
            } else if rec.strand().is_none() {
                Some("strand")
            } else {
                None
            }
        }
    }
}

/// An interval record writer.
pub struct Writer<W> {
    inner: W,
    format: Format,
    policy: MissingFieldPolicy,
    path: Option<PathBuf>,
    line: u64,
}

impl<W> Writer<W>
where
    W: Write,
{
    pub fn new(inner: W, format: Format) -> Self {
        Self {
            inner,
            format,
            policy: MissingFieldPolicy::default(),
            path: None,
            line: 0,
        }
    }

    pub fn with_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a path for error reporting.
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Serializes one record as a single line.
    pub fn write_record(&mut self, record: &GenomicInterval) -> Result<(), Error> {
        self.line += 1;
        if self.policy == MissingFieldPolicy::Strict {
            if let Some(field) = missing_required_field(record, self.format) {
                return Err(Error::Validation {
                    line: self.line,
                    source: ValidationError::MissingField { field },
                });
            }
        }
        let line = DisplayRecord {
            record,
            format: self.format,
        };
        writeln!(self.inner, "{}", line).map_err(|e| Error::io(&self.stream_path(), e))
    }

    fn stream_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("-"))
    }
}

/// Open a file for reading, transparently decompressing gzip. Compression
/// is detected from the file content, not the extension.
pub(crate) fn open_for_read(path: &Path) -> Result<Box<dyn Read>, Error> {
    let gzipped = MultiGzDecoder::new(File::open(path).map_err(|e| Error::io(path, e))?)
        .header()
        .is_some();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    if gzipped {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Create a file for writing, gzip-compressing when the path ends in `.gz`.
fn create_for_write(path: &Path) -> Result<Box<dyn Write>, Error> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let buffer = BufWriter::new(file);
    if path.extension().and_then(|x| x.to_str()) == Some("gz") {
        Ok(Box::new(GzEncoder::new(buffer, flate2::Compression::default())))
    } else {
        Ok(Box::new(buffer))
    }
}

/// Parses a record file into a collection. The whole parse fails on the
/// first malformed line; the resulting collection carries no genome tag.
pub fn read_intervals<P: AsRef<Path>>(
    path: P,
    format: Format,
) -> Result<IntervalCollection, Error> {
    let path = path.as_ref();
    let input = open_for_read(path)?;
    let mut reader = Reader::new(BufReader::new(input), format).with_path(path);
    let collection: IntervalCollection = reader.records().collect::<Result<_, _>>()?;
    info!(
        "imported {} records from {}",
        collection.len(),
        path.display()
    );
    Ok(collection)
}

/// Like [`read_intervals`], but skips malformed data lines and returns them
/// to the caller, each error carrying its line number. I/O failures still
/// abort. This mode is never the default.
pub fn read_intervals_lenient<P: AsRef<Path>>(
    path: P,
    format: Format,
) -> Result<(IntervalCollection, Vec<Error>), Error> {
    let path = path.as_ref();
    let input = open_for_read(path)?;
    let mut reader = Reader::new(BufReader::new(input), format).with_path(path);
    let mut skipped = Vec::new();
    let mut kept = Vec::new();
    for record in reader.records() {
        match record {
            Ok(r) => kept.push(r),
            Err(e @ Error::Io { .. }) => return Err(e),
            Err(e) => skipped.push(e),
        }
    }
    info!(
        "imported {} records from {} ({} lines skipped)",
        kept.len(),
        path.display(),
        skipped.len()
    );
    Ok((kept.into_iter().collect(), skipped))
}

/// Serializes a collection to a file, one line per record, creating or
/// overwriting the target. Absent optional fields are written as `.`.
pub fn write_intervals<P: AsRef<Path>>(
    collection: &IntervalCollection,
    path: P,
    format: Format,
) -> Result<(), Error> {
    write_intervals_with(collection, path, format, MissingFieldPolicy::default())
}

/// [`write_intervals`] with an explicit missing-field policy.
pub fn write_intervals_with<P: AsRef<Path>>(
    collection: &IntervalCollection,
    path: P,
    format: Format,
    policy: MissingFieldPolicy,
) -> Result<(), Error> {
    let path = path.as_ref();
    let output = create_for_write(path)?;
    let mut writer = Writer::new(output, format)
        .with_policy(policy)
        .with_path(path);
    for record in collection.iter() {
        writer.write_record(record)?;
    }
    info!(
        "exported {} records to {}",
        collection.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(data: &str, format: Format) -> Result<Vec<GenomicInterval>, Error> {
        Reader::new(data.as_bytes(), format).records().collect()
    }

    #[test]
    fn test_parse_bedgraph() {
        let data = "chr17\t100\t200\t0.5\nchr17\t300\t400\t0.9\n";
        let records = parse_all(data, Format::BedGraph).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].chrom(), "chr17");
        assert_eq!(records[0].start(), 100);
        assert_eq!(records[0].end(), 200);
        assert_eq!(records[0].score(), Some(Score::from(0.5)));
        assert_eq!(records[1].score(), Some(Score::from(0.9)));

        // Writing back reproduces the input bytes.
        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out, Format::BedGraph);
        for r in &records {
            writer.write_record(r).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), data);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let data = "# track description\n\nchr1\t0\t100\n";
        let records = parse_all(data, Format::Bed3).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].locus(), "chr1:0-100");
    }

    #[test]
    fn test_empty_input() {
        let records = parse_all("", Format::Bed3).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_field_reports_line_number() {
        let data = "chr1\t0\t100\nchr2\t5\n";
        let err = parse_all(data, Format::Bed3).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 2,
                source: ParseError::MissingEnd,
            }
        ));
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let err = parse_all("chr1\tzero\t100\n", Format::Bed3).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 1,
                source: ParseError::InvalidStart(_),
            }
        ));
    }

    #[test]
    fn test_inverted_interval_aborts() {
        let data = "chr1\t0\t100\nchr1\t500\t400\n";
        let err = parse_all(data, Format::Bed3).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                line: 2,
                source: ValidationError::InvertedInterval { start: 500, end: 400, .. },
            }
        ));
    }

    #[test]
    fn test_parse_bed6_with_extras() {
        let data = "chr2\t220\t2000\tr2\t2\t-\tfoo\tbar\n";
        let records = parse_all(data, Format::Bed6).unwrap();
        assert_eq!(records[0].name(), Some("r2"));
        assert_eq!(records[0].score(), Some(Score::from(2.0)));
        assert_eq!(records[0].strand(), Some(Strand::Reverse));
        assert_eq!(&**records[0].extra(), ["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn test_placeholder_round_trips() {
        let data = "chr1\t10\t20\tr1\t.\t+\n";
        let records = parse_all(data, Format::Bed6).unwrap();
        assert_eq!(records[0].score(), None);

        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out, Format::Bed6);
        writer.write_record(&records[0]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), data);
    }

    #[test]
    fn test_strict_policy() {
        let record = GenomicInterval::new("chr1", 0, 10).unwrap();
        let mut writer =
            Writer::new(Vec::new(), Format::BedGraph).with_policy(MissingFieldPolicy::Strict);
        let err = writer.write_record(&record).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                line: 1,
                source: ValidationError::MissingField { field: "score" },
            }
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_intervals("definitely/not/here.bed", Format::Bed3).unwrap_err();
        match err {
            Error::Io { path, source } => {
                assert_eq!(path, PathBuf::from("definitely/not/here.bed"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.bedgraph");
        std::fs::write(&path, "chr17\t100\t200\t0.5\nchr17\t300\t400\t0.9\n").unwrap();

        let collection = read_intervals(&path, Format::BedGraph).unwrap();
        assert_eq!(collection.len(), 2);
        assert!(collection.genome().is_none());

        let out = dir.path().join("out.bedgraph");
        write_intervals(&collection, &out, Format::BedGraph).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "chr17\t100\t200\t0.5\nchr17\t300\t400\t0.9\n"
        );
    }

    #[test]
    fn test_gzip_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.bed.gz");
        let collection: IntervalCollection = vec![
            GenomicInterval::new("chr1", 0, 50).unwrap(),
            GenomicInterval::new("chr2", 10, 60).unwrap(),
        ]
        .into_iter()
        .collect();

        write_intervals(&collection, &path, Format::Bed3).unwrap();
        let back = read_intervals(&path, Format::Bed3).unwrap();
        assert_eq!(
            back.iter().map(|x| x.locus()).collect::<Vec<_>>(),
            vec!["chr1:0-50", "chr2:10-60"]
        );
    }

    #[test]
    fn test_lenient_mode_collects_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dirty.bed");
        std::fs::write(&path, "chr1\t0\t100\nchr2\tbroken\nchr3\t5\t50\n").unwrap();

        let (collection, skipped) = read_intervals_lenient(&path, Format::Bed3).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line(), Some(2));
    }
}
