//! Identifier mapping lookup, e.g. gene symbol to literature references.

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;

use crate::io::open_for_read;
use crate::services::ServiceError;

/// The identifier mapping service: one key type mapped to one value type,
/// with possibly many values per key.
pub trait IdMapping {
    /// The key type served, e.g. `SYMBOL`.
    fn key_type(&self) -> &str;

    /// The value type served, e.g. `PMID`.
    fn value_type(&self) -> &str;

    /// The mapped values for a key, in source order.
    fn map(&self, key: &str) -> Result<&[String], ServiceError>;
}

/// An identifier mapping loaded from a two-column, tab-delimited table.
/// Repeated keys accumulate values.
pub struct TableMapping {
    key_type: String,
    value_type: String,
    entries: IndexMap<String, Vec<String>>,
}

impl TableMapping {
    /// Reads `key\tvalue` lines. Lines starting with `#` are skipped.
    pub fn from_tsv<R, K, V>(input: R, key_type: K, value_type: V) -> Result<Self>
    where
        R: BufRead,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: IndexMap<String, Vec<String>> = IndexMap::new();
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('\t')
                .with_context(|| format!("line {}: expected two tab-delimited columns", i + 1))?;
            ensure!(!key.is_empty(), "line {}: empty key", i + 1);
            entries
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        }
        Ok(Self {
            key_type: key_type.into(),
            value_type: value_type.into(),
            entries,
        })
    }

    /// Loads a mapping table from a file, possibly gzip-compressed.
    pub fn from_tsv_file<P, K, V>(path: P, key_type: K, value_type: V) -> Result<Self>
    where
        P: AsRef<Path>,
        K: Into<String>,
        V: Into<String>,
    {
        let path = path.as_ref();
        let input = open_for_read(path)
            .with_context(|| format!("cannot open mapping table: {}", path.display()))?;
        Self::from_tsv(BufReader::new(input), key_type, value_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl IdMapping for TableMapping {
    fn key_type(&self) -> &str {
        &self.key_type
    }

    fn value_type(&self) -> &str {
        &self.value_type
    }

    fn map(&self, key: &str) -> Result<&[String], ServiceError> {
        self.entries
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| ServiceError::unknown_id(&self.key_type, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "# SYMBOL -> PMID\nBRCA1\t28122244\nBRCA1\t29853755\nTP53\t30566003\n";

    #[test]
    fn test_lookup() {
        let mapping = TableMapping::from_tsv(TABLE.as_bytes(), "SYMBOL", "PMID").unwrap();
        assert_eq!(mapping.key_type(), "SYMBOL");
        assert_eq!(mapping.value_type(), "PMID");
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.map("BRCA1").unwrap(),
            ["28122244".to_string(), "29853755".to_string()]
        );
        assert_eq!(mapping.map("TP53").unwrap(), ["30566003".to_string()]);

        match mapping.map("EGFR") {
            Err(ServiceError::UnknownId { kind, id }) => {
                assert_eq!(kind, "SYMBOL");
                assert_eq!(id, "EGFR");
            }
            other => panic!("unexpected result: {:?}", other.map(|v| v.to_vec())),
        }
    }

    #[test]
    fn test_malformed_table() {
        assert!(TableMapping::from_tsv("BRCA1 28122244\n".as_bytes(), "SYMBOL", "PMID").is_err());
    }
}
