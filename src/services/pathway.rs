//! Pathway database lookup.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

/// A curated set of genes participating in a biological process.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pathway {
    pub id: String,
    pub name: String,
    pub genes: Vec<String>,
}

/// The pathway database service: gene lists by pathway id, plus an
/// optionally available rendered diagram image.
pub trait PathwayDb {
    fn pathway(&self, id: &str) -> Result<&Pathway, ServiceError>;

    /// The raw bytes of the pathway's rendered diagram.
    fn diagram(&self, id: &str) -> Result<Vec<u8>, ServiceError>;
}

/// A pathway database loaded from a JSON document (an array of pathway
/// objects), with diagrams served from an optional directory of
/// `<id>.png` files.
pub struct JsonPathwayDb {
    pathways: IndexMap<String, Pathway>,
    diagram_dir: Option<PathBuf>,
}

impl JsonPathwayDb {
    pub fn from_json<R: Read>(input: R) -> Result<Self> {
        let pathways: Vec<Pathway> =
            serde_json::from_reader(input).context("malformed pathway document")?;
        Ok(Self {
            pathways: pathways.into_iter().map(|p| (p.id.clone(), p)).collect(),
            diagram_dir: None,
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("cannot open pathway document: {}", path.display()))?;
        Self::from_json(file)
    }

    pub fn with_diagram_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.diagram_dir = Some(dir.into());
        self
    }

    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }
}

impl PathwayDb for JsonPathwayDb {
    fn pathway(&self, id: &str) -> Result<&Pathway, ServiceError> {
        self.pathways
            .get(id)
            .ok_or_else(|| ServiceError::unknown_id("pathway", id))
    }

    fn diagram(&self, id: &str) -> Result<Vec<u8>, ServiceError> {
        // Only pathways we know about can have a diagram.
        self.pathway(id)?;
        let dir = self
            .diagram_dir
            .as_ref()
            .ok_or_else(|| ServiceError::unknown_id("diagram", id))?;
        match std::fs::read(dir.join(format!("{}.png", id))) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::unknown_id("diagram", id))
            }
            Err(e) => Err(ServiceError::Transport(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"[
        {"id": "hsa04110", "name": "Cell cycle", "genes": ["CDK1", "CDK2", "TP53"]},
        {"id": "hsa04115", "name": "p53 signaling pathway", "genes": ["TP53", "MDM2"]}
    ]"#;

    #[test]
    fn test_pathway_lookup() {
        let db = JsonPathwayDb::from_json(DOC.as_bytes()).unwrap();
        assert_eq!(db.len(), 2);
        let p = db.pathway("hsa04110").unwrap();
        assert_eq!(p.name, "Cell cycle");
        assert_eq!(p.genes, ["CDK1", "CDK2", "TP53"]);
        assert!(matches!(
            db.pathway("hsa99999"),
            Err(ServiceError::UnknownId { .. })
        ));
    }

    #[test]
    fn test_diagram() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("hsa04110.png"))
            .unwrap()
            .write_all(b"\x89PNG")
            .unwrap();

        let db = JsonPathwayDb::from_json(DOC.as_bytes())
            .unwrap()
            .with_diagram_dir(dir.path());
        assert_eq!(db.diagram("hsa04110").unwrap(), b"\x89PNG");
        // Known pathway, no rendered image on disk.
        assert!(db.diagram("hsa04115").is_err());
    }

    #[test]
    fn test_malformed_document() {
        assert!(JsonPathwayDb::from_json("not json".as_bytes()).is_err());
    }
}
