//! Ontology term lookup.
//!
//! Serves term metadata and one-step is-a edges. Whole-graph traversal
//! stays with the external ontology database.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::services::ServiceError;

/// A controlled-vocabulary term.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OntologyTerm {
    pub id: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl OntologyTerm {
    pub fn new<I, N>(id: I, name: N) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            namespace: None,
        }
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// The ontology graph service: term metadata plus parent/child edges by
/// term id.
pub trait Ontology {
    fn term(&self, id: &str) -> Result<&OntologyTerm, ServiceError>;

    /// Direct is-a parents of a term, in insertion order.
    fn parents(&self, id: &str) -> Result<Vec<&OntologyTerm>, ServiceError>;

    /// Direct children of a term, in insertion order.
    fn children(&self, id: &str) -> Result<Vec<&OntologyTerm>, ServiceError>;
}

/// An ontology held in memory, built term by term.
#[derive(Default)]
pub struct InMemoryOntology {
    terms: IndexMap<String, OntologyTerm>,
    parents: HashMap<String, Vec<String>>,
    children: HashMap<String, Vec<String>>,
}

impl InMemoryOntology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, term: OntologyTerm) -> &mut Self {
        self.terms.insert(term.id.clone(), term);
        self
    }

    /// Records an is-a edge. Both terms must already be present.
    pub fn add_is_a(&mut self, child: &str, parent: &str) -> Result<&mut Self, ServiceError> {
        for id in [child, parent] {
            if !self.terms.contains_key(id) {
                return Err(ServiceError::unknown_id("term", id));
            }
        }
        self.parents
            .entry(child.to_string())
            .or_default()
            .push(parent.to_string());
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn edges(
        &self,
        edges: &HashMap<String, Vec<String>>,
        id: &str,
    ) -> Result<Vec<&OntologyTerm>, ServiceError> {
        if !self.terms.contains_key(id) {
            return Err(ServiceError::unknown_id("term", id));
        }
        Ok(edges
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|x| self.terms.get(x))
            .collect())
    }
}

impl Ontology for InMemoryOntology {
    fn term(&self, id: &str) -> Result<&OntologyTerm, ServiceError> {
        self.terms
            .get(id)
            .ok_or_else(|| ServiceError::unknown_id("term", id))
    }

    fn parents(&self, id: &str) -> Result<Vec<&OntologyTerm>, ServiceError> {
        self.edges(&self.parents, id)
    }

    fn children(&self, id: &str) -> Result<Vec<&OntologyTerm>, ServiceError> {
        self.edges(&self.children, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> InMemoryOntology {
        let mut onto = InMemoryOntology::new();
        onto.add_term(
            OntologyTerm::new("GO:0008150", "biological_process")
                .with_namespace("biological_process"),
        );
        onto.add_term(OntologyTerm::new("GO:0009987", "cellular process"));
        onto.add_term(OntologyTerm::new("GO:0007049", "cell cycle"));
        onto.add_is_a("GO:0009987", "GO:0008150").unwrap();
        onto.add_is_a("GO:0007049", "GO:0009987").unwrap();
        onto
    }

    #[test]
    fn test_term_lookup() {
        let onto = fixture();
        assert_eq!(onto.len(), 3);
        let term = onto.term("GO:0007049").unwrap();
        assert_eq!(term.name, "cell cycle");
        assert!(matches!(
            onto.term("GO:9999999"),
            Err(ServiceError::UnknownId { .. })
        ));
    }

    #[test]
    fn test_edges() {
        let onto = fixture();
        let parents = onto.parents("GO:0007049").unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, "GO:0009987");

        let children = onto.children("GO:0008150").unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "GO:0009987");

        // A leaf has no children and a root no parents.
        assert!(onto.children("GO:0007049").unwrap().is_empty());
        assert!(onto.parents("GO:0008150").unwrap().is_empty());
    }

    #[test]
    fn test_edge_requires_known_terms() {
        let mut onto = fixture();
        assert!(onto.add_is_a("GO:0007049", "GO:9999999").is_err());
    }
}
