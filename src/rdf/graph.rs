//! In-memory RDF graph
//!
//! Triples are kept in insertion order, with a subject-first index for walking
//! a node's outgoing edges and a predicate-first index for type and reverse lookups.

use super::namespace::Namespaces;
use super::types::{NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// RDF graph errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Triple not found
    #[error("Triple not found: {0}")]
    TripleNotFound(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// RDF graph with SPO and POS indices plus the namespaces bound for serialization
#[derive(Debug, Clone, Default)]
pub struct RdfGraph {
    /// All triples in insertion order
    triples: IndexSet<Triple>,

    /// SPO index: Subject -> Predicate -> Objects
    spo_index: IndexMap<RdfSubject, IndexMap<RdfPredicate, IndexSet<RdfObject>>>,

    /// POS index: Predicate -> Object -> Subjects
    pos_index: FxHashMap<RdfPredicate, FxHashMap<RdfObject, IndexSet<RdfSubject>>>,

    namespaces: Namespaces,
}

impl RdfGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with namespaces already bound
    pub fn with_namespaces(namespaces: Namespaces) -> Self {
        Self {
            namespaces,
            ..Self::default()
        }
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut Namespaces {
        &mut self.namespaces
    }

    /// Bind a prefix used when serializing
    pub fn bind(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.namespaces.add_prefix(prefix, iri);
    }

    /// Insert a triple; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }
        self.spo_index
            .entry(triple.subject.clone())
            .or_default()
            .entry(triple.predicate.clone())
            .or_default()
            .insert(triple.object.clone());
        self.pos_index
            .entry(triple.predicate.clone())
            .or_default()
            .entry(triple.object.clone())
            .or_default()
            .insert(triple.subject.clone());
        self.triples.insert(triple)
    }

    /// Insert a triple from its parts
    pub fn add(
        &mut self,
        subject: impl Into<RdfSubject>,
        predicate: impl Into<RdfPredicate>,
        object: impl Into<RdfObject>,
    ) -> bool {
        self.insert(Triple::new(subject.into(), predicate.into(), object.into()))
    }

    /// Remove a triple from the graph
    pub fn remove(&mut self, triple: &Triple) -> GraphResult<()> {
        if !self.triples.shift_remove(triple) {
            return Err(GraphError::TripleNotFound(triple.to_string()));
        }

        if let Some(predicates) = self.spo_index.get_mut(&triple.subject) {
            if let Some(objects) = predicates.get_mut(&triple.predicate) {
                objects.shift_remove(&triple.object);
                if objects.is_empty() {
                    predicates.shift_remove(&triple.predicate);
                }
            }
            if predicates.is_empty() {
                self.spo_index.shift_remove(&triple.subject);
            }
        }

        if let Some(objects) = self.pos_index.get_mut(&triple.predicate) {
            if let Some(subjects) = objects.get_mut(&triple.object) {
                subjects.shift_remove(&triple.subject);
                if subjects.is_empty() {
                    objects.remove(&triple.object);
                }
            }
            if objects.is_empty() {
                self.pos_index.remove(&triple.predicate);
            }
        }

        Ok(())
    }

    /// Check if a triple exists in the graph
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Get the total number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Get an iterator over all triples
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Distinct subjects in first-seen order
    pub fn subjects(&self) -> impl Iterator<Item = &RdfSubject> {
        self.spo_index.keys()
    }

    /// Outgoing (predicate, object) pairs of a subject
    pub fn predicate_objects<'a>(
        &'a self,
        subject: &RdfSubject,
    ) -> impl Iterator<Item = (&'a RdfPredicate, &'a RdfObject)> + 'a {
        self.spo_index
            .get(subject)
            .into_iter()
            .flat_map(|predicates| {
                predicates
                    .iter()
                    .flat_map(|(p, objects)| objects.iter().map(move |o| (p, o)))
            })
    }

    /// Objects of `(subject, predicate, ?)`
    pub fn objects<'a>(
        &'a self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
    ) -> impl Iterator<Item = &'a RdfObject> + 'a {
        self.spo_index
            .get(subject)
            .and_then(|predicates| predicates.get(predicate))
            .into_iter()
            .flat_map(|objects| objects.iter())
    }

    /// Subjects of `(?, predicate, object)`
    pub fn subjects_with<'a>(
        &'a self,
        predicate: &RdfPredicate,
        object: &RdfObject,
    ) -> impl Iterator<Item = &'a RdfSubject> + 'a {
        self.pos_index
            .get(predicate)
            .and_then(|objects| objects.get(object))
            .into_iter()
            .flat_map(|subjects| subjects.iter())
    }

    /// Declared `rdf:type` values of a subject
    pub fn types_of<'a>(&'a self, subject: &RdfSubject) -> impl Iterator<Item = &'a RdfObject> + 'a {
        let rdf_type = RdfPredicate::rdf_type();
        self.spo_index
            .get(subject)
            .and_then(move |predicates| predicates.get(&rdf_type))
            .into_iter()
            .flat_map(|objects| objects.iter())
    }

    /// Whether `subject rdf:type class` is asserted
    pub fn has_type(&self, subject: &RdfSubject, class: &NamedNode) -> bool {
        self.types_of(subject)
            .any(|t| t.as_named_node() == Some(class))
    }
}

impl Extend<Triple> for RdfGraph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}
