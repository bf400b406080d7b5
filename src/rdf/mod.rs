//! RDF (Resource Description Framework) support
//!
//! This module provides the triple model the dumpers and loaders work against:
//! - RDF terms and triples (subject-predicate-object) over oxrdf
//! - An in-memory, insertion-ordered graph with subject and predicate indices
//! - Prefix tables with an explicit base IRI
//! - Turtle and N-Triples parsing and serialization via rio, JSON-LD output
//!
//! # Example
//!
//! ```rust
//! use linkml_runtime::rdf::{RdfGraph, NamedNode, Literal, RdfPredicate, RdfSubject};
//!
//! let mut graph = RdfGraph::new();
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! graph.add(subject.clone(), predicate, Literal::new_simple_literal("Alice"));
//!
//! let subject: RdfSubject = subject.into();
//! assert_eq!(graph.predicate_objects(&subject).count(), 1);
//! ```

mod graph;
mod namespace;
mod serialization;
mod types;

pub use types::{
    BlankNode, Literal, NamedNode, RdfError, RdfObject, RdfPredicate, RdfResult, RdfSubject,
    Triple,
};

pub use graph::{GraphError, GraphResult, RdfGraph};

pub use namespace::{Namespace, Namespaces, PrefixError, PrefixResult};

pub use serialization::{
    ParseError, ParseResult, RdfFormat, RdfParser, RdfSerializer, SerializeError,
    SerializeResult,
};

/// Namespace of the XML Schema datatypes
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
/// `rdfs:Resource`
pub const RDFS_RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_module_exports() {
        let _graph: RdfGraph = RdfGraph::new();
        let ns = Namespaces::with_defaults();
        assert_eq!(ns.get_iri("xsd").unwrap(), XSD);
    }
}
