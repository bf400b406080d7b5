//! LinkML Runtime
//!
//! Schema introspection and schema-guided RDF projection for LinkML-style schemas.
//!
//! # Architecture
//!
//! - [`schema`]: the schema document model, its YAML form and the bundled `linkml:types`
//! - [`schemaview`]: a memoized view over a schema and its import closure, with
//!   traversal, slot induction, URI resolution and mutation
//! - [`rdf`]: triples, an ordered in-memory graph, prefix tables and Turtle / N-Triples I/O
//! - [`model`]: dynamic instances, the metadata generated model code embeds, and
//!   validated construction
//! - [`dumper`]: instances to RDF, guided by a schema view or by embedded metadata
//! - [`loader`]: RDF back to instances, with language preference for multilingual strings
//!
//! # Example
//!
//! ```rust
//! use linkml_runtime::dumper::RdfDumper;
//! use linkml_runtime::loader::RdfLoader;
//! use linkml_runtime::model::Instance;
//! use linkml_runtime::schemaview::SchemaView;
//!
//! let view = SchemaView::from_yaml(r#"
//! id: https://example.org/people
//! name: people
//! default_prefix: people
//! prefixes:
//!   people: https://example.org/people/
//!   schema: http://schema.org/
//!   P: http://example.org/P/
//! imports:
//!   - linkml:types
//! default_range: string
//! slots:
//!   id:
//!     identifier: true
//!   name:
//!     slot_uri: schema:name
//! classes:
//!   Person:
//!     class_uri: schema:Person
//!     slots: [id, name]
//! "#).unwrap();
//!
//! let alice = Instance::new("Person").with("id", "P:001").with("name", "Alice");
//! let graph = RdfDumper::new(&view).as_rdf_graph(&alice).unwrap();
//! assert_eq!(graph.len(), 2);
//!
//! let loaded = RdfLoader::new(&view).load_graph(&graph, "Person").unwrap();
//! assert_eq!(loaded.get_str("name"), Some("Alice"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod dumper;
pub mod loader;
pub mod model;
pub mod rdf;
pub mod schema;
pub mod schemaview;

// Re-export main types for convenience
pub use schema::{
    ClassDefinition, ElementKind, EnumDefinition, PermissibleValue, SchemaBuilder,
    SchemaDefinition, SchemaError, SchemaResult, SlotDefinition, TypeDefinition,
};

pub use schemaview::{
    FileSchemaLoader, InMemorySchemaLoader, SchemaLoader, SchemaView, SchemaViewError,
    SchemaViewResult, OrderedBy, Traversal,
};

pub use rdf::{Namespaces, RdfFormat, RdfGraph, RdfParser, RdfSerializer};

pub use model::{
    ClassMeta, EnumMeta, FieldDescriptor, FieldKind, Instance, ModelError, ModelModule,
    ModelResult, RdfModel, Value,
};

pub use dumper::{DumpError, DumpResult, DumperConfig, ModelRdfDumper, RdfDumper};

pub use loader::{
    LoadError, LoadResult, LoaderConfig, ModelRdfLoader, RdfLoader, RdfLoaderConfig,
    UntaggedStrategy,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
