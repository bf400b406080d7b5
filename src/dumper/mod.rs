//! Projecting model instances into RDF
//!
//! Two dumpers share the same projection rules:
//! - [`RdfDumper`] is guided by a [`SchemaView`](crate::schemaview::SchemaView): slot
//!   ranges, URIs and identifier slots come from induced slots.
//! - [`ModelRdfDumper`] needs only the metadata embedded in generated model code.
//!
//! Enum values with a `meaning` become URI nodes, typed scalars become literals with an
//! XSD datatype, objects become a subject with one triple per field value.

mod model;
mod schema;

pub use model::ModelRdfDumper;
pub use schema::RdfDumper;

use crate::model::ModelError;
use crate::rdf::{
    NamedNode, Namespaces, PrefixError, RdfError, RdfFormat, SerializeError,
};
use crate::schemaview::SchemaViewError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters kept as-is when percent-encoding identifiers
const IDENTIFIER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Dump errors
#[derive(Error, Debug)]
pub enum DumpError {
    #[error(transparent)]
    SchemaView(#[from] SchemaViewError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Cannot resolve URI: {0}")]
    Prefix(#[from] PrefixError),

    #[error("Invalid RDF term: {0}")]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// An instance of a class with an identifier slot has no identifier value
    #[error("{class} instance has no value for identifier {slot}")]
    MissingIdentifier { class: String, slot: String },

    #[error("Cannot write {value} as {target}")]
    InvalidValue { value: String, target: String },
}

pub type DumpResult<T> = Result<T, DumpError>;

/// Dumper settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumperConfig {
    /// Prefixes that extend or override the schema's; its base names relative identifiers
    #[serde(default)]
    pub prefix_map: Option<Namespaces>,
    #[serde(default)]
    pub format: RdfFormat,
}

impl DumperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take prefixes from a plain map; an `@base` or `_base` key sets the base IRI
    pub fn with_prefix_map<I, K, V>(mut self, map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.prefix_map = Some(Namespaces::from_prefix_map(map));
        self
    }

    pub fn with_format(mut self, format: RdfFormat) -> Self {
        self.format = format;
        self
    }
}

/// Namespaces of the source, overlaid with the configured prefix map
pub(crate) fn effective_namespaces(mut namespaces: Namespaces, config: &DumperConfig) -> Namespaces {
    if let Some(extra) = &config.prefix_map {
        namespaces.overlay(extra);
    }
    if !namespaces.contains("xsd") {
        namespaces.add_prefix("xsd", crate::rdf::XSD);
    }
    namespaces
}

/// Node for an identifier: percent-encoded against the base, or CURIE-expanded
pub(crate) fn identifier_node(
    id: &str,
    percent_encoded: bool,
    namespaces: &Namespaces,
) -> DumpResult<NamedNode> {
    let iri = if percent_encoded {
        let encoded = utf8_percent_encode(id, IDENTIFIER).to_string();
        match &namespaces.base {
            Some(base) => format!("{}{}", base, encoded),
            None => encoded,
        }
    } else {
        namespaces.uri_for(id)?
    };
    Ok(NamedNode::new(&iri)?)
}
