//! Reconstructing model instances from RDF
//!
//! - [`ModelRdfLoader`] reads one instance using only the metadata embedded in generated
//!   model code. Predicates are matched to fields by slot URI, exact mappings or the
//!   schema namespace; several language-tagged values for a single string field are
//!   collapsed by language preference.
//! - [`RdfLoader`] is guided by a [`SchemaView`](crate::schemaview::SchemaView) and
//!   returns every instance of a class found in a graph.

mod language;
mod model;
mod schema;

pub use language::select_language;
pub use model::ModelRdfLoader;
pub use schema::{RdfLoader, RdfLoaderConfig};

use crate::model::{ModelError, Value};
use crate::rdf::{Literal, ParseError, PrefixError, RdfError, XSD};
use crate::schemaview::SchemaViewError;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Load errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No suitable subject found in RDF graph")]
    NoSubjectFound,

    #[error("No slot maps to predicate {0}")]
    UnmappedPredicate(String),

    #[error("Ambiguous types for {subject}: {types:?}")]
    AmbiguousType { subject: String, types: Vec<String> },

    #[error("No class has URI {0}")]
    UnknownType(String),

    #[error("Unexpected blank node {node}, {class} expects identifier {slot}")]
    UnexpectedBlankNode {
        node: String,
        class: String,
        slot: String,
    },

    #[error("Cannot read literal {value} as {target}")]
    InvalidLiteral { value: String, target: String },

    #[error("No object was built for node {0}")]
    UnresolvedNode(String),

    #[error("{0} triples were not processed")]
    UnprocessedTriples(usize),

    #[error("Got {found} instances of {class}, expected exactly 1")]
    InstanceCount { class: String, found: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    SchemaView(#[from] SchemaViewError),

    #[error("Cannot resolve URI: {0}")]
    Prefix(#[from] PrefixError),

    #[error("Invalid RDF term: {0}")]
    Rdf(#[from] RdfError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// How a single-valued string field with several untagged values is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntaggedStrategy {
    /// Keep every value so construction fails
    #[default]
    Reject,
    /// Take the first all-ASCII value, else the first value
    PreferAscii,
}

/// Loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Language tags in order of preference
    #[serde(default = "default_languages")]
    pub preferred_languages: Vec<String>,
    #[serde(default)]
    pub untagged_strategy: UntaggedStrategy,
    /// Extra prefixes used when shortening identifiers; an `@base` or `_base` key sets the base
    #[serde(default)]
    pub prefix_map: IndexMap<String, String>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            preferred_languages: default_languages(),
            untagged_strategy: UntaggedStrategy::default(),
            prefix_map: IndexMap::new(),
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferred_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_untagged_strategy(mut self, strategy: UntaggedStrategy) -> Self {
        self.untagged_strategy = strategy;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefix_map.insert(prefix.into(), iri.into());
        self
    }
}

/// Native value of a literal: XSD numbers, booleans and dates are parsed, language tags kept
pub(crate) fn literal_value(literal: &Literal) -> LoadResult<Value> {
    let text = literal.value();
    if let Some(language) = literal.language() {
        return Ok(Value::LangString {
            value: text.to_string(),
            language: language.to_string(),
        });
    }
    let datatype = literal.datatype();
    let invalid = || LoadError::InvalidLiteral {
        value: text.to_string(),
        target: datatype.as_str().to_string(),
    };
    let Some(local) = datatype.as_str().strip_prefix(XSD) else {
        return Ok(Value::String(text.to_string()));
    };
    Ok(match local {
        "integer" | "int" | "long" | "short" | "nonNegativeInteger" | "positiveInteger" => {
            Value::Integer(text.trim().parse().map_err(|_| invalid())?)
        }
        "decimal" | "float" | "double" => Value::Decimal(text.trim().parse().map_err(|_| invalid())?),
        "boolean" => Value::Boolean(matches!(text.trim().to_lowercase().as_str(), "true" | "1")),
        "date" => Value::Date(NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| invalid())?),
        _ => Value::String(text.to_string()),
    })
}
