//! Schema document model
//!
//! In-memory records for schema documents and their elements, YAML/JSON (de)serialization,
//! the bundled `linkml:types` schema and a programmatic builder.

mod builder;
mod builtin;
mod element;
mod model;
mod names;

pub use builder::SchemaBuilder;
pub use builtin::{
    types_schema, xsd_datatype_for, LINKML_NAMESPACE, TYPES_IMPORT, TYPES_SCHEMA_ID,
    XSD_NAMESPACE,
};
pub use element::{Definition, Element, ElementKind, ElementRef, MappingType};
pub use model::{
    Annotations, AnonymousSlotExpression, ClassDefinition, EnumDefinition, PermissibleValue,
    Prefix, SchemaDefinition, SlotDefinition, SubsetDefinition, TypeDefinition,
};
pub use names::{camelcase, sfx, underscore};

use thiserror::Error;

/// Schema document errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Unreadable schema file
    #[error("Cannot read schema {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    /// Element already declared
    #[error("{kind} already exists: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error("No such {kind}: {name}")]
    NotFound { kind: &'static str, name: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
