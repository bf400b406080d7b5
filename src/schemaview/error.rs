//! Schema view errors

use crate::schema::{ElementKind, SchemaError};
use thiserror::Error;

/// Schema view errors
#[derive(Error, Debug)]
pub enum SchemaViewError {
    /// Strict lookup of an element that is not in the closure
    #[error("No such {kind}: {name}")]
    UnknownElement { kind: ElementKind, name: String },

    /// `is_a` or mixin pointing at an element that does not exist
    #[error("{kind} {name} refers to unknown parent {parent}")]
    UnresolvedReference {
        kind: ElementKind,
        name: String,
        parent: String,
    },

    /// Inheritance ordering cannot place an element
    #[error("Cannot order by inheritance: {0}")]
    Ordering(String),

    /// An import could not be loaded
    #[error("Cannot load import {name}: {source}")]
    Import {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error(
        "No such slot {slot} as an attribute of {class} ancestors or as a slot definition in the schema"
    )]
    NoSuchSlot { slot: String, class: String },

    /// A slot whose range expressions resolve to nothing
    #[error("Slot {0} has no applicable range")]
    NoApplicableRange(String),

    #[error("Element {0} has no URI")]
    NoUri(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type SchemaViewResult<T> = Result<T, SchemaViewError>;

impl SchemaViewError {
    pub(crate) fn unknown(kind: ElementKind, name: impl Into<String>) -> Self {
        SchemaViewError::UnknownElement {
            kind,
            name: name.into(),
        }
    }
}
