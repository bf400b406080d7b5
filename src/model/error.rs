use thiserror::Error;

/// Instance construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("{class} has no field {field}")]
    UnknownField { class: String, field: String },

    #[error("Missing required field {field} for {class}")]
    MissingField { class: String, field: String },

    /// A single-valued string field received several untagged strings
    #[error("Field {field} of {class} cannot have multiple values without language tags")]
    MultipleUntaggedValues { class: String, field: String },

    #[error("Field {field} of {class} expects {expected}")]
    Cardinality {
        class: String,
        field: String,
        expected: &'static str,
    },

    #[error("Invalid value for {class}.{field}: {message}")]
    InvalidValue {
        class: String,
        field: String,
        message: String,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;
