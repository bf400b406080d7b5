//! RDF serialization formats
//!
//! Supports:
//! - Turtle (TTL), parse and serialize
//! - N-Triples (NT), parse and serialize
//! - JSON-LD, expanded-form serialize only

mod jsonld;
mod ntriples;
mod turtle;

use super::RdfGraph;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    #[default]
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// JSON-LD format (.jsonld)
    JsonLd,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "jsonld" | "json" => Some(RdfFormat::JsonLd),
            _ => None,
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::Turtle => "turtle",
            RdfFormat::NTriples => "nt",
            RdfFormat::JsonLd => "json-ld",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RdfFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(RdfFormat::Turtle),
            "nt" | "ntriples" | "n-triples" => Ok(RdfFormat::NTriples),
            "json-ld" | "jsonld" => Ok(RdfFormat::JsonLd),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Turtle syntax error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(RdfFormat),

    #[error("Unknown format name: {0}")]
    UnknownFormat(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF text into a graph; `base` resolves relative IRIs
    pub fn parse(input: &str, format: RdfFormat, base: Option<&str>) -> ParseResult<RdfGraph> {
        let graph = match format {
            RdfFormat::Turtle => turtle::parse(input, base)?,
            RdfFormat::NTriples => ntriples::parse(input)?,
            RdfFormat::JsonLd => return Err(ParseError::UnsupportedFormat(format)),
        };
        debug!("Parsed {} triples as {}", graph.len(), format);
        Ok(graph)
    }

    /// Parse RDF data from a file
    pub fn parse_file(path: &Path, format: RdfFormat) -> ParseResult<RdfGraph> {
        let input = std::fs::read_to_string(path)?;
        Self::parse(&input, format, None)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize a graph to a string
    pub fn serialize(graph: &RdfGraph, format: RdfFormat) -> SerializeResult<String> {
        match format {
            RdfFormat::Turtle => turtle::serialize(graph),
            RdfFormat::NTriples => ntriples::serialize(graph),
            RdfFormat::JsonLd => jsonld::serialize(graph),
        }
    }

    /// Serialize a graph to a file
    pub fn serialize_file(graph: &RdfGraph, path: &Path, format: RdfFormat) -> SerializeResult<()> {
        let text = Self::serialize(graph, format)?;
        std::fs::write(path, text)?;
        debug!("Wrote {} triples to {}", graph.len(), path.display());
        Ok(())
    }
}
