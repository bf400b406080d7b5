//! RDF namespace and prefix management
//!
//! `Namespaces` holds an ordered prefix table plus an optional base IRI. Caller-supplied
//! prefix maps may carry the base under the `@base` or `_base` key; it is lifted into
//! the `base` field on conversion and never stored as a prefix.

use indexmap::IndexMap;
use oxiri::Iri;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

const BASE_KEYS: [&str; 2] = ["@base", "_base"];

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Prefix table with an explicit base IRI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespaces {
    /// Base IRI for relative local names
    pub base: Option<String>,
    #[serde(default)]
    prefixes: IndexMap<String, String>,
}

impl Namespaces {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with common RDF prefixes
    pub fn with_defaults() -> Self {
        let mut ns = Self::new();
        ns.add_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        ns.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        ns.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        ns.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        ns
    }

    /// Build from a plain prefix map, lifting `@base` / `_base` into `base`
    pub fn from_prefix_map<I, K, V>(map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut ns = Self::new();
        for (prefix, iri) in map {
            let prefix = prefix.into();
            if BASE_KEYS.contains(&prefix.as_str()) {
                ns.base = Some(iri.into());
            } else {
                ns.add_prefix(prefix, iri);
            }
        }
        ns
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add (or replace) a prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Resolve a CURIE, absolute IRI or bare local name to a full IRI.
    ///
    /// Absolute IRIs pass through, known prefixes are expanded and bare names are
    /// appended to the base. Anything else must already parse as an absolute IRI.
    pub fn uri_for(&self, value: &str) -> PrefixResult<String> {
        if value.contains("://") {
            return Ok(value.to_string());
        }
        match value.split_once(':') {
            Some((prefix, local)) if self.contains(prefix) => {
                Ok(format!("{}{}", self.get_iri(prefix)?, local))
            }
            Some((prefix, _)) => match Iri::parse(value) {
                Ok(_) => Ok(value.to_string()),
                Err(_) => Err(PrefixError::UnknownPrefix(prefix.to_string())),
            },
            None => match &self.base {
                Some(base) => Ok(format!("{}{}", base, value)),
                None => Err(PrefixError::InvalidIri(value.to_string())),
            },
        }
    }

    /// Shorten an IRI to a CURIE using the longest matching namespace.
    ///
    /// Ties go to the prefix declared first.
    pub fn curie_for(&self, iri: &str) -> Option<String> {
        let mut best: Option<(&str, &str)> = None;
        for (prefix, namespace_iri) in &self.prefixes {
            if namespace_iri.is_empty() || !iri.starts_with(namespace_iri.as_str()) {
                continue;
            }
            if best.map_or(true, |(_, current)| namespace_iri.len() > current.len()) {
                best = Some((prefix, namespace_iri));
            }
        }
        best.map(|(prefix, namespace_iri)| format!("{}:{}", prefix, &iri[namespace_iri.len()..]))
    }

    /// Shorten an IRI, or return it unchanged if no namespace matches
    pub fn compact(&self, iri: &str) -> String {
        self.curie_for(iri).unwrap_or_else(|| iri.to_string())
    }

    /// Prefixes of `other` replace ours
    pub fn overlay(&mut self, other: &Namespaces) {
        for (prefix, iri) in &other.prefixes {
            self.prefixes.insert(prefix.clone(), iri.clone());
        }
        if other.base.is_some() {
            self.base = other.base.clone();
        }
    }

    /// Iterate `(prefix, iri)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, i)| (p.as_str(), i.as_str()))
    }

    /// Get all registered prefixes
    pub fn prefixes(&self) -> Vec<Namespace> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| Namespace::new(prefix.clone(), iri.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefixes() {
        let ns = Namespaces::with_defaults();
        assert_eq!(
            ns.get_iri("rdf").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        );
        assert_eq!(ns.get_iri("xsd").unwrap(), "http://www.w3.org/2001/XMLSchema#");
        assert!(matches!(ns.get_iri("foo"), Err(PrefixError::UnknownPrefix(_))));
    }

    #[test]
    fn test_base_lifted_from_prefix_map() {
        let ns = Namespaces::from_prefix_map([
            ("@base", "http://example.org/base/"),
            ("ex", "http://example.org/"),
        ]);
        assert_eq!(ns.base.as_deref(), Some("http://example.org/base/"));
        assert!(!ns.contains("@base"));
        assert_eq!(ns.len(), 1);

        let ns = Namespaces::from_prefix_map([("_base", "http://example.org/b/")]);
        assert_eq!(ns.base.as_deref(), Some("http://example.org/b/"));
    }

    #[test]
    fn test_uri_for() {
        let ns = Namespaces::from_prefix_map([("P", "http://example.org/P/")])
            .with_base("http://example.org/base/");

        assert_eq!(ns.uri_for("P:001").unwrap(), "http://example.org/P/001");
        assert_eq!(ns.uri_for("x").unwrap(), "http://example.org/base/x");
        assert_eq!(
            ns.uri_for("https://w3id.org/foo").unwrap(),
            "https://w3id.org/foo"
        );
        assert_eq!(ns.uri_for("urn:isbn:123").unwrap(), "urn:isbn:123");
        assert!(ns.uri_for("bad prefix:x").is_err());
    }

    #[test]
    fn test_uri_for_without_base() {
        let ns = Namespaces::new();
        assert!(matches!(ns.uri_for("local"), Err(PrefixError::InvalidIri(_))));
    }

    #[test]
    fn test_curie_for_longest_match() {
        let mut ns = Namespaces::new();
        ns.add_prefix("ex", "http://example.org/");
        ns.add_prefix("P", "http://example.org/P/");
        ns.add_prefix("Q", "http://example.org/P/");

        assert_eq!(ns.curie_for("http://example.org/P/001").as_deref(), Some("P:001"));
        assert_eq!(ns.curie_for("http://example.org/x").as_deref(), Some("ex:x"));
        assert_eq!(ns.curie_for("http://other.org/x"), None);
        assert_eq!(ns.compact("http://other.org/x"), "http://other.org/x");
    }
}
