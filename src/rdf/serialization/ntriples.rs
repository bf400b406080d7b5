//! N-Triples format implementation

use super::turtle::{format_triple, from_rio};
use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::RdfGraph;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser};

pub(super) fn parse(input: &str) -> ParseResult<RdfGraph> {
    let mut parser = NTriplesParser::new(input.as_bytes());
    let mut graph = RdfGraph::new();
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        graph.insert(from_rio(&t)?);
        Ok(())
    })?;
    Ok(graph)
}

pub(super) fn serialize(graph: &RdfGraph) -> SerializeResult<String> {
    let mut formatter = NTriplesFormatter::new(Vec::new());
    for triple in graph.iter() {
        format_triple(&mut formatter, triple)?;
    }
    let output = formatter.finish()?;
    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}
