//! Turtle format implementation, plus the rio term conversions shared with N-Triples

use super::{ParseError, ParseResult, SerializeResult};
use crate::rdf::{BlankNode, Literal, NamedNode, RdfGraph, RdfObject, RdfPredicate, RdfSubject, Triple};
use oxiri::Iri;
use rio_api::formatter::TriplesFormatter;
use rio_api::model;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io::Write;

/// Parse Turtle text into a graph, binding the prefixes it declares
pub(super) fn parse(input: &str, base: Option<&str>) -> ParseResult<RdfGraph> {
    let base_iri = match base {
        Some(b) => Some(
            Iri::parse(b.to_string()).map_err(|e| ParseError::Parse(format!("{}: {}", b, e)))?,
        ),
        None => None,
    };
    let mut parser = TurtleParser::new(input.as_bytes(), base_iri);
    let mut graph = RdfGraph::new();

    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        graph.insert(from_rio(&t)?);
        Ok(())
    })?;

    let mut prefixes: Vec<(&String, &String)> = parser.prefixes().iter().collect();
    prefixes.sort();
    for (prefix, iri) in prefixes {
        graph.bind(prefix.clone(), iri.clone());
    }
    if let Some(b) = base {
        graph.namespaces_mut().base = Some(b.to_string());
    }
    Ok(graph)
}

/// Serialize a graph as Turtle with `@prefix` declarations for its bound namespaces
pub(super) fn serialize(graph: &RdfGraph) -> SerializeResult<String> {
    let mut output = Vec::new();
    for (prefix, iri) in graph.namespaces().iter() {
        writeln!(output, "@prefix {}: <{}> .", prefix, iri)?;
    }
    if !graph.namespaces().is_empty() {
        writeln!(output)?;
    }

    let mut formatter = TurtleFormatter::new(output);
    for triple in graph.iter() {
        format_triple(&mut formatter, triple)?;
    }
    let output = formatter.finish()?;

    String::from_utf8(output).map_err(|e| super::SerializeError::Serialize(e.to_string()))
}

/// Hand one triple to a rio formatter
pub(super) fn format_triple<F>(formatter: &mut F, triple: &Triple) -> Result<(), F::Error>
where
    F: TriplesFormatter,
{
    let datatype = triple.object.as_literal().map(Literal::datatype);
    let subject = match &triple.subject {
        RdfSubject::NamedNode(n) => model::Subject::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfSubject::BlankNode(b) => model::Subject::BlankNode(model::BlankNode { id: b.as_str() }),
    };
    let object = match &triple.object {
        RdfObject::NamedNode(n) => model::Term::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfObject::BlankNode(b) => model::Term::BlankNode(model::BlankNode { id: b.as_str() }),
        RdfObject::Literal(l) => model::Term::Literal(match (l.language(), &datatype) {
            (Some(language), _) => model::Literal::LanguageTaggedString {
                value: l.value(),
                language,
            },
            (None, Some(dt)) if !l.is_plain() => model::Literal::Typed {
                value: l.value(),
                datatype: model::NamedNode { iri: dt.as_str() },
            },
            _ => model::Literal::Simple { value: l.value() },
        }),
    };

    formatter.format(&model::Triple {
        subject,
        predicate: model::NamedNode {
            iri: triple.predicate.as_str(),
        },
        object,
    })
}

/// Convert a parsed rio triple
pub(super) fn from_rio(t: &model::Triple<'_>) -> ParseResult<Triple> {
    let subject = match t.subject {
        model::Subject::NamedNode(n) => RdfSubject::NamedNode(named_node(n)?),
        model::Subject::BlankNode(b) => RdfSubject::BlankNode(blank_node(b)?),
        _ => return Err(ParseError::Parse("Unsupported subject type".to_string())),
    };
    let predicate = RdfPredicate::from(named_node(t.predicate)?);
    let object = match t.object {
        model::Term::NamedNode(n) => RdfObject::NamedNode(named_node(n)?),
        model::Term::BlankNode(b) => RdfObject::BlankNode(blank_node(b)?),
        model::Term::Literal(model::Literal::Simple { value }) => {
            RdfObject::Literal(Literal::new_simple_literal(value))
        }
        model::Term::Literal(model::Literal::LanguageTaggedString { value, language }) => {
            RdfObject::Literal(
                Literal::new_language_tagged_literal(value, language)
                    .map_err(|e| ParseError::Parse(e.to_string()))?,
            )
        }
        model::Term::Literal(model::Literal::Typed { value, datatype }) => {
            RdfObject::Literal(Literal::new_typed_literal(value, named_node(datatype)?))
        }
        _ => return Err(ParseError::Parse("Unsupported object type".to_string())),
    };
    Ok(Triple::new(subject, predicate, object))
}

fn named_node(n: model::NamedNode<'_>) -> ParseResult<NamedNode> {
    NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn blank_node(b: model::BlankNode<'_>) -> ParseResult<BlankNode> {
    BlankNode::from_str(b.id).map_err(|e| ParseError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON_TTL: &str = r#"
@prefix schema: <http://schema.org/> .
@prefix P: <http://example.org/P/> .

P:001 a schema:Person ;
    schema:name "Alice Smith" ;
    schema:age 33 ;
    schema:alternateName "Ally"@en, "Alicia"@es .
"#;

    #[test]
    fn test_parse_binds_prefixes() {
        let graph = parse(PERSON_TTL, None).unwrap();
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.namespaces().get_iri("schema").unwrap(), "http://schema.org/");
        assert_eq!(graph.namespaces().get_iri("P").unwrap(), "http://example.org/P/");
    }

    #[test]
    fn test_typed_literal_survives() {
        let graph = parse(PERSON_TTL, None).unwrap();
        let age = graph
            .iter()
            .find(|t| t.predicate.as_str() == "http://schema.org/age")
            .unwrap();
        let lit = age.object.as_literal().unwrap();
        assert_eq!(lit.value(), "33");
        assert_eq!(lit.datatype().as_str(), "http://www.w3.org/2001/XMLSchema#integer");
    }

    #[test]
    fn test_relative_iri_with_base() {
        let graph = parse("<a> <b> <c> .", Some("http://example.org/")).unwrap();
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.subject.to_string(), "<http://example.org/a>");
    }

    #[test]
    fn test_serialize_reparses() {
        let graph = parse(PERSON_TTL, None).unwrap();
        let text = serialize(&graph).unwrap();
        assert!(text.starts_with("@prefix"));
        assert!(text.contains("\"Alicia\"@es"));

        let reparsed = parse(&text, None).unwrap();
        assert_eq!(reparsed.len(), graph.len());
        for triple in graph.iter() {
            assert!(reparsed.contains(triple));
        }
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse("<a> <b>", None), Err(ParseError::Turtle(_)) | Err(ParseError::Parse(_))));
    }
}
