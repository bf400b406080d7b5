//! JSON-LD format implementation (expanded form, serialize only)

use super::{SerializeError, SerializeResult};
use crate::rdf::{RdfGraph, RdfObject, RdfSubject};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

fn node_id(subject: &RdfSubject) -> String {
    match subject {
        RdfSubject::NamedNode(n) => n.as_str().to_string(),
        RdfSubject::BlankNode(b) => format!("_:{}", b.as_str()),
    }
}

fn object_value(object: &RdfObject) -> Value {
    match object {
        RdfObject::NamedNode(n) => json!({ "@id": n.as_str() }),
        RdfObject::BlankNode(b) => json!({ "@id": format!("_:{}", b.as_str()) }),
        RdfObject::Literal(l) => match l.language() {
            Some(lang) => json!({ "@value": l.value(), "@language": lang }),
            None if l.is_plain() => json!({ "@value": l.value() }),
            None => json!({ "@value": l.value(), "@type": l.datatype().as_str() }),
        },
    }
}

/// One node object per subject, in first-seen order
pub(super) fn serialize(graph: &RdfGraph) -> SerializeResult<String> {
    let mut nodes: IndexMap<String, Map<String, Value>> = IndexMap::new();

    for triple in graph.iter() {
        let node = nodes.entry(node_id(&triple.subject)).or_default();
        if triple.predicate.as_str() == oxrdf::vocab::rdf::TYPE.as_str() {
            if let Some(class) = triple.object.as_named_node() {
                push(node, "@type", Value::String(class.as_str().to_string()));
                continue;
            }
        }
        push(node, triple.predicate.as_str(), object_value(&triple.object));
    }

    let output: Vec<Value> = nodes
        .into_iter()
        .map(|(id, mut props)| {
            let mut node = Map::new();
            node.insert("@id".to_string(), Value::String(id));
            node.append(&mut props);
            Value::Object(node)
        })
        .collect();

    serde_json::to_string_pretty(&output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

fn push(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => items.push(value),
        other => *other = Value::Array(vec![other.take(), value]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Literal, NamedNode, RdfPredicate};

    #[test]
    fn test_jsonld_serialization() {
        let mut graph = RdfGraph::new();
        let alice = NamedNode::new("http://example.org/alice").unwrap();
        let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
        let person = NamedNode::new("http://xmlns.com/foaf/0.1/Person").unwrap();
        graph.add(alice.clone(), RdfPredicate::rdf_type(), person);
        graph.add(alice, name, Literal::new_simple_literal("Alice"));

        let text = serialize(&graph).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let node = &parsed[0];
        assert_eq!(node["@id"], "http://example.org/alice");
        assert_eq!(node["@type"][0], "http://xmlns.com/foaf/0.1/Person");
        assert_eq!(node["http://xmlns.com/foaf/0.1/name"][0]["@value"], "Alice");
    }
}
