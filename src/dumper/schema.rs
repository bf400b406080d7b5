//! Schema-guided dumper

use super::{effective_namespaces, identifier_node, DumpError, DumpResult, DumperConfig};
use crate::model::{Instance, Value};
use crate::rdf::{
    BlankNode, Literal, NamedNode, Namespaces, RdfGraph, RdfObject, RdfPredicate, RdfSerializer,
    RdfSubject,
};
use crate::schema::{underscore, ElementRef, SlotDefinition};
use crate::schemaview::SchemaView;
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Writes instances as RDF following the slots, types and enums of a schema view
pub struct RdfDumper<'a> {
    view: &'a SchemaView,
    config: DumperConfig,
}

/// State shared across one projection
struct Projection {
    graph: RdfGraph,
    namespaces: Namespaces,
    /// Code-safe field name to slot
    slot_names: IndexMap<String, SlotDefinition>,
}

impl<'a> RdfDumper<'a> {
    pub fn new(view: &'a SchemaView) -> Self {
        Self::with_config(view, DumperConfig::default())
    }

    pub fn with_config(view: &'a SchemaView, config: DumperConfig) -> Self {
        Self { view, config }
    }

    /// Project an instance into a fresh graph bound to the schema's prefixes
    pub fn as_rdf_graph(&self, instance: &Instance) -> DumpResult<RdfGraph> {
        let namespaces = effective_namespaces(self.view.namespaces(), &self.config);
        let mut projection = Projection {
            graph: RdfGraph::with_namespaces(namespaces.clone()),
            namespaces,
            slot_names: self.view.slot_name_mappings()?,
        };
        self.project_object(&mut projection, instance)?;
        debug!(
            "Projected {} into {} triples",
            instance.class_name,
            projection.graph.len()
        );
        Ok(projection.graph)
    }

    /// Serialize an instance in the configured format
    pub fn dumps(&self, instance: &Instance) -> DumpResult<String> {
        let graph = self.as_rdf_graph(instance)?;
        Ok(RdfSerializer::serialize(&graph, self.config.format)?)
    }

    pub fn dump(&self, instance: &Instance, path: impl AsRef<Path>) -> DumpResult<()> {
        let graph = self.as_rdf_graph(instance)?;
        RdfSerializer::serialize_file(&graph, path.as_ref(), self.config.format)?;
        info!("Dumped {} to {}", instance.class_name, path.as_ref().display());
        Ok(())
    }

    /// Project one value as an instance of `target`; `None` means the value is skipped
    fn project(
        &self,
        projection: &mut Projection,
        value: &Value,
        target: Option<&str>,
    ) -> DumpResult<Option<RdfObject>> {
        match target.and_then(|t| self.view.resolve(t, true)) {
            Some(ElementRef::Enum(name)) => self.project_enum(value, &name),
            Some(ElementRef::Type(name)) => self.project_type(projection, value, &name).map(Some),
            _ => match value {
                Value::Object(instance) if instance.has_values() => {
                    self.project_object(projection, instance).map(Some)
                }
                Value::Object(instance) => {
                    warn!("Skipping empty {} value", instance.class_name);
                    Ok(None)
                }
                other => self
                    .project_reference(projection, other, target)
                    .map(|node| Some(node.into())),
            },
        }
    }

    fn project_enum(&self, value: &Value, enum_name: &str) -> DumpResult<Option<RdfObject>> {
        let text = value.as_str().ok_or_else(|| DumpError::InvalidValue {
            value: value.to_string(),
            target: enum_name.to_string(),
        })?;
        let e = self.view.require_enum(enum_name, true)?;
        let Some(pv) = e.permissible_values.get(text) else {
            error!("{} is not a permissible value of {}", text, enum_name);
            return Ok(None);
        };
        Ok(Some(match &pv.meaning {
            Some(meaning) => NamedNode::new(&self.view.expand_curie(meaning))?.into(),
            None => Literal::new_simple_literal(pv.text.clone()).into(),
        }))
    }

    fn project_type(
        &self,
        projection: &Projection,
        value: &Value,
        type_name: &str,
    ) -> DumpResult<RdfObject> {
        let lexical = value.lexical().ok_or_else(|| DumpError::InvalidValue {
            value: value.to_string(),
            target: type_name.to_string(),
        })?;
        if let Value::LangString { language, .. } = value {
            return Ok(Literal::new_language_tagged_literal(lexical, language.clone())?.into());
        }
        let t = self.view.induced_type(type_name)?;
        Ok(match t.uri.as_deref() {
            Some("rdfs:Resource") => NamedNode::new(&self.view.expand_curie(&lexical))?.into(),
            Some("xsd:string") => Literal::new_simple_literal(lexical).into(),
            Some(uri) => {
                let datatype = NamedNode::new(&projection.namespaces.uri_for(uri)?)?;
                Literal::new_typed_literal(lexical, datatype).into()
            }
            None => {
                warn!("No datatype specified for {}, using plain literal", type_name);
                Literal::new_simple_literal(lexical).into()
            }
        })
    }

    /// A value with no fields of its own stands for the identifier of an object
    fn project_reference(
        &self,
        projection: &Projection,
        value: &Value,
        target: Option<&str>,
    ) -> DumpResult<NamedNode> {
        let id = value.as_str().ok_or_else(|| DumpError::InvalidValue {
            value: value.to_string(),
            target: target.unwrap_or("object").to_string(),
        })?;
        let id_slot = match target {
            Some(class) => self.view.get_identifier_slot(class, false)?,
            None => None,
        };
        self.identifier(projection, id, id_slot.as_ref())
    }

    fn identifier(
        &self,
        projection: &Projection,
        id: &str,
        id_slot: Option<&SlotDefinition>,
    ) -> DumpResult<NamedNode> {
        let percent_encoded = match id_slot {
            Some(slot) => self.view.is_slot_percent_encoded(slot)?,
            None => false,
        };
        identifier_node(id, percent_encoded, &projection.namespaces)
    }

    fn project_object(
        &self,
        projection: &mut Projection,
        instance: &Instance,
    ) -> DumpResult<RdfObject> {
        let class_name = instance.class_name.as_str();
        let subject: RdfSubject = match self.view.get_identifier_slot(class_name, false)? {
            Some(id_slot) => {
                let id = instance
                    .get_str(&underscore(&id_slot.name))
                    .ok_or_else(|| DumpError::MissingIdentifier {
                        class: class_name.to_string(),
                        slot: id_slot.name.clone(),
                    })?;
                self.identifier(projection, id, Some(&id_slot))?.into()
            }
            None => BlankNode::new().into(),
        };

        let mut type_added = false;
        for (field, value) in &instance.fields {
            let slot_name = self.slot_name(projection, field);
            let slot = match self.view.induced_slot(&slot_name, Some(class_name)) {
                Ok(slot) => slot,
                Err(e) => {
                    warn!("Skipping {}.{}: {}", class_name, field, e);
                    continue;
                }
            };
            if slot.is_identifier() {
                continue;
            }
            let predicate = RdfPredicate::new(&self.view.uri_of(&slot, true, false)?)?;
            for v in value.clone().into_values() {
                if v.is_null() {
                    continue;
                }
                let Some(object) = self.project(projection, &v, slot.range.as_deref())? else {
                    continue;
                };
                projection
                    .graph
                    .add(subject.clone(), predicate.clone(), object);
                if slot.designates_type() {
                    type_added = true;
                }
            }
        }

        if !type_added {
            let class_uri = NamedNode::new(&self.view.get_uri(class_name, true)?)?;
            projection
                .graph
                .add(subject.clone(), RdfPredicate::rdf_type(), class_uri);
        }
        Ok(subject.to_object())
    }

    fn slot_name(&self, projection: &Projection, field: &str) -> String {
        match projection.slot_names.get(field) {
            Some(slot) => slot.name.clone(),
            None => {
                error!("Slot {} not in name map", field);
                field.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::RdfFormat;

    const PERSONINFO: &str = r#"
id: https://w3id.org/example/personinfo
name: personinfo
default_prefix: personinfo
prefixes:
  personinfo: https://w3id.org/example/personinfo/
  schema: http://schema.org/
  P: http://example.org/P/
  sh: http://www.w3.org/ns/shacl#
imports:
  - linkml:types
default_range: string
types:
  resource:
    typeof: string
    uri: rdfs:Resource
slots:
  id:
    identifier: true
  name:
    slot_uri: schema:name
  age:
    range: integer
    slot_uri: schema:age
  severity:
    range: Severity
  homepage:
    range: resource
  aliases:
    multivalued: true
  address:
    range: Address
  street: {}
  friend:
    range: Person
  kind:
    designates_type: true
    range: uriorcurie
classes:
  Person:
    class_uri: schema:Person
    slots: [id, name, age, severity, homepage, aliases, address, friend]
  Address:
    slots: [street]
  Typed:
    slots: [id, kind]
enums:
  Severity:
    permissible_values:
      ERROR:
        meaning: sh:Violation
      NOTE: {}
"#;

    fn view() -> SchemaView {
        SchemaView::from_yaml(PERSONINFO).unwrap()
    }

    fn objects(graph: &RdfGraph, subject: &str, predicate: &str) -> Vec<RdfObject> {
        let subject: RdfSubject = NamedNode::new(subject).unwrap().into();
        let predicate = RdfPredicate::new(predicate).unwrap();
        graph.objects(&subject, &predicate).cloned().collect()
    }

    #[test]
    fn test_dump_person() {
        let view = view();
        let person = Instance::new("Person")
            .with("id", "P:001")
            .with("name", "Alice")
            .with("age", 33)
            .with("severity", "ERROR")
            .with("aliases", vec!["Al", "Ally"])
            .with("homepage", "schema:alice");
        let graph = RdfDumper::new(&view).as_rdf_graph(&person).unwrap();

        let p001 = "http://example.org/P/001";
        assert_eq!(
            objects(&graph, p001, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            vec![RdfObject::from(NamedNode::new("http://schema.org/Person").unwrap())]
        );
        assert_eq!(
            objects(&graph, p001, "http://schema.org/name"),
            vec![RdfObject::from(Literal::new_simple_literal("Alice"))]
        );
        let age = objects(&graph, p001, "http://schema.org/age");
        assert_eq!(
            age[0].as_literal().unwrap().datatype().as_str(),
            "http://www.w3.org/2001/XMLSchema#integer"
        );
        assert_eq!(
            objects(&graph, p001, "https://w3id.org/example/personinfo/severity"),
            vec![RdfObject::from(
                NamedNode::new("http://www.w3.org/ns/shacl#Violation").unwrap()
            )]
        );
        assert_eq!(
            objects(&graph, p001, "https://w3id.org/example/personinfo/aliases").len(),
            2
        );
        assert!(objects(&graph, p001, "https://w3id.org/example/personinfo/homepage")[0]
            .is_named_node());
        assert!(objects(&graph, p001, "https://w3id.org/example/personinfo/id").is_empty());
    }

    #[test]
    fn test_nested_objects_and_references() {
        let view = view();
        let person = Instance::new("Person")
            .with("id", "P:001")
            .with("address", Instance::new("Address").with("street", "1 Main St"))
            .with("friend", "P:002");
        let graph = RdfDumper::new(&view).as_rdf_graph(&person).unwrap();

        let p001 = "http://example.org/P/001";
        let address = objects(&graph, p001, "https://w3id.org/example/personinfo/address");
        assert!(address[0].is_blank_node());
        let address = RdfSubject::from_object(&address[0]).unwrap();
        assert_eq!(graph.predicate_objects(&address).count(), 2);

        assert_eq!(
            objects(&graph, p001, "https://w3id.org/example/personinfo/friend"),
            vec![RdfObject::from(NamedNode::new("http://example.org/P/002").unwrap())]
        );
    }

    #[test]
    fn test_empty_nested_object_is_skipped() {
        let view = view();
        let person = Instance::new("Person")
            .with("id", "P:001")
            .with("address", Instance::new("Address"));
        let graph = RdfDumper::new(&view).as_rdf_graph(&person).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(objects(
            &graph,
            "http://example.org/P/001",
            "https://w3id.org/example/personinfo/address"
        )
        .is_empty());
    }

    #[test]
    fn test_unknown_permissible_value_is_skipped() {
        let view = view();
        let person = Instance::new("Person")
            .with("id", "P:001")
            .with("severity", "FATAL")
            .with("nickname", "Ali");
        let graph = RdfDumper::new(&view).as_rdf_graph(&person).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_designates_type_suppresses_rdf_type() {
        let view = view();
        let typed = Instance::new("Typed")
            .with("id", "P:003")
            .with("kind", "schema:Thing");
        let graph = RdfDumper::new(&view).as_rdf_graph(&typed).unwrap();
        let p003 = "http://example.org/P/003";
        assert!(objects(&graph, p003, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type").is_empty());
        assert_eq!(graph.len(), 1);

        let untyped = Instance::new("Typed").with("id", "P:003");
        let graph = RdfDumper::new(&view).as_rdf_graph(&untyped).unwrap();
        assert_eq!(
            objects(&graph, p003, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            vec![RdfObject::from(
                NamedNode::new("https://w3id.org/example/personinfo/Typed").unwrap()
            )]
        );
    }

    #[test]
    fn test_missing_identifier() {
        let view = view();
        let result = RdfDumper::new(&view).as_rdf_graph(&Instance::new("Person").with("name", "x"));
        assert!(matches!(result, Err(DumpError::MissingIdentifier { .. })));
    }

    #[test]
    fn test_dumps_with_prefix_map() {
        let view = view();
        let config = DumperConfig::new()
            .with_prefix_map([("ex", "http://example.org/ex/")])
            .with_format(RdfFormat::Turtle);
        let text = RdfDumper::with_config(&view, config)
            .dumps(&Instance::new("Person").with("id", "P:001"))
            .unwrap();
        assert!(text.contains("@prefix ex: <http://example.org/ex/> ."));
        assert!(text.contains("<http://schema.org/Person>"));
    }
}
