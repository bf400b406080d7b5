//! Schema-guided loader
//!
//! Walks the graph from every subject typed with the target class URI. Each visited node
//! becomes a draft object; blank nodes and inlined references are left as pending nodes
//! and replaced by their drafts once the walk is complete.

use super::{literal_value, LoadError, LoadResult};
use crate::model::{Instance, Value};
use crate::rdf::{
    NamedNode, Namespaces, RdfFormat, RdfGraph, RdfObject, RdfParser, RdfPredicate, RdfSubject,
    Triple,
};
use crate::schema::{underscore, ElementKind, SlotDefinition};
use crate::schemaview::{SchemaView, SchemaViewError, Traversal};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Schema-guided loader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdfLoaderConfig {
    /// Skip predicates no slot maps to instead of failing
    #[serde(default)]
    pub ignore_unmapped_predicates: bool,
    /// Accept triples not reachable from any root
    #[serde(default = "default_true")]
    pub allow_unprocessed_triples: bool,
    /// Prefixes that extend or override the schema's when naming identifiers
    #[serde(default)]
    pub prefix_map: IndexMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for RdfLoaderConfig {
    fn default() -> Self {
        Self {
            ignore_unmapped_predicates: false,
            allow_unprocessed_triples: true,
            prefix_map: IndexMap::new(),
        }
    }
}

/// A field value that may still point at an unbuilt node
#[derive(Debug, Clone)]
enum Pending {
    Ready(Value),
    Node(RdfSubject),
}

#[derive(Debug, Clone)]
enum DraftField {
    One(Pending),
    Many(Vec<Pending>),
}

#[derive(Debug, Clone)]
struct Draft {
    class_name: String,
    fields: IndexMap<String, DraftField>,
}

/// Reads instances of schema classes out of an RDF graph
pub struct RdfLoader<'a> {
    view: &'a SchemaView,
    config: RdfLoaderConfig,
}

impl<'a> RdfLoader<'a> {
    pub fn new(view: &'a SchemaView) -> Self {
        Self::with_config(view, RdfLoaderConfig::default())
    }

    pub fn with_config(view: &'a SchemaView, config: RdfLoaderConfig) -> Self {
        Self { view, config }
    }

    /// The single instance of `target_class` in the graph
    pub fn load_graph(&self, graph: &RdfGraph, target_class: &str) -> LoadResult<Instance> {
        let mut instances = self.from_rdf_graph(graph, target_class)?;
        if instances.len() != 1 {
            return Err(LoadError::InstanceCount {
                class: target_class.to_string(),
                found: instances.len(),
            });
        }
        Ok(instances.remove(0))
    }

    pub fn loads(&self, text: &str, format: RdfFormat, target_class: &str) -> LoadResult<Instance> {
        let graph = RdfParser::parse(text, format, None)?;
        self.load_graph(&graph, target_class)
    }

    pub fn load(
        &self,
        path: impl AsRef<Path>,
        format: RdfFormat,
        target_class: &str,
    ) -> LoadResult<Instance> {
        let graph = RdfParser::parse_file(path.as_ref(), format)?;
        self.load_graph(&graph, target_class)
    }

    /// Every instance of `target_class`, one per subject typed with its URI
    pub fn from_rdf_graph(&self, graph: &RdfGraph, target_class: &str) -> LoadResult<Vec<Instance>> {
        let view = self.view;
        let mut namespaces = view.namespaces();
        namespaces.overlay(&Namespaces::from_prefix_map(self.config.prefix_map.iter()));
        let uri_to_class = self.class_uris()?;
        let uri_to_slot = self.slot_uris()?;

        let class_node: RdfObject = NamedNode::new(&view.get_uri(target_class, true)?)?.into();
        let roots: Vec<RdfSubject> = graph
            .subjects_with(&RdfPredicate::rdf_type(), &class_node)
            .cloned()
            .collect();
        debug!("Found {} roots of {}", roots.len(), target_class);

        let rdf_type = RdfPredicate::rdf_type();
        let mut to_visit: Vec<(RdfSubject, String)> = roots
            .iter()
            .rev()
            .map(|root| (root.clone(), target_class.to_string()))
            .collect();
        let mut processed: FxHashSet<RdfSubject> = roots.iter().cloned().collect();
        let mut processed_triples: FxHashSet<Triple> = FxHashSet::default();
        let mut unmapped: Vec<String> = Vec::new();
        let mut drafts: IndexMap<RdfSubject, Draft> = IndexMap::new();

        while let Some((subject, class_name)) = to_visit.pop() {
            processed.insert(subject.clone());
            let mut draft = self.id_draft(&subject, &class_name, &namespaces)?;
            if let Some(designated) = self.designated_class(graph, &subject, &draft.class_name, &uri_to_class, &namespaces)? {
                info!("Replacing {} with {} for {}", draft.class_name, designated, subject);
                draft.class_name = designated;
            }

            for (predicate, object) in graph.predicate_objects(&subject) {
                processed_triples.insert(Triple::new(
                    subject.clone(),
                    predicate.clone(),
                    object.clone(),
                ));
                if *predicate == rdf_type {
                    continue;
                }
                let Some(declared) = uri_to_slot.get(predicate.as_str()) else {
                    if self.config.ignore_unmapped_predicates {
                        if !unmapped.iter().any(|p| p == predicate.as_str()) {
                            unmapped.push(predicate.as_str().to_string());
                        }
                        continue;
                    }
                    return Err(LoadError::UnmappedPredicate(predicate.as_str().to_string()));
                };
                let slot = view.induced_slot(&declared.name, Some(&draft.class_name))?;
                let pending = self.pending_value(&subject, &slot, object, &namespaces)?;

                let key = underscore(&slot.name);
                if slot.is_multivalued() {
                    match draft.fields.get_mut(&key) {
                        Some(DraftField::Many(values)) => values.push(pending),
                        _ => {
                            draft.fields.insert(key, DraftField::Many(vec![pending]));
                        }
                    }
                } else {
                    draft.fields.insert(key, DraftField::One(pending));
                }

                if let Some(next) = RdfSubject::from_object(object) {
                    if !processed.contains(&next) {
                        if let Some(range) = slot.range.as_deref().filter(|r| view.get_class(r, true).is_some()) {
                            to_visit.push((next, range.to_string()));
                        }
                    }
                }
            }
            drafts.insert(subject, draft);
        }

        if !unmapped.is_empty() {
            info!("Unmapped predicates: {:?}", unmapped);
        }
        let unprocessed = graph.len().saturating_sub(processed_triples.len());
        info!(
            "Triples processed = {}, unprocessed = {}",
            processed_triples.len(),
            unprocessed
        );
        if unprocessed > 0 && !self.config.allow_unprocessed_triples {
            for triple in graph.iter().filter(|t| !processed_triples.contains(*t)) {
                warn!("  Unprocessed: {}", triple);
            }
            return Err(LoadError::UnprocessedTriples(unprocessed));
        }

        roots
            .iter()
            .map(|root| build(root, &drafts, &mut Vec::new()))
            .collect()
    }

    /// Expanded class URI to class name; a subclass sharing its parent's URI defers to it
    fn class_uris(&self) -> LoadResult<IndexMap<String, String>> {
        let mut map: IndexMap<String, String> = IndexMap::new();
        for name in self.view.all_classes(Default::default(), true)?.into_keys() {
            let uri = self.view.get_uri(&name, true)?;
            if let Some(existing) = map.get(&uri) {
                if self
                    .view
                    .class_ancestors(&name, Traversal::default())?
                    .contains(existing)
                {
                    continue;
                }
                error!("Inconsistent URI to class map: {} -> {}, {}", uri, existing, name);
            }
            map.insert(uri, name);
        }
        Ok(map)
    }

    fn slot_uris(&self) -> LoadResult<IndexMap<String, SlotDefinition>> {
        let mut map = IndexMap::new();
        for slot in self.view.all_slots(Default::default(), true, true)?.into_values() {
            map.insert(self.view.uri_of(&slot, true, false)?, slot);
        }
        Ok(map)
    }

    /// Draft holding only the identifier, if the class has one
    fn id_draft(
        &self,
        subject: &RdfSubject,
        class_name: &str,
        namespaces: &Namespaces,
    ) -> LoadResult<Draft> {
        let mut draft = Draft {
            class_name: class_name.to_string(),
            fields: IndexMap::new(),
        };
        let id_slot = self.view.get_identifier_slot(class_name, false)?;
        match (subject, id_slot) {
            (RdfSubject::NamedNode(node), Some(slot)) => {
                let id = self.node_id(node, Some(&slot), namespaces)?;
                draft.fields.insert(
                    underscore(&slot.name),
                    DraftField::One(Pending::Ready(Value::String(id))),
                );
            }
            (RdfSubject::BlankNode(node), Some(slot)) => {
                return Err(LoadError::UnexpectedBlankNode {
                    node: node.to_string(),
                    class: class_name.to_string(),
                    slot: slot.name,
                });
            }
            _ => {}
        }
        Ok(draft)
    }

    /// Class named by the subject's type designator slot, if it carries one
    fn designated_class(
        &self,
        graph: &RdfGraph,
        subject: &RdfSubject,
        class_name: &str,
        uri_to_class: &IndexMap<String, String>,
        namespaces: &Namespaces,
    ) -> LoadResult<Option<String>> {
        let Some(designator) = self.view.get_type_designator_slot(class_name)? else {
            return Ok(None);
        };
        let predicate = RdfPredicate::new(&self.view.uri_of(&designator, true, false)?)?;
        let mut classes: Vec<String> = Vec::new();
        for object in graph.objects(subject, &predicate) {
            let text = match object {
                RdfObject::NamedNode(node) => node.as_str().to_string(),
                RdfObject::Literal(literal) => literal.value().to_string(),
                RdfObject::BlankNode(node) => node.to_string(),
            };
            let class = uri_to_class
                .get(&text)
                .or_else(|| {
                    namespaces
                        .uri_for(&text)
                        .ok()
                        .and_then(|uri| uri_to_class.get(&uri))
                })
                .cloned()
                .or_else(|| {
                    self.view
                        .get_class(&text, true)
                        .map(|c| c.name.clone())
                })
                .ok_or_else(|| LoadError::UnknownType(text.clone()))?;
            classes.push(class);
        }
        if classes.len() > 1 {
            return Err(LoadError::AmbiguousType {
                subject: subject.to_string(),
                types: classes,
            });
        }
        Ok(classes.pop())
    }

    fn pending_value(
        &self,
        subject: &RdfSubject,
        slot: &SlotDefinition,
        object: &RdfObject,
        namespaces: &Namespaces,
    ) -> LoadResult<Pending> {
        let view = self.view;
        let ranges = match view.slot_applicable_range_elements(slot) {
            Ok(ranges) => ranges,
            Err(SchemaViewError::NoApplicableRange(_)) => vec![ElementKind::Type],
            Err(e) => return Err(e.into()),
        };
        let inlined = view.is_inlined(slot)?;
        Ok(match object {
            RdfObject::Literal(literal) => {
                if ranges.contains(&ElementKind::Enum) {
                    debug!("Assuming no meaning assigned for {} of {}", literal, slot.name);
                } else if !ranges.contains(&ElementKind::Type) {
                    return Err(LoadError::InvalidLiteral {
                        value: literal.value().to_string(),
                        target: slot.range.clone().unwrap_or_default(),
                    });
                }
                Pending::Ready(literal_value(literal)?)
            }
            RdfObject::BlankNode(node) => {
                if !inlined {
                    error!(
                        "Blank nodes should be inlined; {}={} in {}",
                        slot.name, node, subject
                    );
                }
                Pending::Node(node.clone().into())
            }
            RdfObject::NamedNode(node) if inlined => Pending::Node(node.clone().into()),
            RdfObject::NamedNode(node) => {
                let class_range = slot
                    .range
                    .as_deref()
                    .filter(|r| view.get_class(r, true).is_some());
                let text = if ranges.contains(&ElementKind::Class) {
                    match class_range {
                        Some(range) => {
                            let id_slot = view.get_identifier_slot(range, false)?;
                            self.node_id(node, id_slot.as_ref(), namespaces)?
                        }
                        None => namespaces.compact(node.as_str()),
                    }
                } else if ranges.contains(&ElementKind::Enum) {
                    self.enum_text(slot, node, namespaces)
                } else {
                    namespaces.compact(node.as_str())
                };
                Pending::Ready(Value::String(text))
            }
        })
    }

    /// Identifier value for a node: percent-decoded relative to the base, or a CURIE
    fn node_id(
        &self,
        node: &NamedNode,
        id_slot: Option<&SlotDefinition>,
        namespaces: &Namespaces,
    ) -> LoadResult<String> {
        let percent_encoded = match id_slot {
            Some(slot) => self.view.is_slot_percent_encoded(slot)?,
            None => false,
        };
        if !percent_encoded {
            return Ok(namespaces.compact(node.as_str()));
        }
        let decoded = percent_decode_str(node.as_str()).decode_utf8_lossy();
        Ok(match &namespaces.base {
            Some(base) => decoded.replace(base.as_str(), ""),
            None => decoded.into_owned(),
        })
    }

    /// Permissible value text whose meaning names the node, else the node as a CURIE
    fn enum_text(&self, slot: &SlotDefinition, node: &NamedNode, namespaces: &Namespaces) -> String {
        let curie = namespaces.curie_for(node.as_str());
        for enum_name in self.view.slot_range_as_union(slot) {
            let Some(e) = self.view.get_enum(&enum_name, true) else {
                continue;
            };
            for pv in e.permissible_values.values() {
                let Some(meaning) = &pv.meaning else {
                    continue;
                };
                if curie.as_deref() == Some(meaning.as_str())
                    || meaning == node.as_str()
                    || self.view.expand_curie(meaning) == node.as_str()
                {
                    return pv.text.clone();
                }
            }
        }
        curie.unwrap_or_else(|| node.as_str().to_string())
    }
}

/// Replace pending nodes with their drafts; a node already on the path stays a reference
fn build(
    subject: &RdfSubject,
    drafts: &IndexMap<RdfSubject, Draft>,
    path: &mut Vec<RdfSubject>,
) -> LoadResult<Instance> {
    let draft = drafts
        .get(subject)
        .ok_or_else(|| LoadError::UnresolvedNode(subject.to_string()))?;
    path.push(subject.clone());
    let mut instance = Instance::new(draft.class_name.clone());
    for (name, field) in &draft.fields {
        let value = match field {
            DraftField::One(pending) => resolve(pending, drafts, path)?,
            DraftField::Many(values) => Value::List(
                values
                    .iter()
                    .map(|pending| resolve(pending, drafts, path))
                    .collect::<LoadResult<Vec<_>>>()?,
            ),
        };
        instance.set(name.clone(), value);
    }
    path.pop();
    Ok(instance)
}

fn resolve(
    pending: &Pending,
    drafts: &IndexMap<RdfSubject, Draft>,
    path: &mut Vec<RdfSubject>,
) -> LoadResult<Value> {
    match pending {
        Pending::Ready(value) => Ok(value.clone()),
        Pending::Node(node) if path.contains(node) => {
            warn!("Cycle through {}, keeping it as a reference", node);
            Ok(Value::String(node.to_string()))
        }
        Pending::Node(node) => Ok(Value::from(build(node, drafts, path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dumper::RdfDumper;

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
  safe id:
    typeof: string
    annotations:
      percent_encoded: true
slots:
  id:
    identifier: true
  code:
    identifier: true
    range: safe id
  name:
    slot_uri: schema:name
  age:
    range: integer
  severity:
    range: Severity
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
    slots: [id, name, age, severity, aliases, address, friend]
  Address:
    slots: [street]
  Thing:
    slots: [id, kind]
  Gadget:
    is_a: Thing
  Label:
    slots: [code, name]
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

    #[test]
    fn test_roundtrip_through_dumper() {
        let view = view();
        let person = Instance::new("Person")
            .with("id", "P:001")
            .with("name", "Alice")
            .with("age", 33)
            .with("severity", "ERROR")
            .with("aliases", vec!["Al", "Ally"])
            .with("address", Instance::new("Address").with("street", "1 Main St"))
            .with("friend", "P:002");
        let graph = RdfDumper::new(&view).as_rdf_graph(&person).unwrap();

        let loaded = RdfLoader::new(&view).load_graph(&graph, "Person").unwrap();
        assert_eq!(loaded.get_str("id"), Some("P:001"));
        assert_eq!(loaded.get_str("name"), Some("Alice"));
        assert_eq!(loaded.get("age"), Some(&Value::Integer(33)));
        assert_eq!(loaded.get_str("severity"), Some("ERROR"));
        assert_eq!(loaded.get("aliases"), Some(&Value::from(vec!["Al", "Ally"])));
        assert_eq!(loaded.get_str("friend"), Some("P:002"));
        let address = loaded.get("address").unwrap().as_object().unwrap();
        assert_eq!(address.get_str("street"), Some("1 Main St"));
    }

    #[test]
    fn test_every_root_is_returned() {
        let text = r#"
@prefix schema: <http://schema.org/> .
<http://example.org/P/001> a schema:Person ; schema:name "Alice" .
<http://example.org/P/002> a schema:Person ; schema:name "Bob" .
"#;
        let graph = RdfParser::parse(text, RdfFormat::Turtle, None).unwrap();
        let view = view();
        let loader = RdfLoader::new(&view);
        let people = loader.from_rdf_graph(&graph, "Person").unwrap();
        let ids: Vec<&str> = people.iter().filter_map(|p| p.get_str("id")).collect();
        assert_eq!(ids, vec!["P:001", "P:002"]);
        assert!(matches!(
            loader.load_graph(&graph, "Person"),
            Err(LoadError::InstanceCount { found: 2, .. })
        ));
    }

    #[test]
    fn test_unmapped_and_unprocessed_triples() {
        let text = r#"
@prefix schema: <http://schema.org/> .
<http://example.org/P/001> a schema:Person ; schema:email "a@example.org" .
<http://example.org/other> schema:name "stray" .
"#;
        let view = view();
        assert!(matches!(
            RdfLoader::new(&view).loads(text, RdfFormat::Turtle, "Person"),
            Err(LoadError::UnmappedPredicate(p)) if p == "http://schema.org/email"
        ));

        let lenient = RdfLoaderConfig {
            ignore_unmapped_predicates: true,
            ..Default::default()
        };
        let person = RdfLoader::with_config(&view, lenient.clone())
            .loads(text, RdfFormat::Turtle, "Person")
            .unwrap();
        assert_eq!(person.get_str("id"), Some("P:001"));

        let strict = RdfLoaderConfig {
            allow_unprocessed_triples: false,
            ..lenient
        };
        assert!(matches!(
            RdfLoader::with_config(&view, strict).loads(text, RdfFormat::Turtle, "Person"),
            Err(LoadError::UnprocessedTriples(1))
        ));
    }

    #[test]
    fn test_type_designator_switches_class() {
        let text = r#"
@prefix personinfo: <https://w3id.org/example/personinfo/> .
<http://example.org/P/009> a personinfo:Thing ;
    personinfo:kind <https://w3id.org/example/personinfo/Gadget> .
"#;
        let view = view();
        let thing = RdfLoader::new(&view)
            .loads(text, RdfFormat::Turtle, "Thing")
            .unwrap();
        assert_eq!(thing.class_name, "Gadget");

        let ambiguous = r#"
@prefix personinfo: <https://w3id.org/example/personinfo/> .
<http://example.org/P/009> a personinfo:Thing ;
    personinfo:kind personinfo:Gadget, personinfo:Thing .
"#;
        assert!(matches!(
            RdfLoader::new(&view).loads(ambiguous, RdfFormat::Turtle, "Thing"),
            Err(LoadError::AmbiguousType { .. })
        ));
    }

    #[test]
    fn test_percent_encoded_identifier() {
        let text = r#"
@base <https://w3id.org/example/personinfo/> .
@prefix personinfo: <https://w3id.org/example/personinfo/> .
<https://w3id.org/example/personinfo/a%20b> a personinfo:Label .
"#;
        let view = view();
        let mut config = RdfLoaderConfig::default();
        config
            .prefix_map
            .insert("_base".to_string(), "https://w3id.org/example/personinfo/".to_string());
        let label = RdfLoader::with_config(&view, config)
            .loads(text, RdfFormat::Turtle, "Label")
            .unwrap();
        assert_eq!(label.get_str("code"), Some("a b"));
    }

    #[test]
    fn test_blank_node_for_identified_class() {
        let text = r#"
@prefix schema: <http://schema.org/> .
[] a schema:Person ; schema:name "Nobody" .
"#;
        let view = view();
        assert!(matches!(
            RdfLoader::new(&view).loads(text, RdfFormat::Turtle, "Person"),
            Err(LoadError::UnexpectedBlankNode { .. })
        ));
    }
}
