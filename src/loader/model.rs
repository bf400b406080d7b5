//! Loader driven by embedded model metadata

use super::{literal_value, select_language, LoadError, LoadResult, LoaderConfig};
use crate::model::{expand, ClassMeta, FieldDescriptor, FieldKind, Instance, ModelModule, RdfModel, Value};
use crate::rdf::{
    NamedNode, Namespaces, RdfFormat, RdfGraph, RdfObject, RdfParser, RdfPredicate, RdfSubject,
};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::mem;
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads one instance of a model class out of an RDF graph
#[derive(Debug, Clone, Default)]
pub struct ModelRdfLoader {
    config: LoaderConfig,
}

impl ModelRdfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Reconstruct the instance of `class_name` rooted in `graph`
    pub fn load_graph(
        &self,
        graph: &RdfGraph,
        module: &ModelModule,
        class_name: &str,
    ) -> LoadResult<Instance> {
        let namespaces = self.namespaces(module);
        let class = module.class(class_name)?;
        let root = find_root(graph, class, &namespaces)?;
        debug!("Loading {} from root {}", class_name, root);
        self.reconstruct(graph, &namespaces, module, class_name, &root, &mut Vec::new())
    }

    pub fn loads(
        &self,
        text: &str,
        format: RdfFormat,
        module: &ModelModule,
        class_name: &str,
    ) -> LoadResult<Instance> {
        let graph = RdfParser::parse(text, format, None)?;
        self.load_graph(&graph, module, class_name)
    }

    pub fn load(
        &self,
        path: impl AsRef<Path>,
        format: RdfFormat,
        module: &ModelModule,
        class_name: &str,
    ) -> LoadResult<Instance> {
        let graph = RdfParser::parse_file(path.as_ref(), format)?;
        info!(
            "Loaded {} triples from {}",
            graph.len(),
            path.as_ref().display()
        );
        self.load_graph(&graph, module, class_name)
    }

    /// Reconstruct a typed model object
    pub fn load_model<T: RdfModel>(&self, graph: &RdfGraph) -> LoadResult<T> {
        let instance = self.load_graph(graph, T::module(), T::CLASS_NAME)?;
        Ok(T::from_instance(instance)?)
    }

    pub fn loads_model<T: RdfModel>(&self, text: &str, format: RdfFormat) -> LoadResult<T> {
        let graph = RdfParser::parse(text, format, None)?;
        self.load_model(&graph)
    }

    fn namespaces(&self, module: &ModelModule) -> Namespaces {
        let mut namespaces = module.namespaces();
        namespaces.overlay(&Namespaces::from_prefix_map(self.config.prefix_map.iter()));
        namespaces
    }

    fn reconstruct(
        &self,
        graph: &RdfGraph,
        namespaces: &Namespaces,
        module: &ModelModule,
        class_name: &str,
        subject: &RdfSubject,
        path: &mut Vec<RdfSubject>,
    ) -> LoadResult<Instance> {
        let class = module.class(class_name)?;
        path.push(subject.clone());
        let default_schema = class.from_schema.as_deref().unwrap_or(&module.id);
        let rdf_type = RdfPredicate::rdf_type();

        let mut fields: IndexMap<String, Value> = IndexMap::new();
        if let (RdfSubject::NamedNode(node), Some(id_field)) = (subject, class.identifier()) {
            fields.insert(id_field.name.clone(), Value::String(namespaces.compact(node.as_str())));
        }

        for (predicate, object) in graph.predicate_objects(subject) {
            if *predicate == rdf_type {
                continue;
            }
            let Some(field) = field_for_predicate(class, predicate.as_str(), namespaces, default_schema)
            else {
                debug!("No field of {} for predicate {}", class.name, predicate);
                continue;
            };
            let value = self.convert(graph, namespaces, module, field, object, path)?;
            match fields.entry(field.name.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
                Entry::Occupied(mut entry) => match entry.get_mut() {
                    Value::List(items) => items.push(value),
                    existing => {
                        let first = mem::replace(existing, Value::Null);
                        *existing = Value::List(vec![first, value]);
                    }
                },
            }
        }

        // multilingual collapse runs before list repair
        for field in &class.fields {
            let Some(value) = fields.get_mut(&field.name) else {
                continue;
            };
            if field.is_single_string() {
                if let Value::List(items) = value {
                    if items.len() > 1 {
                        let candidates = mem::take(items);
                        *value = select_language(
                            candidates,
                            &self.config.preferred_languages,
                            self.config.untagged_strategy,
                        );
                    }
                }
            }
            if field.multivalued && !matches!(value, Value::List(_)) {
                let single = mem::replace(value, Value::Null);
                *value = Value::List(vec![single]);
            }
        }

        path.pop();
        Ok(module.construct(class_name, fields)?)
    }

    fn convert(
        &self,
        graph: &RdfGraph,
        namespaces: &Namespaces,
        module: &ModelModule,
        field: &FieldDescriptor,
        object: &RdfObject,
        path: &mut Vec<RdfSubject>,
    ) -> LoadResult<Value> {
        let nested_class = match (&field.kind, RdfSubject::from_object(object)) {
            (FieldKind::Object(range), Some(node)) if module.classes.contains_key(range) => {
                if path.contains(&node) {
                    warn!("Cycle through {}, keeping it as a reference", node);
                    None
                } else {
                    Some(range.as_str())
                }
            }
            _ => None,
        };
        match object {
            RdfObject::Literal(literal) => literal_value(literal),
            RdfObject::NamedNode(node) => {
                let subject: RdfSubject = node.clone().into();
                if let Some(range) = nested_class {
                    if graph.types_of(&subject).next().is_some() {
                        let nested =
                            self.reconstruct(graph, namespaces, module, range, &subject, path)?;
                        return Ok(Value::from(nested));
                    }
                }
                if let FieldKind::Enum(name) = &field.kind {
                    if let Some(text) = enum_text(module, name, node, namespaces) {
                        return Ok(Value::String(text));
                    }
                }
                Ok(Value::String(namespaces.compact(node.as_str())))
            }
            RdfObject::BlankNode(node) => match nested_class {
                Some(range) => {
                    let subject: RdfSubject = node.clone().into();
                    let nested =
                        self.reconstruct(graph, namespaces, module, range, &subject, path)?;
                    Ok(Value::from(nested))
                }
                None => Ok(Value::String(format!("_:{}", node.as_str()))),
            },
        }
    }
}

/// The subject typed with the class URI, else the first named subject, else any subject
fn find_root(graph: &RdfGraph, class: &ClassMeta, namespaces: &Namespaces) -> LoadResult<RdfSubject> {
    if let Some(class_uri) = &class.class_uri {
        let class_node: RdfObject = NamedNode::new(&expand(namespaces, class_uri))?.into();
        if let Some(subject) = graph
            .subjects_with(&RdfPredicate::rdf_type(), &class_node)
            .next()
        {
            return Ok(subject.clone());
        }
    }
    graph
        .subjects()
        .find(|s| s.is_named_node())
        .or_else(|| graph.subjects().next())
        .cloned()
        .ok_or(LoadError::NoSubjectFound)
}

/// Match a predicate by slot URI, then exact mappings, then the constructed field URI
fn field_for_predicate<'c>(
    class: &'c ClassMeta,
    predicate: &str,
    namespaces: &Namespaces,
    default_schema: &str,
) -> Option<&'c FieldDescriptor> {
    class.fields.iter().find(|field| {
        field
            .slot_uri
            .as_deref()
            .is_some_and(|uri| expand(namespaces, uri) == predicate)
            || field
                .exact_mappings
                .iter()
                .any(|mapping| expand(namespaces, mapping) == predicate)
            || field.constructed_uri(default_schema) == predicate
    })
}

/// Permissible value text whose meaning expands to `node`
fn enum_text(
    module: &ModelModule,
    enum_name: &str,
    node: &NamedNode,
    namespaces: &Namespaces,
) -> Option<String> {
    module.enums.get(enum_name).and_then(|e| {
        e.permissible_values
            .iter()
            .find(|(_, meaning)| {
                meaning
                    .as_deref()
                    .is_some_and(|m| expand(namespaces, m) == node.as_str())
            })
            .map(|(text, _)| text.clone())
    })
}
