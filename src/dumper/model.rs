//! Dumper driven by embedded model metadata

use super::{effective_namespaces, identifier_node, DumpError, DumpResult, DumperConfig};
use crate::model::{expand, FieldDescriptor, FieldKind, Instance, ModelModule, RdfModel, Value};
use crate::rdf::{
    BlankNode, Literal, NamedNode, Namespaces, RdfGraph, RdfObject, RdfPredicate, RdfSerializer,
    RdfSubject, XSD,
};
use std::path::Path;
use tracing::{debug, error, info};

/// Writes instances as RDF using only the metadata of a [`ModelModule`]
#[derive(Debug, Clone, Default)]
pub struct ModelRdfDumper {
    config: DumperConfig,
}

impl ModelRdfDumper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DumperConfig) -> Self {
        Self { config }
    }

    /// Project an instance into a fresh graph bound to the module's prefixes
    pub fn as_rdf_graph(&self, module: &ModelModule, instance: &Instance) -> DumpResult<RdfGraph> {
        let namespaces = effective_namespaces(module.namespaces(), &self.config);
        let mut graph = RdfGraph::with_namespaces(namespaces.clone());
        self.project_object(&mut graph, &namespaces, module, instance)?;
        debug!(
            "Projected {} into {} triples",
            instance.class_name,
            graph.len()
        );
        Ok(graph)
    }

    pub fn dumps(&self, module: &ModelModule, instance: &Instance) -> DumpResult<String> {
        let graph = self.as_rdf_graph(module, instance)?;
        Ok(RdfSerializer::serialize(&graph, self.config.format)?)
    }

    pub fn dump(
        &self,
        module: &ModelModule,
        instance: &Instance,
        path: impl AsRef<Path>,
    ) -> DumpResult<()> {
        let graph = self.as_rdf_graph(module, instance)?;
        RdfSerializer::serialize_file(&graph, path.as_ref(), self.config.format)?;
        info!("Dumped {} to {}", instance.class_name, path.as_ref().display());
        Ok(())
    }

    /// Project a typed model object
    pub fn model_graph<T: RdfModel>(&self, model: &T) -> DumpResult<RdfGraph> {
        self.as_rdf_graph(T::module(), &model.to_instance())
    }

    pub fn dumps_model<T: RdfModel>(&self, model: &T) -> DumpResult<String> {
        self.dumps(T::module(), &model.to_instance())
    }

    fn project_object(
        &self,
        graph: &mut RdfGraph,
        namespaces: &Namespaces,
        module: &ModelModule,
        instance: &Instance,
    ) -> DumpResult<RdfObject> {
        let class = module.class(&instance.class_name)?;
        let subject: RdfSubject = match class.identifier() {
            Some(id_field) => {
                let id = instance.get_str(&id_field.name).ok_or_else(|| {
                    DumpError::MissingIdentifier {
                        class: class.name.clone(),
                        slot: id_field.name.clone(),
                    }
                })?;
                identifier_node(id, false, namespaces)?.into()
            }
            None => BlankNode::new().into(),
        };

        // a type-designating value replaces the class rdf:type
        let type_designated = class.fields.iter().any(|field| {
            field.designates_type && instance.get(&field.name).is_some_and(|v| !v.is_null())
        });
        if let (false, Some(class_uri)) = (type_designated, &class.class_uri) {
            let class_node = NamedNode::new(&expand(namespaces, class_uri))?;
            graph.add(subject.clone(), RdfPredicate::rdf_type(), class_node);
        }

        let default_schema = class.from_schema.as_deref().unwrap_or(&module.id);
        for (name, value) in &instance.fields {
            let Some(field) = class.field(name) else {
                error!("{} has no field {}", class.name, name);
                continue;
            };
            if field.identifier {
                continue;
            }
            let predicate = RdfPredicate::new(&field.predicate(namespaces, default_schema))?;
            for v in value.clone().into_values() {
                if v.is_null() {
                    continue;
                }
                if let Some(object) = self.project_value(graph, namespaces, module, field, &v)? {
                    graph.add(subject.clone(), predicate.clone(), object);
                }
            }
        }
        Ok(subject.to_object())
    }

    fn project_value(
        &self,
        graph: &mut RdfGraph,
        namespaces: &Namespaces,
        module: &ModelModule,
        field: &FieldDescriptor,
        value: &Value,
    ) -> DumpResult<Option<RdfObject>> {
        let invalid = || DumpError::InvalidValue {
            value: value.to_string(),
            target: field.kind.to_string(),
        };
        let object: RdfObject = match (&field.kind, value) {
            (_, Value::LangString { value, language }) => {
                Literal::new_language_tagged_literal(value.clone(), language.clone())?.into()
            }
            (FieldKind::Uri, Value::String(uri)) => NamedNode::new(&expand(namespaces, uri))?.into(),
            (FieldKind::Enum(name), Value::String(text)) => {
                match module.enums.get(name).map(|e| e.permissible_values.get(text)) {
                    Some(Some(Some(meaning))) => NamedNode::new(&expand(namespaces, meaning))?.into(),
                    Some(None) => {
                        error!("{} is not a permissible value of {}", text, name);
                        return Ok(None);
                    }
                    _ => Literal::new_simple_literal(text.clone()).into(),
                }
            }
            (FieldKind::Object(_), Value::Object(nested)) => {
                self.project_object(graph, namespaces, module, nested)?
            }
            (FieldKind::Object(_), Value::String(reference)) => {
                identifier_node(reference, false, namespaces)?.into()
            }
            (_, Value::String(s)) => Literal::new_simple_literal(s.clone()).into(),
            (_, Value::Integer(_)) => typed(value, "integer")?,
            (_, Value::Decimal(_)) => typed(value, "decimal")?,
            (_, Value::Boolean(_)) => typed(value, "boolean")?,
            (_, Value::Date(_)) => typed(value, "date")?,
            _ => return Err(invalid()),
        };
        Ok(Some(object))
    }
}

fn typed(value: &Value, datatype: &str) -> DumpResult<RdfObject> {
    let lexical = value.lexical().ok_or_else(|| DumpError::InvalidValue {
        value: value.to_string(),
        target: datatype.to_string(),
    })?;
    let datatype = NamedNode::new(&format!("{}{}", XSD, datatype))?;
    Ok(Literal::new_typed_literal(lexical, datatype).into())
}
