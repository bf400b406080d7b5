use linkml_runtime::dumper::{DumperConfig, ModelRdfDumper, RdfDumper};
use linkml_runtime::loader::{ModelRdfLoader, RdfLoader};
use linkml_runtime::model::{
    ClassMeta, FieldDescriptor, FieldKind, Instance, ModelModule, ModelResult, RdfModel, Value,
};
use linkml_runtime::rdf::{NamedNode, RdfFormat, RdfObject, RdfPredicate, RdfSubject};
use linkml_runtime::schemaview::SchemaView;
use std::sync::OnceLock;
use tempfile::TempDir;

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
slots:
  id:
    identifier: true
  name:
    slot_uri: schema:name
  age:
    range: integer
  height:
    range: decimal
  severity:
    range: Severity
  aliases:
    multivalued: true
classes:
  Person:
    class_uri: schema:Person
    slots: [id, name, age, height, severity, aliases]
enums:
  Severity:
    permissible_values:
      ERROR:
        meaning: sh:Violation
      NOTE: {}
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn alice() -> Instance {
    Instance::new("Person")
        .with("id", "P:001")
        .with("name", "Alice")
        .with("age", 33)
        .with("severity", "ERROR")
        .with("aliases", vec!["Al"])
}

#[test]
fn test_person_scenario() {
    init_tracing();
    let view = SchemaView::from_yaml(PERSONINFO).unwrap();
    let graph = RdfDumper::new(&view).as_rdf_graph(&alice()).unwrap();

    let subject: RdfSubject = NamedNode::new("http://example.org/P/001").unwrap().into();
    assert!(graph.has_type(&subject, &NamedNode::new("http://schema.org/Person").unwrap()));
    let names: Vec<&RdfObject> = graph
        .objects(&subject, &RdfPredicate::new("http://schema.org/name").unwrap())
        .collect();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].as_literal().unwrap().value(), "Alice");

    let text = RdfDumper::new(&view).dumps(&alice()).unwrap();
    let module = ModelModule::from_view(&view).unwrap();
    let loaded = ModelRdfLoader::new()
        .loads(&text, RdfFormat::Turtle, &module, "Person")
        .unwrap();
    assert_eq!(loaded.get_str("id"), Some("P:001"));
    assert_eq!(loaded.get_str("name"), Some("Alice"));
    assert_eq!(loaded.get("age"), Some(&Value::Integer(33)));
    assert_eq!(loaded.get_str("severity"), Some("ERROR"));
    assert_eq!(loaded.get("aliases"), Some(&Value::from(vec!["Al"])));
}

#[test]
fn test_enum_meaning_is_a_uri_node() {
    init_tracing();
    let view = SchemaView::from_yaml(PERSONINFO).unwrap();
    let person = Instance::new("Person").with("id", "P:002").with("severity", "ERROR");
    let graph = RdfDumper::new(&view).as_rdf_graph(&person).unwrap();

    let subject: RdfSubject = NamedNode::new("http://example.org/P/002").unwrap().into();
    let severity: Vec<&RdfObject> = graph
        .objects(
            &subject,
            &RdfPredicate::new("https://w3id.org/example/personinfo/severity").unwrap(),
        )
        .collect();
    assert_eq!(
        severity,
        vec![&RdfObject::from(
            NamedNode::new("http://www.w3.org/ns/shacl#Violation").unwrap()
        )]
    );

    let plain = Instance::new("Person").with("id", "P:002").with("severity", "NOTE");
    let graph = RdfDumper::new(&view).as_rdf_graph(&plain).unwrap();
    let severity: Vec<&RdfObject> = graph
        .objects(
            &subject,
            &RdfPredicate::new("https://w3id.org/example/personinfo/severity").unwrap(),
        )
        .collect();
    assert!(severity[0].is_literal());
}

#[test]
fn test_schema_guided_file_roundtrip() {
    init_tracing();
    let view = SchemaView::from_yaml(PERSONINFO).unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("alice.nt");

    let config = DumperConfig::new().with_format(RdfFormat::NTriples);
    let person = alice().with("height", 1.7);
    RdfDumper::with_config(&view, config).dump(&person, &path).unwrap();

    let loaded = RdfLoader::new(&view)
        .load(&path, RdfFormat::NTriples, "Person")
        .unwrap();
    assert_eq!(loaded.get_str("id"), Some("P:001"));
    assert_eq!(loaded.get("height"), Some(&Value::Decimal(1.7)));
    assert_eq!(loaded.get_str("severity"), Some("ERROR"));
}

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: String,
    name: Option<String>,
    age: Option<i64>,
    aliases: Vec<String>,
}

impl RdfModel for Person {
    const CLASS_NAME: &'static str = "Person";

    fn module() -> &'static ModelModule {
        static MODULE: OnceLock<ModelModule> = OnceLock::new();
        MODULE.get_or_init(|| {
            ModelModule::new("https://w3id.org/example/personinfo", "personinfo")
                .with_prefix("schema", "http://schema.org/")
                .with_prefix("P", "http://example.org/P/")
                .with_class(
                    ClassMeta::new("Person")
                        .with_class_uri("schema:Person")
                        .with_field(FieldDescriptor::new("id", FieldKind::Uri).as_identifier())
                        .with_field(
                            FieldDescriptor::new("name", FieldKind::String)
                                .with_slot_uri("schema:name"),
                        )
                        .with_field(FieldDescriptor::new("age", FieldKind::Integer))
                        .with_field(FieldDescriptor::new("aliases", FieldKind::String).as_list()),
                )
        })
    }

    fn to_instance(&self) -> Instance {
        Instance::new(Self::CLASS_NAME)
            .with("id", self.id.as_str())
            .with("name", self.name.clone())
            .with("age", self.age)
            .with("aliases", self.aliases.clone())
    }

    fn from_instance(mut instance: Instance) -> ModelResult<Self> {
        Ok(Person {
            id: instance.take("id").as_str().unwrap_or_default().to_string(),
            name: instance.take("name").as_str().map(str::to_string),
            age: instance.take("age").as_integer(),
            aliases: instance
                .take("aliases")
                .into_values()
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        })
    }
}

#[test]
fn test_typed_model_roundtrip() {
    init_tracing();
    let bob = Person {
        id: "P:003".to_string(),
        name: Some("Bob".to_string()),
        age: Some(41),
        aliases: vec!["Bobby".to_string(), "Rob".to_string()],
    };
    let text = ModelRdfDumper::new().dumps_model(&bob).unwrap();
    assert!(text.contains("http://schema.org/Person") || text.contains("schema:Person"));

    let loaded: Person = ModelRdfLoader::new()
        .loads_model(&text, RdfFormat::Turtle)
        .unwrap();
    assert_eq!(loaded, bob);
}

const THINGS: &str = r#"
id: https://example.org/things
name: things
default_prefix: ex
prefixes:
  ex: https://example.org/things/
imports:
  - linkml:types
default_range: string
slots:
  id:
    identifier: true
  kind:
    designates_type: true
    range: uriorcurie
  label: {}
classes:
  Thing:
    slots: [id, kind, label]
  Gadget:
    is_a: Thing
"#;

fn type_count(graph: &linkml_runtime::rdf::RdfGraph, subject: &RdfSubject) -> usize {
    graph.types_of(subject).count()
}

#[test]
fn test_type_designator_replaces_class_type_on_both_paths() {
    init_tracing();
    let view = SchemaView::from_yaml(THINGS).unwrap();
    let module = ModelModule::from_view(&view).unwrap();
    assert!(module.class("Thing").unwrap().field("kind").unwrap().designates_type);

    let subject: RdfSubject = NamedNode::new("https://example.org/things/1").unwrap().into();
    let gadget = Instance::new("Thing")
        .with("id", "ex:1")
        .with("kind", "ex:Gadget")
        .with("label", "widget");
    let schema_graph = RdfDumper::new(&view).as_rdf_graph(&gadget).unwrap();
    let model_graph = ModelRdfDumper::new().as_rdf_graph(&module, &gadget).unwrap();
    assert_eq!(type_count(&schema_graph, &subject), 0);
    assert_eq!(type_count(&model_graph, &subject), 0);

    let plain = Instance::new("Thing").with("id", "ex:1").with("label", "widget");
    let schema_graph = RdfDumper::new(&view).as_rdf_graph(&plain).unwrap();
    let model_graph = ModelRdfDumper::new().as_rdf_graph(&module, &plain).unwrap();
    let thing = NamedNode::new("https://example.org/things/Thing").unwrap();
    assert!(schema_graph.has_type(&subject, &thing));
    assert!(model_graph.has_type(&subject, &thing));
}
