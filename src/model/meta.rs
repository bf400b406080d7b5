//! Metadata embedded in generated model code
//!
//! Each class carries its URI and a field descriptor table, and the module carries the
//! prefix table. These are all the self-contained dumper and loader need; no schema view
//! is consulted.

use super::error::{ModelError, ModelResult};
use crate::rdf::Namespaces;
use crate::schema::{sfx, underscore, SlotDefinition};
use crate::schemaview::{SchemaView, SchemaViewResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Static type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    /// URI or CURIE, written as a URI node
    Uri,
    /// Permissible value text of the named enum
    Enum(String),
    /// Nested object of the named class, or a reference to one by identifier
    Object(String),
}

impl FieldKind {
    /// Element name of an enum or class range
    pub fn range(&self) -> Option<&str> {
        match self {
            FieldKind::Enum(name) | FieldKind::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "string"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Decimal => write!(f, "decimal"),
            FieldKind::Boolean => write!(f, "boolean"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Uri => write!(f, "uri"),
            FieldKind::Enum(name) => write!(f, "enum {}", name),
            FieldKind::Object(name) => write!(f, "object {}", name),
        }
    }
}

/// One field of a model class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub multivalued: bool,
    #[serde(default)]
    pub required: bool,
    /// Values name the subject rather than being emitted as triples
    #[serde(default)]
    pub identifier: bool,
    /// Values supply the instance's type, replacing the class `rdf:type`
    #[serde(default)]
    pub designates_type: bool,
    #[serde(default)]
    pub slot_uri: Option<String>,
    #[serde(default)]
    pub exact_mappings: Vec<String>,
    #[serde(default)]
    pub from_schema: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            multivalued: false,
            required: false,
            identifier: false,
            designates_type: false,
            slot_uri: None,
            exact_mappings: Vec::new(),
            from_schema: None,
        }
    }

    pub fn as_list(mut self) -> Self {
        self.multivalued = true;
        self
    }

    pub fn as_required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as the identifier field; identifiers are always required
    pub fn as_identifier(mut self) -> Self {
        self.identifier = true;
        self.required = true;
        self
    }

    pub fn as_type_designator(mut self) -> Self {
        self.designates_type = true;
        self
    }

    pub fn with_slot_uri(mut self, uri: impl Into<String>) -> Self {
        self.slot_uri = Some(uri.into());
        self
    }

    pub fn with_exact_mapping(mut self, uri: impl Into<String>) -> Self {
        self.exact_mappings.push(uri.into());
        self
    }

    pub fn with_from_schema(mut self, schema: impl Into<String>) -> Self {
        self.from_schema = Some(schema.into());
        self
    }

    /// A single-valued plain string field
    pub fn is_single_string(&self) -> bool {
        !self.multivalued && self.kind == FieldKind::String
    }

    /// Predicate of this field: the declared slot URI, else [`FieldDescriptor::constructed_uri`]
    pub fn predicate(&self, namespaces: &Namespaces, default_schema: &str) -> String {
        match &self.slot_uri {
            Some(uri) => expand(namespaces, uri),
            None => self.constructed_uri(default_schema),
        }
    }

    /// The field name appended to the namespace of the schema declaring it
    pub fn constructed_uri(&self, default_schema: &str) -> String {
        let schema = self.from_schema.as_deref().unwrap_or(default_schema);
        format!("{}{}", sfx(schema), self.name)
    }
}

/// Expand a CURIE with a known prefix; anything else is kept as written
pub(crate) fn expand(namespaces: &Namespaces, value: &str) -> String {
    namespaces
        .uri_for(value)
        .unwrap_or_else(|_| value.to_string())
}

/// Metadata of one model class
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMeta {
    pub name: String,
    #[serde(default)]
    pub class_uri: Option<String>,
    #[serde(default)]
    pub from_schema: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ClassMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_class_uri(mut self, uri: impl Into<String>) -> Self {
        self.class_uri = Some(uri.into());
        self
    }

    pub fn with_from_schema(mut self, schema: impl Into<String>) -> Self {
        self.from_schema = Some(schema.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identifier(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.identifier)
    }
}

/// Metadata of one enum: permissible value text to its meaning, if any
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumMeta {
    pub name: String,
    #[serde(default)]
    pub permissible_values: IndexMap<String, Option<String>>,
}

impl EnumMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, text: impl Into<String>, meaning: Option<&str>) -> Self {
        self.permissible_values
            .insert(text.into(), meaning.map(str::to_string));
        self
    }

    pub fn meaning(&self, text: &str) -> Option<&str> {
        self.permissible_values.get(text).and_then(|m| m.as_deref())
    }
}

/// Module-level metadata shared by every generated class
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelModule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub default_prefix: Option<String>,
    /// Prefix to namespace; an `@base` or `_base` key sets the base IRI
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,
    #[serde(default)]
    pub classes: IndexMap<String, ClassMeta>,
    #[serde(default)]
    pub enums: IndexMap<String, EnumMeta>,
}

impl ModelModule {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), iri.into());
        self
    }

    pub fn with_class(mut self, class: ClassMeta) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn with_enum(mut self, e: EnumMeta) -> Self {
        self.enums.insert(e.name.clone(), e);
        self
    }

    pub fn class(&self, name: &str) -> ModelResult<&ClassMeta> {
        self.classes
            .get(name)
            .ok_or_else(|| ModelError::UnknownClass(name.to_string()))
    }

    pub fn namespaces(&self) -> Namespaces {
        Namespaces::from_prefix_map(self.prefixes.iter())
    }

    /// Derive the metadata a generator would embed, from the induced classes of a view
    pub fn from_view(view: &SchemaView) -> SchemaViewResult<Self> {
        let schema = view.schema();
        let mut module = ModelModule::new(schema.id.clone(), schema.name.clone());
        module.default_prefix = schema.default_prefix.clone();
        for (prefix, iri) in view.namespaces().iter() {
            module.prefixes.insert(prefix.to_string(), iri.to_string());
        }

        for (name, e) in view.all_enums(Default::default(), true)? {
            let mut meta = EnumMeta::new(&name);
            for (text, pv) in &e.permissible_values {
                meta = meta.with_value(text, pv.meaning.as_deref());
            }
            module.enums.insert(name, meta);
        }

        for (name, class) in view.all_classes(Default::default(), true)? {
            let mut meta = ClassMeta::new(&name).with_class_uri(view.get_uri(&name, false)?);
            meta.from_schema = class.from_schema.clone();
            for slot in view.class_induced_slots(&name)? {
                meta.fields.push(field_for_slot(view, &slot)?);
            }
            module.classes.insert(name, meta);
        }
        Ok(module)
    }
}

fn field_for_slot(view: &SchemaView, slot: &SlotDefinition) -> SchemaViewResult<FieldDescriptor> {
    let kind = match slot.range.as_deref() {
        None => FieldKind::String,
        Some(range) if view.get_class(range, true).is_some() => FieldKind::Object(range.to_string()),
        Some(range) if view.get_enum(range, true).is_some() => FieldKind::Enum(range.to_string()),
        Some(range) if view.get_type(range, true).is_some() => {
            let t = view.induced_type(range)?;
            match t.uri.as_deref() {
                Some("xsd:integer") => FieldKind::Integer,
                Some("xsd:decimal" | "xsd:float" | "xsd:double") => FieldKind::Decimal,
                Some("xsd:boolean") => FieldKind::Boolean,
                Some("xsd:date") => FieldKind::Date,
                Some("xsd:anyURI" | "rdfs:Resource" | "shex:iri" | "shex:nonLiteral") => {
                    FieldKind::Uri
                }
                _ => FieldKind::String,
            }
        }
        Some(range) => {
            warn!("Range {} of slot {} is not declared, using string", range, slot.name);
            FieldKind::String
        }
    };
    Ok(FieldDescriptor {
        name: underscore(&slot.name),
        kind,
        multivalued: slot.is_multivalued(),
        required: slot.is_required(),
        identifier: slot.is_identifier(),
        designates_type: slot.designates_type(),
        slot_uri: Some(view.uri_of(slot, false, false)?),
        exact_mappings: slot.exact_mappings.clone(),
        from_schema: slot.from_schema.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_meta_lookup() {
        let person = ClassMeta::new("Person")
            .with_class_uri("schema:Person")
            .with_field(FieldDescriptor::new("id", FieldKind::Uri).as_identifier())
            .with_field(FieldDescriptor::new("aliases", FieldKind::String).as_list());
        assert_eq!(person.identifier().unwrap().name, "id");
        assert!(person.identifier().unwrap().required);
        assert!(!person.field("aliases").unwrap().is_single_string());
        assert!(person.field("name").is_none());

        let ns = Namespaces::from_prefix_map([("schema", "http://schema.org/")]);
        let name = FieldDescriptor::new("name", FieldKind::String).with_slot_uri("schema:name");
        assert_eq!(name.predicate(&ns, "https://example.org/p"), "http://schema.org/name");
        let nick = FieldDescriptor::new("nick", FieldKind::String);
        assert_eq!(nick.predicate(&ns, "https://example.org/p"), "https://example.org/p/nick");
        let nick = nick.with_from_schema("https://example.org/q#");
        assert_eq!(nick.constructed_uri("unused"), "https://example.org/q#nick");

        let module = ModelModule::new("https://example.org/p", "p")
            .with_prefix("schema", "http://schema.org/")
            .with_prefix("@base", "https://example.org/p/")
            .with_class(person);
        assert!(module.class("Person").is_ok());
        assert_eq!(
            module.class("Robot"),
            Err(ModelError::UnknownClass("Robot".to_string()))
        );
        let ns = module.namespaces();
        assert_eq!(ns.base.as_deref(), Some("https://example.org/p/"));
        assert_eq!(ns.get_iri("schema").unwrap(), "http://schema.org/");
    }

    #[test]
    fn test_metadata_from_yaml() {
        let module: ModelModule = serde_yaml::from_str(
            r#"
id: https://example.org/vocab
name: vocab
prefixes:
  sh: http://www.w3.org/ns/shacl#
classes:
  Result:
    name: Result
    class_uri: sh:ValidationResult
    fields:
      - name: severity
        kind: {enum: Severity}
        slot_uri: sh:resultSeverity
enums:
  Severity:
    name: Severity
    permissible_values:
      ERROR: sh:Violation
      NOTE: null
"#,
        )
        .unwrap();
        let result = module.class("Result").unwrap();
        assert_eq!(result.fields[0].kind.range(), Some("Severity"));
        assert_eq!(module.enums["Severity"].meaning("ERROR"), Some("sh:Violation"));
        assert_eq!(module.enums["Severity"].meaning("NOTE"), None);
    }

    #[test]
    fn test_from_view() {
        let view = SchemaView::from_yaml(
            r#"
id: https://example.org/people
name: people
default_prefix: people
prefixes:
  people: https://example.org/people/
  schema: http://schema.org/
imports: [linkml:types]
default_range: string
slots:
  id:
    identifier: true
    range: uriorcurie
  full name:
    slot_uri: schema:name
  age:
    range: integer
  friends:
    range: Person
    multivalued: true
classes:
  Person:
    class_uri: schema:Person
    slots: [id, full name, age, friends]
"#,
        )
        .unwrap();
        let module = ModelModule::from_view(&view).unwrap();
        let person = module.class("Person").unwrap();
        assert_eq!(person.class_uri.as_deref(), Some("schema:Person"));
        let names: Vec<&str> = person.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "full_name", "age", "friends"]);
        assert_eq!(person.fields[0].kind, FieldKind::Uri);
        assert!(person.fields[0].identifier);
        assert_eq!(person.fields[1].slot_uri.as_deref(), Some("schema:name"));
        assert_eq!(person.fields[2].kind, FieldKind::Integer);
        assert_eq!(person.fields[2].slot_uri.as_deref(), Some("people:age"));
        assert_eq!(person.fields[3].kind, FieldKind::Object("Person".to_string()));
        assert!(person.fields[3].multivalued);
        assert_eq!(module.prefixes["schema"], "http://schema.org/");
    }
}
