//! Schema document records
//!
//! Plain attribute-bearing records for schemas, classes, slots, types, enums and subsets.
//! Name-keyed maps are insertion ordered; YAML documents may omit the `name`
//! of a keyed element, in which case the map key is used.

use super::names::sfx;
use super::{SchemaError, SchemaResult};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;

/// Free-form annotation table (`tag -> value`)
pub type Annotations = IndexMap<String, JsonValue>;

/// A prefix declaration (`prefix_prefix` expands to `prefix_reference`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefix {
    pub prefix_prefix: String,
    pub prefix_reference: String,
}

impl Prefix {
    pub fn new(prefix: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            prefix_prefix: prefix.into(),
            prefix_reference: reference.into(),
        }
    }
}

/// A range alternative inside `any_of` / `exactly_one_of`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymousSlotExpression {
    pub range: Option<String>,
    pub description: Option<String>,
}

/// Slot definition, also used for attributes and slot_usage overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotDefinition {
    pub name: String,
    pub description: Option<String>,
    pub title: Option<String>,
    pub deprecated: Option<String>,
    pub aliases: Vec<String>,
    pub is_a: Option<String>,
    pub mixins: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<bool>,
    pub mixin: Option<bool>,
    pub from_schema: Option<String>,
    pub rank: Option<i64>,
    pub in_subset: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
    pub exact_mappings: Vec<String>,
    pub close_mappings: Vec<String>,
    pub related_mappings: Vec<String>,
    pub narrow_mappings: Vec<String>,
    pub broad_mappings: Vec<String>,
    pub mappings: Vec<String>,
    pub see_also: Vec<String>,

    pub slot_uri: Option<String>,
    pub range: Option<String>,
    pub domain: Option<String>,
    pub multivalued: Option<bool>,
    pub required: Option<bool>,
    pub recommended: Option<bool>,
    pub identifier: Option<bool>,
    pub key: Option<bool>,
    pub designates_type: Option<bool>,
    pub inlined: Option<bool>,
    pub inlined_as_list: Option<bool>,
    pub readonly: Option<String>,
    pub ifabsent: Option<String>,
    pub pattern: Option<String>,
    pub equals_string: Option<String>,
    pub minimum_value: Option<f64>,
    pub maximum_value: Option<f64>,
    pub minimum_cardinality: Option<i64>,
    pub maximum_cardinality: Option<i64>,
    pub alias: Option<String>,
    pub owner: Option<String>,
    pub domain_of: Vec<String>,
    pub slot_group: Option<String>,
    pub inverse: Option<String>,
    pub symmetric: Option<bool>,
    pub shared: Option<bool>,
    pub any_of: Vec<AnonymousSlotExpression>,
    pub exactly_one_of: Vec<AnonymousSlotExpression>,
}

/// Class definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDefinition {
    pub name: String,
    pub description: Option<String>,
    pub title: Option<String>,
    pub deprecated: Option<String>,
    pub aliases: Vec<String>,
    pub is_a: Option<String>,
    pub mixins: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<bool>,
    pub mixin: Option<bool>,
    pub from_schema: Option<String>,
    pub rank: Option<i64>,
    pub in_subset: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
    pub exact_mappings: Vec<String>,
    pub close_mappings: Vec<String>,
    pub related_mappings: Vec<String>,
    pub narrow_mappings: Vec<String>,
    pub broad_mappings: Vec<String>,
    pub mappings: Vec<String>,
    pub see_also: Vec<String>,

    pub class_uri: Option<String>,
    pub slots: Vec<String>,
    #[serde(deserialize_with = "named_map")]
    pub attributes: IndexMap<String, SlotDefinition>,
    #[serde(deserialize_with = "named_map")]
    pub slot_usage: IndexMap<String, SlotDefinition>,
    pub tree_root: Option<bool>,
    pub union_of: Vec<String>,
}

/// Type definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub title: Option<String>,
    pub deprecated: Option<String>,
    pub aliases: Vec<String>,
    pub is_a: Option<String>,
    pub mixins: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<bool>,
    pub mixin: Option<bool>,
    pub from_schema: Option<String>,
    pub rank: Option<i64>,
    pub in_subset: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
    pub exact_mappings: Vec<String>,
    pub close_mappings: Vec<String>,
    pub related_mappings: Vec<String>,
    pub narrow_mappings: Vec<String>,
    pub broad_mappings: Vec<String>,
    pub mappings: Vec<String>,
    pub see_also: Vec<String>,

    #[serde(rename = "typeof")]
    pub typeof_: Option<String>,
    pub uri: Option<String>,
    pub base: Option<String>,
    pub repr: Option<String>,
    pub pattern: Option<String>,
    pub minimum_value: Option<f64>,
    pub maximum_value: Option<f64>,
}

/// A permissible value of an enum, keyed by its text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissibleValue {
    pub text: String,
    pub description: Option<String>,
    pub title: Option<String>,
    pub meaning: Option<String>,
    pub is_a: Option<String>,
    pub mixins: Vec<String>,
    pub aliases: Vec<String>,
    pub exact_mappings: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
}

impl PermissibleValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }
}

/// Enum definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumDefinition {
    pub name: String,
    pub description: Option<String>,
    pub title: Option<String>,
    pub deprecated: Option<String>,
    pub aliases: Vec<String>,
    pub is_a: Option<String>,
    pub mixins: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<bool>,
    pub mixin: Option<bool>,
    pub from_schema: Option<String>,
    pub rank: Option<i64>,
    pub in_subset: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
    pub exact_mappings: Vec<String>,
    pub close_mappings: Vec<String>,
    pub related_mappings: Vec<String>,
    pub narrow_mappings: Vec<String>,
    pub broad_mappings: Vec<String>,
    pub mappings: Vec<String>,
    pub see_also: Vec<String>,

    pub enum_uri: Option<String>,
    #[serde(deserialize_with = "named_map")]
    pub permissible_values: IndexMap<String, PermissibleValue>,
}

/// Subset definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetDefinition {
    pub name: String,
    pub description: Option<String>,
    pub title: Option<String>,
    pub from_schema: Option<String>,
    pub rank: Option<i64>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
    pub exact_mappings: Vec<String>,
    pub close_mappings: Vec<String>,
    pub related_mappings: Vec<String>,
    pub narrow_mappings: Vec<String>,
    pub broad_mappings: Vec<String>,
    pub mappings: Vec<String>,
}

/// A schema document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaDefinition {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    /// Where the document was read from; relative imports resolve against it
    pub source_file: Option<String>,
    pub imports: Vec<String>,
    #[serde(deserialize_with = "prefix_map")]
    pub prefixes: IndexMap<String, Prefix>,
    pub default_prefix: Option<String>,
    pub default_range: Option<String>,
    pub default_curi_maps: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub annotations: Annotations,
    #[serde(deserialize_with = "named_map")]
    pub subsets: IndexMap<String, SubsetDefinition>,
    #[serde(deserialize_with = "named_map")]
    pub types: IndexMap<String, TypeDefinition>,
    #[serde(deserialize_with = "named_map")]
    pub enums: IndexMap<String, EnumDefinition>,
    #[serde(deserialize_with = "named_map")]
    pub slots: IndexMap<String, SlotDefinition>,
    #[serde(deserialize_with = "named_map")]
    pub classes: IndexMap<String, ClassDefinition>,
}

impl SchemaDefinition {
    /// Create an empty schema
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declared default prefix, or the schema id suffixed as a pseudo-prefix
    pub fn effective_default_prefix(&self) -> String {
        match &self.default_prefix {
            Some(prefix) if !prefix.is_empty() => prefix.clone(),
            _ => sfx(&self.id),
        }
    }

    /// Parse a YAML schema document
    pub fn from_yaml_str(yaml: &str) -> SchemaResult<Self> {
        let mut schema: SchemaDefinition = serde_yaml::from_str(yaml)?;
        schema.fill_names();
        Ok(schema)
    }

    /// Parse a JSON schema document
    pub fn from_json_str(json: &str) -> SchemaResult<Self> {
        let mut schema: SchemaDefinition = serde_json::from_str(json)?;
        schema.fill_names();
        Ok(schema)
    }

    /// Read a YAML (or `.json`) schema document from disk, recording its location
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut schema = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_yaml_str(&text)?,
        };
        schema.source_file = Some(path.display().to_string());
        Ok(schema)
    }

    /// Serialize as YAML, dropping empty and null entries
    pub fn to_yaml(&self) -> SchemaResult<String> {
        let value = compact(serde_json::to_value(self)?);
        Ok(serde_yaml::to_string(&value)?)
    }

    /// Serialize as pretty JSON, dropping empty and null entries
    pub fn to_json(&self) -> SchemaResult<String> {
        let value = compact(serde_json::to_value(self)?);
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn fill_names(&mut self) {
        if self.name.is_empty() {
            self.name = self
                .id
                .rsplit(|c| c == '/' || c == '#' || c == ':')
                .find(|part| !part.is_empty())
                .unwrap_or_default()
                .to_string();
        }
    }
}

/// Drop nulls, empty lists and empty maps.
fn compact(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, compact(v)))
                .filter(|(_, v)| !is_blank(v))
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(compact).collect()),
        other => other,
    }
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Elements that take their name from the key of the map they are declared in.
pub(crate) trait Keyed: Default {
    fn key_name(&self) -> &str;
    fn set_key_name(&mut self, name: String);
}

macro_rules! keyed_by {
    ($ty:ty, $field:ident) => {
        impl Keyed for $ty {
            fn key_name(&self) -> &str {
                &self.$field
            }

            fn set_key_name(&mut self, name: String) {
                self.$field = name;
            }
        }
    };
}

keyed_by!(SlotDefinition, name);
keyed_by!(ClassDefinition, name);
keyed_by!(TypeDefinition, name);
keyed_by!(EnumDefinition, name);
keyed_by!(SubsetDefinition, name);
keyed_by!(PermissibleValue, text);

fn named_map<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Keyed + DeserializeOwned,
{
    let raw: Option<IndexMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let mut value = value.unwrap_or_default();
            if value.key_name().is_empty() {
                value.set_key_name(key.clone());
            }
            (key, value)
        })
        .collect())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrefixRepr {
    Reference(String),
    Full {
        #[serde(default)]
        prefix_prefix: Option<String>,
        prefix_reference: String,
    },
}

fn prefix_map<'de, D>(deserializer: D) -> Result<IndexMap<String, Prefix>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, PrefixRepr>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, repr)| {
            let prefix = match repr {
                PrefixRepr::Reference(reference) => Prefix::new(key.clone(), reference),
                PrefixRepr::Full {
                    prefix_prefix,
                    prefix_reference,
                } => Prefix::new(prefix_prefix.unwrap_or_else(|| key.clone()), prefix_reference),
            };
            (key, prefix)
        })
        .collect())
}

/// Metaslot value semantics used when folding inherited and overriding values.
pub(crate) trait Metaslot {
    /// No value has been asserted
    fn is_unset(&self) -> bool;
    /// A value that propagates down the slot hierarchy
    fn is_truthy(&self) -> bool;
}

impl Metaslot for Option<String> {
    fn is_unset(&self) -> bool {
        self.as_deref().map_or(true, str::is_empty)
    }

    fn is_truthy(&self) -> bool {
        self.as_deref().map_or(false, |s| !s.is_empty())
    }
}

impl Metaslot for Option<bool> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }

    fn is_truthy(&self) -> bool {
        *self == Some(true)
    }
}

impl Metaslot for Option<i64> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }

    fn is_truthy(&self) -> bool {
        self.map_or(false, |v| v != 0)
    }
}

impl Metaslot for Option<f64> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }

    fn is_truthy(&self) -> bool {
        self.map_or(false, |v| v != 0.0)
    }
}

impl<T> Metaslot for Vec<T> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Metaslot for Annotations {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }

    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl SlotDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    /// Copy every propagating metaslot asserted on an ancestor slot.
    pub(crate) fn inherit_from(&mut self, ancestor: &SlotDefinition) {
        macro_rules! inherit {
            ($($field:ident),* $(,)?) => {
                $(
                    if ancestor.$field.is_truthy() {
                        self.$field = ancestor.$field.clone();
                    }
                )*
            };
        }
        inherit!(
            domain,
            readonly,
            ifabsent,
            shared,
            key,
            identifier,
            designates_type,
            range,
            required,
            recommended,
            multivalued,
            inlined,
            inlined_as_list,
            minimum_value,
            maximum_value,
            pattern,
            equals_string,
            minimum_cardinality,
            maximum_cardinality,
            any_of,
            exactly_one_of,
        );
    }

    /// Restore the metaslots asserted directly on `own`.
    pub(crate) fn reassert(&mut self, own: &SlotDefinition) {
        macro_rules! reassert {
            ($($field:ident),* $(,)?) => {
                $(
                    if !own.$field.is_unset() {
                        self.$field = own.$field.clone();
                    }
                )*
            };
        }
        reassert!(
            domain,
            readonly,
            ifabsent,
            shared,
            key,
            identifier,
            designates_type,
            range,
            required,
            recommended,
            multivalued,
            inlined,
            inlined_as_list,
            minimum_value,
            maximum_value,
            pattern,
            equals_string,
            minimum_cardinality,
            maximum_cardinality,
            any_of,
            exactly_one_of,
        );
    }

    /// Fold a class-level slot_usage record over this slot.
    ///
    /// Bounds only tighten: `minimum_value` keeps the larger and `maximum_value` the smaller.
    pub(crate) fn apply_usage(&mut self, usage: &SlotDefinition) {
        macro_rules! fold {
            ($($field:ident),* $(,)?) => {
                $(
                    if !usage.$field.is_unset() {
                        self.$field = usage.$field.clone();
                    }
                )*
            };
        }
        fold!(
            description,
            title,
            deprecated,
            aliases,
            is_a,
            mixins,
            abstract_,
            mixin,
            from_schema,
            rank,
            in_subset,
            annotations,
            exact_mappings,
            close_mappings,
            related_mappings,
            narrow_mappings,
            broad_mappings,
            mappings,
            see_also,
            slot_uri,
            range,
            domain,
            multivalued,
            required,
            recommended,
            identifier,
            key,
            designates_type,
            inlined,
            inlined_as_list,
            readonly,
            ifabsent,
            pattern,
            equals_string,
            minimum_cardinality,
            maximum_cardinality,
            alias,
            slot_group,
            inverse,
            symmetric,
            shared,
            any_of,
            exactly_one_of,
        );
        self.minimum_value = match (self.minimum_value, usage.minimum_value) {
            (Some(current), Some(other)) => Some(current.max(other)),
            (current, other) => current.or(other),
        };
        self.maximum_value = match (self.maximum_value, usage.maximum_value) {
            (Some(current), Some(other)) => Some(current.min(other)),
            (current, other) => current.or(other),
        };
    }

    pub fn is_multivalued(&self) -> bool {
        self.multivalued == Some(true)
    }

    pub fn is_identifier(&self) -> bool {
        self.identifier == Some(true)
    }

    pub fn is_key(&self) -> bool {
        self.key == Some(true)
    }

    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }

    pub fn designates_type(&self) -> bool {
        self.designates_type == Some(true)
    }
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_is_a(mut self, parent: impl Into<String>) -> Self {
        self.is_a = Some(parent.into());
        self
    }

    pub fn with_mixins<I, S>(mut self, mixins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mixins = mixins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots = slots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, attribute: SlotDefinition) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    pub fn with_slot_usage(mut self, usage: SlotDefinition) -> Self {
        self.slot_usage.insert(usage.name.clone(), usage);
        self
    }
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl EnumDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: PermissibleValue) -> Self {
        self.permissible_values.insert(value.text.clone(), value);
        self
    }
}

impl SubsetDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
