//! Programmatic schema construction

use super::builtin::{LINKML_NAMESPACE, TYPES_IMPORT};
use super::model::{
    ClassDefinition, EnumDefinition, PermissibleValue, Prefix, SchemaDefinition, SlotDefinition,
    TypeDefinition,
};
use super::names::underscore;
use super::{SchemaError, SchemaResult};
use tracing::debug;

/// Builder for `SchemaDefinition`
///
/// Slots referenced by `add_class` that are not yet declared are created with no range.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: SchemaDefinition,
}

impl SchemaBuilder {
    /// Start a schema named `name` with id `http://example.org/{name}`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = format!("http://example.org/{}", name);
        Self {
            schema: SchemaDefinition::new(id, name),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.schema.id = id.into();
        self
    }

    /// Add a class. `slots` become slot references unless `use_attributes` is set.
    pub fn add_class<I, S>(
        &mut self,
        class: ClassDefinition,
        slots: I,
        use_attributes: bool,
        replace_if_present: bool,
    ) -> SchemaResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SlotDefinition>,
    {
        let mut class = class;
        if self.schema.classes.contains_key(&class.name) && !replace_if_present {
            return Err(SchemaError::Duplicate {
                kind: "class",
                name: class.name,
            });
        }
        for slot in slots.into_iter().map(Into::into) {
            if use_attributes {
                class.attributes.insert(slot.name.clone(), slot);
                continue;
            }
            if !class.slots.contains(&slot.name) {
                class.slots.push(slot.name.clone());
            }
            let should_insert = match self.schema.slots.get(&slot.name) {
                None => true,
                Some(existing) => {
                    replace_if_present
                        && *existing != slot
                        && slot != SlotDefinition::new(slot.name.clone())
                }
            };
            if should_insert {
                self.schema.slots.insert(slot.name.clone(), slot);
            }
        }
        for slot_name in class.slots.clone() {
            if !self.schema.slots.contains_key(&slot_name) {
                self.schema
                    .slots
                    .insert(slot_name.clone(), SlotDefinition::new(slot_name));
            }
        }
        debug!("Builder added class: {}", class.name);
        self.schema.classes.insert(class.name.clone(), class);
        Ok(self)
    }

    /// Add a slot, optionally attaching it to an existing class
    pub fn add_slot(
        &mut self,
        slot: impl Into<SlotDefinition>,
        class_name: Option<&str>,
        replace_if_present: bool,
    ) -> SchemaResult<&mut Self> {
        let slot = slot.into();
        if self.schema.slots.contains_key(&slot.name) && !replace_if_present {
            return Err(SchemaError::Duplicate {
                kind: "slot",
                name: slot.name,
            });
        }
        if let Some(class_name) = class_name {
            let class = self
                .schema
                .classes
                .get_mut(class_name)
                .ok_or_else(|| SchemaError::NotFound {
                    kind: "class",
                    name: class_name.to_string(),
                })?;
            if !class.slots.contains(&slot.name) {
                class.slots.push(slot.name.clone());
            }
        }
        self.schema.slots.insert(slot.name.clone(), slot);
        Ok(self)
    }

    /// Change one property of a declared slot via a closure
    pub fn set_slot<F>(&mut self, slot_name: &str, update: F) -> SchemaResult<&mut Self>
    where
        F: FnOnce(&mut SlotDefinition),
    {
        let slot = self
            .schema
            .slots
            .get_mut(slot_name)
            .ok_or_else(|| SchemaError::NotFound {
                kind: "slot",
                name: slot_name.to_string(),
            })?;
        update(slot);
        Ok(self)
    }

    /// Add an enum whose permissible values are the given texts
    pub fn add_enum<I, S>(
        &mut self,
        enum_def: EnumDefinition,
        permissible_values: I,
        replace_if_present: bool,
    ) -> SchemaResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut enum_def = enum_def;
        if self.schema.enums.contains_key(&enum_def.name) && !replace_if_present {
            return Err(SchemaError::Duplicate {
                kind: "enum",
                name: enum_def.name,
            });
        }
        for text in permissible_values {
            let pv = PermissibleValue::new(text);
            enum_def.permissible_values.insert(pv.text.clone(), pv);
        }
        self.schema.enums.insert(enum_def.name.clone(), enum_def);
        Ok(self)
    }

    pub fn add_prefix(
        &mut self,
        prefix: &str,
        reference: &str,
        replace_if_present: bool,
    ) -> SchemaResult<&mut Self> {
        if self.schema.prefixes.contains_key(prefix) && !replace_if_present {
            return Err(SchemaError::Duplicate {
                kind: "prefix",
                name: prefix.to_string(),
            });
        }
        self.schema
            .prefixes
            .insert(prefix.to_string(), Prefix::new(prefix, reference));
        Ok(self)
    }

    pub fn add_imports<I, S>(&mut self, imports: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for import in imports.into_iter().map(Into::into) {
            if !self.schema.imports.contains(&import) {
                self.schema.imports.push(import);
            }
        }
        self
    }

    /// Default range `string`, default prefix from the schema name, `linkml:types` import
    pub fn add_defaults(&mut self) -> &mut Self {
        let name = self.schema.name.clone();
        let prefix = underscore(&name);
        self.schema.default_range = Some("string".to_string());
        self.schema.default_prefix = Some(prefix.clone());
        self.add_imports([TYPES_IMPORT]);
        let id = self.schema.id.clone();
        self.schema
            .prefixes
            .insert("linkml".to_string(), Prefix::new("linkml", LINKML_NAMESPACE));
        self.schema
            .prefixes
            .insert(prefix.clone(), Prefix::new(prefix, format!("{}/", id)));
        self
    }

    pub fn add_type(
        &mut self,
        type_def: TypeDefinition,
        typeof_: Option<&str>,
        uri: Option<&str>,
        replace_if_present: bool,
    ) -> SchemaResult<&mut Self> {
        let mut type_def = type_def;
        if self.schema.types.contains_key(&type_def.name) && !replace_if_present {
            return Err(SchemaError::Duplicate {
                kind: "type",
                name: type_def.name,
            });
        }
        if let Some(parent) = typeof_ {
            type_def.typeof_ = Some(parent.to_string());
        }
        if let Some(uri) = uri {
            type_def.uri = Some(uri.to_string());
        }
        self.schema.types.insert(type_def.name.clone(), type_def);
        Ok(self)
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn build(self) -> SchemaDefinition {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new("test-schema")
    }
}

impl From<&str> for SlotDefinition {
    fn from(name: &str) -> Self {
        SlotDefinition::new(name)
    }
}

impl From<String> for SlotDefinition {
    fn from(name: String) -> Self {
        SlotDefinition::new(name)
    }
}

impl From<&str> for ClassDefinition {
    fn from(name: &str) -> Self {
        ClassDefinition::new(name)
    }
}
