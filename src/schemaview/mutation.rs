//! Editing the root schema through a view
//!
//! Every operation here ends in [`SchemaView::set_modified`], so memoized results
//! computed before the edit are not served afterwards.

use super::error::{SchemaViewError, SchemaViewResult};
use super::traversal::Traversal;
use super::SchemaView;
use crate::schema::{
    ClassDefinition, ElementKind, EnumDefinition, SchemaDefinition, SlotDefinition,
    SubsetDefinition, TypeDefinition,
};
use indexmap::IndexMap;
use tracing::info;

fn merge_into<T: Clone>(
    target: &mut IndexMap<String, T>,
    source: &IndexMap<String, T>,
    clobber: bool,
) {
    for (name, element) in source {
        if clobber || !target.contains_key(name) {
            target.insert(name.clone(), element.clone());
        }
    }
}

impl SchemaView {
    /// Add or replace a class in the root schema
    pub fn add_class(&mut self, class: ClassDefinition) {
        self.schema_mut().classes.insert(class.name.clone(), class);
        self.set_modified();
    }

    pub fn add_slot(&mut self, slot: SlotDefinition) {
        self.schema_mut().slots.insert(slot.name.clone(), slot);
        self.set_modified();
    }

    pub fn add_enum(&mut self, e: EnumDefinition) {
        self.schema_mut().enums.insert(e.name.clone(), e);
        self.set_modified();
    }

    pub fn add_type(&mut self, t: TypeDefinition) {
        self.schema_mut().types.insert(t.name.clone(), t);
        self.set_modified();
    }

    pub fn add_subset(&mut self, subset: SubsetDefinition) {
        self.schema_mut().subsets.insert(subset.name.clone(), subset);
        self.set_modified();
    }

    /// Remove a class from the root schema.
    ///
    /// With `delete_references`, children of the class drop it from their `is_a` and
    /// `mixins`.
    pub fn delete_class(&mut self, name: &str, delete_references: bool) -> SchemaViewResult<()> {
        let children = if delete_references {
            self.class_children(name, Traversal::default())?
        } else {
            Vec::new()
        };
        let schema = self.schema_mut();
        if schema.classes.shift_remove(name).is_none() {
            return Err(SchemaViewError::unknown(ElementKind::Class, name));
        }
        for child in &children {
            if let Some(class) = schema.classes.get_mut(child) {
                if class.is_a.as_deref() == Some(name) {
                    class.is_a = None;
                }
                class.mixins.retain(|m| m != name);
            }
        }
        self.set_modified();
        Ok(())
    }

    pub fn delete_slot(&mut self, name: &str) -> SchemaViewResult<()> {
        if self.schema_mut().slots.shift_remove(name).is_none() {
            return Err(SchemaViewError::unknown(ElementKind::Slot, name));
        }
        self.set_modified();
        Ok(())
    }

    pub fn delete_enum(&mut self, name: &str) -> SchemaViewResult<()> {
        if self.schema_mut().enums.shift_remove(name).is_none() {
            return Err(SchemaViewError::unknown(ElementKind::Enum, name));
        }
        self.set_modified();
        Ok(())
    }

    pub fn delete_type(&mut self, name: &str) -> SchemaViewResult<()> {
        if self.schema_mut().types.shift_remove(name).is_none() {
            return Err(SchemaViewError::unknown(ElementKind::Type, name));
        }
        self.set_modified();
        Ok(())
    }

    pub fn delete_subset(&mut self, name: &str) -> SchemaViewResult<()> {
        if self.schema_mut().subsets.shift_remove(name).is_none() {
            return Err(SchemaViewError::unknown(ElementKind::Subset, name));
        }
        self.set_modified();
        Ok(())
    }

    /// Merge prefixes and elements of another schema into the root schema.
    /// Existing entries are kept unless `clobber` is set.
    pub fn merge_schema(&mut self, other: &SchemaDefinition, clobber: bool) {
        let schema = self.schema_mut();
        merge_into(&mut schema.prefixes, &other.prefixes, clobber);
        merge_into(&mut schema.classes, &other.classes, clobber);
        merge_into(&mut schema.slots, &other.slots, clobber);
        merge_into(&mut schema.types, &other.types, clobber);
        merge_into(&mut schema.enums, &other.enums, clobber);
        merge_into(&mut schema.subsets, &other.subsets, clobber);
        self.set_modified();
    }

    /// Fold every imported schema into the root and clear its import list
    pub fn merge_imports(&mut self) {
        let root = self.schema().name.clone();
        let imported: Vec<SchemaDefinition> = self
            .imports_closure(true)
            .iter()
            .filter(|name| **name != root)
            .filter_map(|name| self.schema_map().get(name).cloned())
            .collect();
        for schema in &imported {
            self.merge_schema(schema, false);
        }
        self.schema_mut().imports.clear();
        self.set_modified();
        info!(
            "Merged {} imported schemas into {}",
            imported.len(),
            root
        );
    }

    /// Deep copy of the root schema, optionally renamed
    pub fn copy_schema(&self, new_name: Option<&str>) -> SchemaDefinition {
        let mut copy = self.schema().clone();
        if let Some(name) = new_name {
            copy.name = name.to_string();
        }
        copy
    }

    /// Rewrite the root schema so that inherited facts are stated explicitly.
    ///
    /// Types receive `uri`, `base` and `pattern` from their ancestors. Classes receive
    /// every induced slot as an attribute, with type facets copied onto the slot and
    /// inlining inferred for class ranges that have no identifier or key. The result
    /// does not import anything.
    pub fn materialize_derived_schema(&self) -> SchemaViewResult<SchemaDefinition> {
        let mut derived = self.copy_schema(None);
        derived.imports.clear();

        for (name, t) in self.all_types(Default::default(), true)? {
            let mut t = t;
            for ancestor in self.type_ancestors(&name, Traversal::default())? {
                let parent = self.require_type(&ancestor, true)?;
                t.uri = t.uri.or_else(|| parent.uri.clone());
                t.base = t.base.or_else(|| parent.base.clone());
                t.pattern = t.pattern.or_else(|| parent.pattern.clone());
            }
            derived.types.insert(name, t);
        }

        for (name, class) in self.all_classes(Default::default(), true)? {
            let mut class = class;
            for mut slot in self.class_induced_slots(&name)? {
                self.materialize_slot(&mut slot)?;
                class.attributes.insert(slot.name.clone(), slot);
            }
            derived.classes.insert(name, class);
        }

        for (name, subset) in self.all_subsets(Default::default(), true)? {
            derived.subsets.insert(name, subset);
        }
        for (name, e) in self.all_enums(Default::default(), true)? {
            derived.enums.insert(name, e);
        }
        Ok(derived)
    }

    fn materialize_slot(&self, slot: &mut SlotDefinition) -> SchemaViewResult<()> {
        if let Some(range) = slot.range.clone() {
            if let Some(t) = self.get_type(&range, true) {
                slot.pattern = slot.pattern.take().or_else(|| t.pattern.clone());
                slot.maximum_value = slot.maximum_value.or(t.maximum_value);
                slot.minimum_value = slot.minimum_value.or(t.minimum_value);
            } else if self.get_class(&range, true).is_some()
                && self.get_identifier_slot(&range, true)?.is_none()
            {
                if slot.inlined.is_none() {
                    slot.inlined = Some(true);
                }
                if slot.inlined_as_list.is_none() && slot.is_multivalued() {
                    slot.inlined_as_list = Some(true);
                }
            }
        }
        if slot.inlined_as_list == Some(true) {
            slot.inlined = Some(true);
        }
        if slot.is_identifier() || slot.is_key() {
            slot.required = Some(true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemaview::InMemorySchemaLoader;

    const ZOO: &str = r#"
id: http://example.org/zoo
name: zoo
default_prefix: zoo
default_range: string
prefixes:
  zoo: http://example.org/zoo/
imports:
  - linkml:types
  - core
types:
  tag:
    typeof: string
slots:
  id:
    identifier: true
  keeper:
    range: Keeper
  feeds:
    range: Meal
    multivalued: true
classes:
  Animal:
    slots: [id, keeper]
  Lion:
    is_a: Animal
    mixins: [Carnivore]
  Carnivore:
    mixin: true
    slots: [feeds]
  Keeper:
    slots: [id]
  Meal: {}
"#;

    const CORE: &str = r#"
id: http://example.org/core
name: core
prefixes:
  core: http://example.org/core/
types:
  code:
    typeof: string
    pattern: "^[A-Z]+$"
classes:
  Enclosure: {}
"#;

    fn view() -> SchemaView {
        let loader = InMemorySchemaLoader::new()
            .with_schema("core", SchemaDefinition::from_yaml_str(CORE).unwrap());
        SchemaView::with_loader(SchemaDefinition::from_yaml_str(ZOO).unwrap(), loader).unwrap()
    }

    #[test]
    fn test_add_invalidates_cached_queries() {
        let mut view = view();
        assert!(view.class_slots("Lion", false, true).unwrap().contains(&"feeds".to_string()));
        let revision = view.revision();

        view.add_slot(SlotDefinition::new("mane"));
        view.add_class(
            ClassDefinition::new("Lion")
                .with_is_a("Animal")
                .with_slots(["mane"]),
        );
        assert!(view.revision() > revision);
        let slots = view.class_slots("Lion", false, true).unwrap();
        assert_eq!(slots, vec!["mane", "id", "keeper"]);
        assert_eq!(
            view.get_class("Lion", false).unwrap().from_schema.as_deref(),
            Some("http://example.org/zoo")
        );
    }

    #[test]
    fn test_delete_class_with_references() {
        let mut view = view();
        view.delete_class("Carnivore", true).unwrap();
        assert!(view.get_class("Carnivore", true).is_none());
        assert!(view.get_class("Lion", true).unwrap().mixins.is_empty());

        view.delete_class("Animal", false).unwrap();
        assert_eq!(
            view.get_class("Lion", true).unwrap().is_a.as_deref(),
            Some("Animal")
        );
        assert!(matches!(
            view.delete_class("Animal", false),
            Err(SchemaViewError::UnknownElement { .. })
        ));
    }

    #[test]
    fn test_delete_other_elements() {
        let mut view = view();
        view.delete_slot("feeds").unwrap();
        view.delete_type("tag").unwrap();
        assert!(view.get_slot("feeds", true, true).is_none());
        assert!(view.get_type("tag", true).is_none());
        assert!(view.delete_enum("Nope").is_err());
        assert!(view.delete_subset("Nope").is_err());
    }

    #[test]
    fn test_merge_schema_clobber() {
        let mut view = view();
        let mut other = SchemaDefinition::new("http://example.org/other", "other");
        other.classes.insert(
            "Meal".to_string(),
            ClassDefinition::new("Meal").with_slots(["id"]),
        );
        other
            .classes
            .insert("Bowl".to_string(), ClassDefinition::new("Bowl"));

        view.merge_schema(&other, false);
        assert!(view.get_class("Meal", false).unwrap().slots.is_empty());
        assert!(view.get_class("Bowl", false).is_some());

        view.merge_schema(&other, true);
        assert_eq!(view.get_class("Meal", false).unwrap().slots, vec!["id"]);
    }

    #[test]
    fn test_merge_imports() {
        let mut view = view();
        assert!(view.get_class("Enclosure", false).is_none());
        view.merge_imports();
        assert!(view.schema().imports.is_empty());
        assert!(view.get_class("Enclosure", false).is_some());
        assert!(view.get_type("string", false).is_some());
        assert!(view.schema().prefixes.contains_key("core"));
        assert_eq!(view.imports_closure(true), vec!["zoo"]);
    }

    #[test]
    fn test_copy_schema() {
        let view = view();
        let copy = view.copy_schema(Some("zoo2"));
        assert_eq!(copy.name, "zoo2");
        assert_eq!(copy.classes.len(), view.schema().classes.len());
        assert_eq!(view.schema().name, "zoo");
    }

    #[test]
    fn test_materialize_derived_schema() {
        let view = view();
        let derived = view.materialize_derived_schema().unwrap();
        assert!(derived.imports.is_empty());

        let tag = &derived.types["tag"];
        assert_eq!(tag.uri.as_deref(), Some("xsd:string"));
        assert_eq!(tag.base.as_deref(), Some("str"));
        assert_eq!(derived.types["code"].pattern.as_deref(), Some("^[A-Z]+$"));

        let lion = &derived.classes["Lion"];
        let id = &lion.attributes["id"];
        assert_eq!(id.required, Some(true));
        let feeds = &lion.attributes["feeds"];
        assert_eq!(feeds.inlined, Some(true));
        assert_eq!(feeds.inlined_as_list, Some(true));
        let keeper = &lion.attributes["keeper"];
        assert_eq!(keeper.inlined, None);
        assert!(derived.classes.contains_key("Enclosure"));

        // the view itself is untouched
        assert!(view.schema().classes["Lion"].attributes.is_empty());
    }
}
