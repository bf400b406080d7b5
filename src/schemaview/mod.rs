//! Schema view
//!
//! A `SchemaView` wraps a root schema together with its transitive import closure and
//! answers queries over the merged result: element lookup, ordering, is_a/mixin
//! traversal, induced slots and classes, URI resolution and usage indexing.
//!
//! Derived queries are memoized per view. Every mutation bumps the view revision,
//! which is part of every memo key, so results computed before a mutation are never
//! returned after it.
//!
//! # Example
//!
//! ```rust
//! use linkml_runtime::schemaview::SchemaView;
//!
//! let view = SchemaView::from_yaml(r#"
//! id: http://example.org/people
//! name: people
//! imports:
//!   - linkml:types
//! default_range: string
//! slots:
//!   age:
//!     range: integer
//! classes:
//!   Person:
//!     slots: [age]
//!     slot_usage:
//!       age:
//!         minimum_value: 0
//! "#).unwrap();
//!
//! let age = view.induced_slot("age", Some("Person")).unwrap();
//! assert_eq!(age.range.as_deref(), Some("integer"));
//! assert_eq!(age.minimum_value, Some(0.0));
//! ```

mod cache;
mod error;
mod imports;
mod induction;
mod mutation;
mod traversal;
mod uri;
mod usage;

pub use error::{SchemaViewError, SchemaViewResult};
pub use imports::{FileSchemaLoader, InMemorySchemaLoader, SchemaLoader};
pub use traversal::Traversal;
pub use usage::{SchemaUsage, UsageRole};

use crate::rdf::Namespaces;
use crate::schema::{
    ClassDefinition, Definition, Element, ElementKind, ElementRef, EnumDefinition,
    SchemaDefinition, SlotDefinition, SubsetDefinition, TypeDefinition,
};
use cache::{Memo, MemoKey, Memoize};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Ordering applied by the `all_*` element listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderedBy {
    /// Declaration order across the closure
    #[default]
    Preserve,
    /// Case-sensitive name order
    Lexical,
    /// Ascending `rank`, unranked last
    Rank,
    /// Parents before children
    Inheritance,
}

/// Queryable view over a schema and its imports
#[derive(Debug)]
pub struct SchemaView {
    schema_map: IndexMap<String, SchemaDefinition>,
    root: String,
    importmap: IndexMap<String, String>,
    loader: Box<dyn SchemaLoader>,
    modifications: u64,
    uuid: Uuid,
    memo: Memo,
}

impl SchemaView {
    /// Build a view, loading imports from disk relative to the schema's source file
    pub fn new(schema: SchemaDefinition) -> SchemaViewResult<Self> {
        Self::with_loader(schema, FileSchemaLoader::default())
    }

    pub fn with_loader(
        schema: SchemaDefinition,
        loader: impl SchemaLoader + 'static,
    ) -> SchemaViewResult<Self> {
        Self::with_options(schema, loader, IndexMap::new())
    }

    /// Build a view with an import map (`name -> location`, or `prefix: -> directory`)
    pub fn with_options(
        schema: SchemaDefinition,
        loader: impl SchemaLoader + 'static,
        importmap: IndexMap<String, String>,
    ) -> SchemaViewResult<Self> {
        let root = schema.name.clone();
        let mut schema_map = IndexMap::new();
        schema_map.insert(root.clone(), schema);

        let mut view = Self {
            schema_map,
            root,
            importmap,
            loader: Box::new(loader),
            modifications: 0,
            uuid: Uuid::new_v4(),
            memo: Memo::default(),
        };
        view.load_imports()?;
        info!(
            "Created schema view {} ({} schemas in closure)",
            view.root,
            view.schema_map.len()
        );
        Ok(view)
    }

    /// Parse a YAML document and build a view over it
    pub fn from_yaml(yaml: &str) -> SchemaViewResult<Self> {
        Self::new(SchemaDefinition::from_yaml_str(yaml)?)
    }

    /// Read a schema file and build a view; relative imports resolve next to it
    pub fn from_path(path: impl AsRef<Path>) -> SchemaViewResult<Self> {
        Self::new(SchemaDefinition::from_path(path)?)
    }

    /// The root schema
    pub fn schema(&self) -> &SchemaDefinition {
        self.root_schema()
    }

    /// Direct access to the root schema; call [`SchemaView::set_modified`] after editing.
    pub fn schema_mut(&mut self) -> &mut SchemaDefinition {
        self.schema_map
            .entry(self.root.clone())
            .or_insert_with(SchemaDefinition::default)
    }

    /// Every loaded schema keyed by the name it was imported under
    pub fn schema_map(&self) -> &IndexMap<String, SchemaDefinition> {
        &self.schema_map
    }

    /// Number of mutations applied so far
    pub fn revision(&self) -> u64 {
        self.modifications
    }

    /// Number of memoized query results, including ones from earlier revisions
    pub fn cache_len(&self) -> usize {
        self.memo.len()
    }

    /// Drop every memoized result
    pub fn clear_cache(&self) {
        self.memo.clear();
    }

    /// Record a mutation: re-tag element origins and invalidate derived results
    pub fn set_modified(&mut self) {
        self.modifications += 1;
        self.inject_metadata();
        debug!(
            "Schema view {} modified, revision {}",
            self.root, self.modifications
        );
    }

    fn root_schema(&self) -> &SchemaDefinition {
        // The root entry is inserted on construction and never removed.
        &self.schema_map[self.root.as_str()]
    }

    pub(crate) fn memoized<T, F>(&self, method: &'static str, args: &[&str], compute: F) -> T
    where
        T: Memoize,
        F: FnOnce() -> T,
    {
        let key = MemoKey::new(method, args.iter().copied(), self.modifications);
        match self
            .memo
            .get_or_try_insert(key, || Ok::<T, Infallible>(compute()))
        {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub(crate) fn try_memoized<T, F>(
        &self,
        method: &'static str,
        args: &[&str],
        compute: F,
    ) -> SchemaViewResult<T>
    where
        T: Memoize,
        F: FnOnce() -> SchemaViewResult<T>,
    {
        let key = MemoKey::new(method, args.iter().copied(), self.modifications);
        self.memo.get_or_try_insert(key, compute)
    }

    // ---- imports ----

    /// Load one import the way the closure resolver would
    pub fn load_import(&self, name: &str) -> SchemaViewResult<SchemaDefinition> {
        imports::load_import(
            self.loader.as_ref(),
            &self.importmap,
            self.root_schema().source_file.as_deref(),
            name,
        )
    }

    /// Load every import reachable from the root that is not loaded yet
    pub fn load_imports(&mut self) -> SchemaViewResult<()> {
        let loader = self.loader.as_ref();
        let importmap = &self.importmap;
        let root_source = self.schema_map[self.root.as_str()].source_file.clone();
        let schema_map = &mut self.schema_map;

        imports::closure_names(&self.root, |sn| {
            if !schema_map.contains_key(sn) {
                let schema =
                    imports::load_import(loader, importmap, root_source.as_deref(), sn)?;
                schema_map.insert(sn.to_string(), schema);
            }
            Ok::<_, SchemaViewError>(schema_map.get(sn).map(|s| s.imports.clone()))
        })?;
        self.inject_metadata();
        Ok(())
    }

    fn inject_metadata(&mut self) {
        for schema in self.schema_map.values_mut() {
            let id = schema.id.clone();
            for class in schema.classes.values_mut() {
                class.set_from_schema(&id);
                for attribute in class.attributes.values_mut() {
                    attribute.set_from_schema(&id);
                }
            }
            for element in schema.enums.values_mut() {
                element.set_from_schema(&id);
            }
            for element in schema.slots.values_mut() {
                element.set_from_schema(&id);
            }
            for element in schema.subsets.values_mut() {
                element.set_from_schema(&id);
            }
            for element in schema.types.values_mut() {
                element.set_from_schema(&id);
            }
        }
    }

    /// Names of the schemas in the closure, most deeply imported first and the root last
    pub fn imports_closure(&self, imports: bool) -> Vec<String> {
        if !imports {
            return vec![self.root.clone()];
        }
        self.memoized("imports_closure", &[], || {
            let result = imports::closure_names(&self.root, |sn| {
                Ok::<_, Infallible>(self.schema_map.get(sn).map(|s| s.imports.clone()))
            });
            match result {
                Ok(names) => names,
                Err(never) => match never {},
            }
        })
    }

    /// Schemas of the closure in closure order
    pub fn all_schema(&self, imports: bool) -> Vec<&SchemaDefinition> {
        self.imports_closure(imports)
            .iter()
            .filter_map(|name| self.schema_map.get(name))
            .collect()
    }

    /// Prefixes declared anywhere in the closure; the root schema's declarations win
    pub fn namespaces(&self) -> Namespaces {
        self.memoized("namespaces", &[], || {
            let mut namespaces = Namespaces::new();
            for schema in self.all_schema(true) {
                for prefix in schema.prefixes.values() {
                    namespaces.add_prefix(
                        prefix.prefix_prefix.clone(),
                        prefix.prefix_reference.clone(),
                    );
                }
            }
            namespaces
        })
    }

    // ---- merged element indices ----

    /// Elements of one kind merged across the closure; later schemas override earlier ones
    /// while keeping the first position.
    pub(crate) fn merged<'a, T>(
        &'a self,
        imports: bool,
        select: fn(&SchemaDefinition) -> &IndexMap<String, T>,
    ) -> IndexMap<&'a str, &'a T> {
        let mut index = IndexMap::new();
        for schema in self.all_schema(imports) {
            for (name, element) in select(schema) {
                index.insert(name.as_str(), element);
            }
        }
        index
    }

    fn lookup<'a, T>(
        &'a self,
        imports: bool,
        name: &str,
        select: fn(&SchemaDefinition) -> &IndexMap<String, T>,
    ) -> Option<&'a T> {
        self.all_schema(imports)
            .into_iter()
            .rev()
            .find_map(|schema| select(schema).get(name))
    }

    pub(crate) fn class_index(&self, imports: bool) -> IndexMap<&str, &ClassDefinition> {
        self.merged(imports, |s| &s.classes)
    }

    pub(crate) fn slot_index(&self, imports: bool) -> IndexMap<&str, &SlotDefinition> {
        self.merged(imports, |s| &s.slots)
    }

    pub fn all_classes(
        &self,
        ordered_by: OrderedBy,
        imports: bool,
    ) -> SchemaViewResult<IndexMap<String, ClassDefinition>> {
        Ok(owned(order_elements(self.class_index(imports), ordered_by)?))
    }

    /// Top-level slots plus, when `attributes` is set, class attributes whose name is
    /// not already a slot
    pub fn all_slots(
        &self,
        ordered_by: OrderedBy,
        imports: bool,
        attributes: bool,
    ) -> SchemaViewResult<IndexMap<String, SlotDefinition>> {
        let mut slots = self.slot_index(imports);
        if attributes {
            for class in self.class_index(imports).into_values() {
                for (name, attribute) in &class.attributes {
                    slots.entry(name.as_str()).or_insert(attribute);
                }
            }
        }
        Ok(owned(order_elements(slots, ordered_by)?))
    }

    pub fn all_types(
        &self,
        ordered_by: OrderedBy,
        imports: bool,
    ) -> SchemaViewResult<IndexMap<String, TypeDefinition>> {
        Ok(owned(order_elements(self.merged(imports, |s| &s.types), ordered_by)?))
    }

    pub fn all_enums(
        &self,
        ordered_by: OrderedBy,
        imports: bool,
    ) -> SchemaViewResult<IndexMap<String, EnumDefinition>> {
        Ok(owned(order_elements(self.merged(imports, |s| &s.enums), ordered_by)?))
    }

    pub fn all_subsets(
        &self,
        ordered_by: OrderedBy,
        imports: bool,
    ) -> SchemaViewResult<IndexMap<String, SubsetDefinition>> {
        Ok(owned(order_elements(self.merged(imports, |s| &s.subsets), ordered_by)?))
    }

    /// Every element keyed by name; on a name clash slots beat classes, enums beat slots,
    /// then types, then subsets.
    pub fn all_elements(&self, imports: bool) -> IndexMap<String, Definition> {
        let mut elements = IndexMap::new();
        for (name, class) in self.class_index(imports) {
            elements.insert(name.to_string(), Definition::Class(class.clone()));
        }
        for (name, slot) in self.slot_index(imports) {
            elements.insert(name.to_string(), Definition::Slot(slot.clone()));
        }
        for class in self.class_index(imports).into_values() {
            for (name, attribute) in &class.attributes {
                if !elements.contains_key(name.as_str()) {
                    elements.insert(name.clone(), Definition::Slot(attribute.clone()));
                }
            }
        }
        for (name, e) in self.merged(imports, |s| &s.enums) {
            elements.insert(name.to_string(), Definition::Enum(e.clone()));
        }
        for (name, t) in self.merged(imports, |s| &s.types) {
            elements.insert(name.to_string(), Definition::Type(t.clone()));
        }
        for (name, s) in self.merged(imports, |s| &s.subsets) {
            elements.insert(name.to_string(), Definition::Subset(s.clone()));
        }
        elements
    }

    // ---- lookup ----

    pub fn get_class(&self, name: &str, imports: bool) -> Option<&ClassDefinition> {
        self.lookup(imports, name, |s| &s.classes)
    }

    /// Like [`SchemaView::get_class`], failing on a missing class
    pub fn require_class(&self, name: &str, imports: bool) -> SchemaViewResult<&ClassDefinition> {
        self.get_class(name, imports)
            .ok_or_else(|| SchemaViewError::unknown(ElementKind::Class, name))
    }

    pub fn get_type(&self, name: &str, imports: bool) -> Option<&TypeDefinition> {
        self.lookup(imports, name, |s| &s.types)
    }

    pub fn require_type(&self, name: &str, imports: bool) -> SchemaViewResult<&TypeDefinition> {
        self.get_type(name, imports)
            .ok_or_else(|| SchemaViewError::unknown(ElementKind::Type, name))
    }

    pub fn get_enum(&self, name: &str, imports: bool) -> Option<&EnumDefinition> {
        self.lookup(imports, name, |s| &s.enums)
    }

    pub fn require_enum(&self, name: &str, imports: bool) -> SchemaViewResult<&EnumDefinition> {
        self.get_enum(name, imports)
            .ok_or_else(|| SchemaViewError::unknown(ElementKind::Enum, name))
    }

    pub fn get_subset(&self, name: &str, imports: bool) -> Option<&SubsetDefinition> {
        self.lookup(imports, name, |s| &s.subsets)
    }

    pub fn require_subset(
        &self,
        name: &str,
        imports: bool,
    ) -> SchemaViewResult<&SubsetDefinition> {
        self.get_subset(name, imports)
            .ok_or_else(|| SchemaViewError::unknown(ElementKind::Subset, name))
    }

    /// A top-level slot, without looking at class attributes
    pub(crate) fn slot_definition(&self, name: &str, imports: bool) -> Option<&SlotDefinition> {
        self.lookup(imports, name, |s| &s.slots)
    }

    /// Look up a slot by name.
    ///
    /// Top-level slots are preferred. Otherwise, with `attributes` set, class attributes
    /// are searched: a single match is returned with `owner` set to the declaring class,
    /// several matches yield a bare stub carrying only the name.
    pub fn get_slot(&self, name: &str, imports: bool, attributes: bool) -> Option<SlotDefinition> {
        if let Some(slot) = self.slot_definition(name, imports) {
            return Some(slot.clone());
        }
        if !attributes {
            return None;
        }
        let mut found: Option<SlotDefinition> = None;
        for class in self.class_index(imports).into_values() {
            if let Some(attribute) = class.attributes.get(name) {
                if found.is_some() {
                    debug!("Attribute {} is declared by several classes", name);
                    return Some(SlotDefinition::new(name));
                }
                let mut slot = attribute.clone();
                slot.from_schema = class.from_schema.clone();
                slot.owner = Some(class.name.clone());
                found = Some(slot);
            }
        }
        found
    }

    pub fn require_slot(
        &self,
        name: &str,
        imports: bool,
        attributes: bool,
    ) -> SchemaViewResult<SlotDefinition> {
        self.get_slot(name, imports, attributes)
            .ok_or_else(|| SchemaViewError::unknown(ElementKind::Slot, name))
    }

    /// Resolve a bare name to the kind of element it denotes.
    ///
    /// Classes are tried first, then slots (including attributes), types, enums and subsets.
    pub fn resolve(&self, name: &str, imports: bool) -> Option<ElementRef> {
        let kind = if self.get_class(name, imports).is_some() {
            ElementKind::Class
        } else if self.get_slot(name, imports, true).is_some() {
            ElementKind::Slot
        } else if self.get_type(name, imports).is_some() {
            ElementKind::Type
        } else if self.get_enum(name, imports).is_some() {
            ElementKind::Enum
        } else if self.get_subset(name, imports).is_some() {
            ElementKind::Subset
        } else {
            return None;
        };
        Some(ElementRef::new(kind, name))
    }

    /// Owned copy of a resolved element
    pub fn definition(&self, element: &ElementRef, imports: bool) -> Option<Definition> {
        let name = element.name();
        match element {
            ElementRef::Class(_) => self.get_class(name, imports).cloned().map(Definition::Class),
            ElementRef::Slot(_) => self.get_slot(name, imports, true).map(Definition::Slot),
            ElementRef::Type(_) => self.get_type(name, imports).cloned().map(Definition::Type),
            ElementRef::Enum(_) => self.get_enum(name, imports).cloned().map(Definition::Enum),
            ElementRef::Subset(_) => self
                .get_subset(name, imports)
                .cloned()
                .map(Definition::Subset),
        }
    }

    pub fn get_element(&self, name: &str, imports: bool) -> Option<Definition> {
        self.resolve(name, imports)
            .and_then(|element| self.definition(&element, imports))
    }

    pub fn require_element(&self, name: &str, imports: bool) -> SchemaViewResult<Definition> {
        self.get_element(name, imports)
            .ok_or_else(|| SchemaViewError::UnknownElement {
                kind: ElementKind::Class,
                name: name.to_string(),
            })
    }

    /// Element name to the closure name of the schema declaring it
    pub fn element_by_schema_map(&self) -> IndexMap<String, String> {
        let mut index = IndexMap::new();
        for name in self.imports_closure(true) {
            let Some(schema) = self.schema_map.get(&name) else {
                continue;
            };
            let names = schema
                .classes
                .keys()
                .chain(schema.slots.keys())
                .chain(schema.types.keys())
                .chain(schema.enums.keys())
                .chain(schema.subsets.keys())
                .chain(schema.classes.values().flat_map(|c| c.attributes.keys()));
            for element in names {
                index.insert(element.clone(), name.clone());
            }
        }
        index
    }

    /// Closure name of the schema declaring an element
    pub fn in_schema(&self, element: &str) -> SchemaViewResult<String> {
        self.element_by_schema_map()
            .shift_remove(element)
            .ok_or_else(|| SchemaViewError::unknown(ElementKind::Class, element))
    }
}

impl PartialEq for SchemaView {
    fn eq(&self, other: &Self) -> bool {
        self.root_schema().id == other.root_schema().id
            && self.uuid == other.uuid
            && self.modifications == other.modifications
    }
}

fn owned<T: Clone>(index: IndexMap<&str, &T>) -> IndexMap<String, T> {
    index
        .into_iter()
        .map(|(name, element)| (name.to_string(), element.clone()))
        .collect()
}

/// Reorder a name-keyed element index
pub(crate) fn order_elements<'a, T: Element>(
    mut elements: IndexMap<&'a str, &'a T>,
    ordered_by: OrderedBy,
) -> SchemaViewResult<IndexMap<&'a str, &'a T>> {
    match ordered_by {
        OrderedBy::Preserve => {}
        OrderedBy::Lexical => elements.sort_keys(),
        OrderedBy::Rank => {
            elements.sort_by(|_, a, _, b| rank_key(*a).cmp(&rank_key(*b)));
        }
        OrderedBy::Inheritance => return order_by_inheritance(elements),
    }
    Ok(elements)
}

fn rank_key<T: Element>(element: &T) -> (bool, i64) {
    (element.rank().is_none(), element.rank().unwrap_or_default())
}

/// Repeatedly place the first element whose `is_a` parent is already placed.
/// A parent outside the element set does not hold its children back.
fn order_by_inheritance<'a, T: Element>(
    elements: IndexMap<&'a str, &'a T>,
) -> SchemaViewResult<IndexMap<&'a str, &'a T>> {
    let mut remaining: Vec<(&'a str, &'a T)> = elements.iter().map(|(k, v)| (*k, *v)).collect();
    let mut placed: IndexMap<&'a str, &'a T> = IndexMap::with_capacity(elements.len());

    while !remaining.is_empty() {
        let next = remaining.iter().position(|(_, element)| match element.is_a() {
            None => true,
            Some(parent) => placed.contains_key(parent) || !elements.contains_key(parent),
        });
        match next {
            Some(idx) => {
                let (name, element) = remaining.remove(idx);
                placed.insert(name, element);
            }
            None => {
                let stuck: Vec<&str> = remaining.iter().map(|(name, _)| *name).collect();
                return Err(SchemaViewError::Ordering(format!(
                    "is_a cycle among {}",
                    stuck.join(", ")
                )));
            }
        }
    }
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTRUMENTS: &str = r#"
id: http://example.org/instruments
name: instruments
default_prefix: ex
prefixes:
  ex: http://example.org/instruments/
classes:
  Clarinet:
    is_a: wind instrument
    rank: 5
  instrument:
    rank: 2
  Bassoon:
    is_a: wind instrument
    rank: 6
  wind instrument:
    is_a: instrument
    rank: 1
  Abacus:
    is_a: counting instrument
  counting instrument:
    is_a: instrument
    rank: 4
  Didgeridoo:
    is_a: wind instrument
    rank: 3
"#;

    fn view() -> SchemaView {
        SchemaView::from_yaml(INSTRUMENTS).unwrap()
    }

    fn names(view: &SchemaView, ordered_by: OrderedBy) -> Vec<String> {
        view.all_classes(ordered_by, true)
            .unwrap()
            .into_keys()
            .collect()
    }

    #[test]
    fn test_preserve_order() {
        assert_eq!(
            names(&view(), OrderedBy::Preserve),
            vec![
                "Clarinet",
                "instrument",
                "Bassoon",
                "wind instrument",
                "Abacus",
                "counting instrument",
                "Didgeridoo"
            ]
        );
    }

    #[test]
    fn test_lexical_order_is_case_sensitive() {
        assert_eq!(
            names(&view(), OrderedBy::Lexical),
            vec![
                "Abacus",
                "Bassoon",
                "Clarinet",
                "Didgeridoo",
                "counting instrument",
                "instrument",
                "wind instrument"
            ]
        );
    }

    #[test]
    fn test_rank_order_puts_unranked_last() {
        assert_eq!(
            names(&view(), OrderedBy::Rank),
            vec![
                "wind instrument",
                "instrument",
                "Didgeridoo",
                "counting instrument",
                "Clarinet",
                "Bassoon",
                "Abacus"
            ]
        );
    }

    #[test]
    fn test_inheritance_order() {
        assert_eq!(
            names(&view(), OrderedBy::Inheritance),
            vec![
                "instrument",
                "wind instrument",
                "Clarinet",
                "Bassoon",
                "counting instrument",
                "Abacus",
                "Didgeridoo"
            ]
        );
    }

    #[test]
    fn test_inheritance_cycle_fails() {
        let view = SchemaView::from_yaml(
            "id: http://example.org/c\nclasses:\n  A:\n    is_a: B\n  B:\n    is_a: A\n",
        )
        .unwrap();
        assert!(matches!(
            view.all_classes(OrderedBy::Inheritance, true),
            Err(SchemaViewError::Ordering(_))
        ));
    }

    #[test]
    fn test_from_schema_is_injected() {
        let view = view();
        let class = view.get_class("Clarinet", true).unwrap();
        assert_eq!(class.from_schema.as_deref(), Some("http://example.org/instruments"));
    }

    #[test]
    fn test_attribute_lookup() {
        let view = SchemaView::from_yaml(
            r#"
id: http://example.org/a
classes:
  Person:
    attributes:
      age:
        range: integer
      name: {}
  Pet:
    attributes:
      name: {}
"#,
        )
        .unwrap();
        let age = view.get_slot("age", true, true).unwrap();
        assert_eq!(age.owner.as_deref(), Some("Person"));
        assert_eq!(age.range.as_deref(), Some("integer"));

        let name = view.get_slot("name", true, true).unwrap();
        assert_eq!(name, SlotDefinition::new("name"));

        assert!(view.get_slot("age", true, false).is_none());
        assert!(matches!(
            view.require_slot("nope", true, true),
            Err(SchemaViewError::UnknownElement { kind: ElementKind::Slot, .. })
        ));
    }

    #[test]
    fn test_resolve_kinds() {
        let view = view();
        assert_eq!(
            view.resolve("Abacus", true),
            Some(ElementRef::Class("Abacus".to_string()))
        );
        assert_eq!(view.resolve("nothing", true), None);
        assert_eq!(view.in_schema("Abacus").unwrap(), "instruments");
    }

    #[test]
    fn test_identity_tracks_modifications() {
        let mut view = view();
        assert!(view != self::view());
        let before = view.revision();
        view.set_modified();
        assert_eq!(view.revision(), before + 1);
    }
}
