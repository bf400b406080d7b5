//! Induced slots and classes
//!
//! An induced slot is the slot as seen from one class: ancestor slot values are
//! propagated, class attributes take the place of top-level slots, and slot_usage
//! records of the class and its ancestors are folded in, nearest class last.

use super::error::{SchemaViewError, SchemaViewResult};
use super::traversal::Traversal;
use super::SchemaView;
use crate::schema::{
    camelcase, underscore, ClassDefinition, ElementKind, EnumDefinition, SlotDefinition,
    TypeDefinition,
};
use indexmap::IndexMap;
use tracing::debug;

/// Annotation marking identifier values that must be percent-encoded
pub const PERCENT_ENCODED: &str = "percent_encoded";

/// `class_uri` of the catch-all class
const LINKML_ANY: &str = "linkml:Any";

impl SchemaView {
    /// Slot names of a class: its own and, unless `direct`, those of every ancestor.
    /// With `attributes` set, attribute names are included.
    pub fn class_slots(
        &self,
        class_name: &str,
        direct: bool,
        attributes: bool,
    ) -> SchemaViewResult<Vec<String>> {
        let flags = format!("{}{}", direct as u8, attributes as u8);
        self.try_memoized("class_slots", &[class_name, flags.as_str()], || {
            let ancestors = if direct {
                vec![class_name.to_string()]
            } else {
                self.class_ancestors(class_name, Traversal::default())?
            };
            let mut slots: Vec<String> = Vec::new();
            for ancestor in &ancestors {
                let class = self.require_class(ancestor, true)?;
                let names = class.slots.iter().chain(
                    class
                        .attributes
                        .keys()
                        .filter(|_| attributes),
                );
                for name in names {
                    if !slots.contains(name) {
                        slots.push(name.clone());
                    }
                }
            }
            Ok(slots)
        })
    }

    /// The slot `slot_name` with inheritance and slot_usage resolved, optionally in the
    /// context of `class_name`
    pub fn induced_slot(
        &self,
        slot_name: &str,
        class_name: Option<&str>,
    ) -> SchemaViewResult<SlotDefinition> {
        self.try_memoized(
            "induced_slot",
            &[slot_name, class_name.unwrap_or_default()],
            || self.compute_induced_slot(slot_name, class_name),
        )
    }

    fn compute_induced_slot(
        &self,
        slot_name: &str,
        class_name: Option<&str>,
    ) -> SchemaViewResult<SlotDefinition> {
        let mut from_attribute = false;
        let own = match class_name {
            Some(class_name) => {
                self.require_class(class_name, true)?;
                match self.find_attribute(slot_name, class_name)? {
                    Some(attribute) => {
                        from_attribute = true;
                        Some(attribute)
                    }
                    None => self.slot_definition(slot_name, true).cloned(),
                }
            }
            None => self.get_slot(slot_name, true, true),
        };
        let own = own.ok_or_else(|| SchemaViewError::NoSuchSlot {
            slot: slot_name.to_string(),
            class: class_name.unwrap_or("None").to_string(),
        })?;

        let mut induced = own.clone();
        if !from_attribute {
            let ancestors = self.slot_ancestors(slot_name, Traversal::default())?;
            for ancestor in ancestors.iter().rev() {
                if let Some(ancestor_slot) = self.slot_definition(ancestor, true) {
                    induced.inherit_from(ancestor_slot);
                }
            }
            induced.reassert(&own);
        }

        if let Some(class_name) = class_name {
            let classes = self.class_ancestors(class_name, Traversal::default())?;
            for ancestor in classes.iter().rev() {
                induced.owner = Some(ancestor.clone());
                let class = self.require_class(ancestor, true)?;
                if let Some(usage) = class.slot_usage.get(slot_name) {
                    debug!("Applying slot_usage of {} to {}", ancestor, slot_name);
                    induced.apply_usage(usage);
                }
            }
        }

        if induced.range.as_deref().map_or(true, str::is_empty) {
            induced.range = self.schema().default_range.clone();
        }
        if induced.inlined_as_list == Some(true) {
            induced.inlined = Some(true);
        }
        if induced.is_identifier() || induced.is_key() {
            induced.required = Some(true);
        }
        if induced.alias.as_deref().map_or(true, str::is_empty) {
            induced.alias = Some(underscore(slot_name));
        }
        for class in self.class_index(true).into_values() {
            let declares = class.slots.iter().any(|s| s == &induced.name)
                || class.attributes.contains_key(&induced.name);
            if declares && !induced.domain_of.contains(&class.name) {
                induced.domain_of.push(class.name.clone());
            }
        }
        Ok(induced)
    }

    /// Attribute declared on the class or its nearest ancestor, in `class_ancestors` order
    /// (mixins are visited before the is_a parent)
    fn find_attribute(
        &self,
        slot_name: &str,
        class_name: &str,
    ) -> SchemaViewResult<Option<SlotDefinition>> {
        let found = self
            .class_ancestors(class_name, Traversal::default())?
            .iter()
            .find_map(|ancestor| {
                self.get_class(ancestor, true)
                    .and_then(|c| c.attributes.get(slot_name))
            })
            .cloned();
        Ok(found)
    }

    /// Induced slots of every slot of a class
    pub fn class_induced_slots(&self, class_name: &str) -> SchemaViewResult<Vec<SlotDefinition>> {
        self.try_memoized("class_induced_slots", &[class_name], || {
            self.class_slots(class_name, false, true)?
                .iter()
                .map(|slot| self.induced_slot(slot, Some(class_name)))
                .collect()
        })
    }

    /// The class with every induced slot materialized as an attribute
    pub fn induced_class(&self, class_name: &str) -> SchemaViewResult<ClassDefinition> {
        let mut class = self.require_class(class_name, true)?.clone();
        for slot in self.class_induced_slots(class_name)? {
            class.attributes.insert(slot.name.clone(), slot);
        }
        class.slots.clear();
        Ok(class)
    }

    /// The type with `uri`, `base` and `repr` inherited along its `typeof` chain
    pub fn induced_type(&self, type_name: &str) -> SchemaViewResult<TypeDefinition> {
        let mut t = self.require_type(type_name, true)?.clone();
        if let Some(parent) = t.typeof_.clone() {
            if parent != type_name {
                let parent = self.induced_type(&parent)?;
                t.uri = t.uri.or(parent.uri);
                t.base = t.base.or(parent.base);
                t.repr = t.repr.or(parent.repr);
            }
        }
        Ok(t)
    }

    pub fn induced_enum(&self, enum_name: &str) -> SchemaViewResult<EnumDefinition> {
        Ok(self.require_enum(enum_name, true)?.clone())
    }

    /// Induced identifier slot of a class, or its key slot when `use_key` is set
    pub fn get_identifier_slot(
        &self,
        class_name: &str,
        use_key: bool,
    ) -> SchemaViewResult<Option<SlotDefinition>> {
        if self.get_class(class_name, true).is_none() {
            return Ok(None);
        }
        let slots = self.class_induced_slots(class_name)?;
        if let Some(slot) = slots.iter().find(|s| s.is_identifier()) {
            return Ok(Some(slot.clone()));
        }
        if use_key {
            return self.get_key_slot(class_name);
        }
        Ok(None)
    }

    pub fn get_key_slot(&self, class_name: &str) -> SchemaViewResult<Option<SlotDefinition>> {
        if self.get_class(class_name, true).is_none() {
            return Ok(None);
        }
        Ok(self
            .class_induced_slots(class_name)?
            .into_iter()
            .find(|s| s.is_key()))
    }

    /// Induced slot whose value names the instance's type
    pub fn get_type_designator_slot(
        &self,
        class_name: &str,
    ) -> SchemaViewResult<Option<SlotDefinition>> {
        Ok(self
            .class_induced_slots(class_name)?
            .into_iter()
            .find(|s| s.designates_type()))
    }

    /// Whether values of a class-ranged slot are nested rather than referenced
    pub fn is_inlined(&self, slot: &SlotDefinition) -> SchemaViewResult<bool> {
        let Some(range) = slot.range.as_deref() else {
            return Ok(false);
        };
        if self.get_class(range, true).is_none() {
            return Ok(false);
        }
        if slot.inlined == Some(true) || slot.inlined_as_list == Some(true) {
            return Ok(true);
        }
        Ok(self.get_identifier_slot(range, true)?.is_none())
    }

    /// Multivalued flag of the class-less induced slot
    pub fn is_multivalued(&self, slot_name: &str) -> SchemaViewResult<bool> {
        Ok(self.induced_slot(slot_name, None)?.is_multivalued())
    }

    /// The slot range followed by the ranges of its `exactly_one_of` and `any_of` expressions
    pub fn slot_range_as_union(&self, slot: &SlotDefinition) -> Vec<String> {
        let mut ranges: Vec<String> = slot.range.iter().cloned().collect();
        for expression in slot.exactly_one_of.iter().chain(&slot.any_of) {
            if let Some(range) = &expression.range {
                if !ranges.contains(range) {
                    ranges.push(range.clone());
                }
            }
        }
        ranges
    }

    /// Element kinds a slot's values may take
    pub fn slot_applicable_range_elements(
        &self,
        slot: &SlotDefinition,
    ) -> SchemaViewResult<Vec<ElementKind>> {
        if slot.range.is_none() {
            return Err(SchemaViewError::NoApplicableRange(slot.name.clone()));
        }
        let mut kinds: Vec<ElementKind> = Vec::new();
        let mut push = |kind: ElementKind| {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        };
        for range in self.slot_range_as_union(slot) {
            if let Some(class) = self.get_class(&range, true) {
                push(ElementKind::Class);
                if class.class_uri.as_deref() == Some(LINKML_ANY) {
                    push(ElementKind::Enum);
                    push(ElementKind::Type);
                }
            } else if self.get_enum(&range, true).is_some() {
                push(ElementKind::Enum);
            } else if self.get_type(&range, true).is_some() {
                push(ElementKind::Type);
            } else {
                return Err(SchemaViewError::UnresolvedReference {
                    kind: ElementKind::Slot,
                    name: slot.name.clone(),
                    parent: range,
                });
            }
        }
        if kinds.is_empty() {
            return Err(SchemaViewError::NoApplicableRange(slot.name.clone()));
        }
        Ok(kinds)
    }

    /// Classes using a slot directly or as an attribute; with `include_induced`, also
    /// classes that inherit it
    pub fn get_classes_by_slot(
        &self,
        slot: &SlotDefinition,
        include_induced: bool,
    ) -> SchemaViewResult<Vec<String>> {
        let mut classes = Vec::new();
        for class in self.class_index(true).into_values() {
            let direct = class.slots.contains(&slot.name) || class.attributes.contains_key(&slot.name);
            let induced = include_induced
                && !direct
                && self
                    .class_slots(&class.name, false, true)?
                    .contains(&slot.name);
            if direct || induced {
                classes.push(class.name.clone());
            }
        }
        Ok(classes)
    }

    /// Slots and slot_usage records whose range is the enum
    pub fn get_slots_by_enum(&self, enum_name: &str) -> SchemaViewResult<Vec<SlotDefinition>> {
        let mut slots: Vec<SlotDefinition> = Vec::new();
        let usages = self
            .class_index(true)
            .into_values()
            .flat_map(|c| c.slot_usage.values().cloned())
            .collect::<Vec<_>>();
        let candidates = self
            .all_slots(Default::default(), true, true)?
            .into_values()
            .chain(usages);
        for slot in candidates {
            if slot.range.as_deref() == Some(enum_name) && !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        Ok(slots)
    }

    /// Classes with a slot_usage record for the slot
    pub fn get_classes_modifying_slot(&self, slot_name: &str) -> Vec<String> {
        self.class_index(true)
            .into_values()
            .filter(|c| c.slot_usage.contains_key(slot_name))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Whether identifier values of this slot are percent-encoded, i.e. its range type
    /// or one of that type's ancestors carries the `percent_encoded` annotation
    pub fn is_slot_percent_encoded(&self, slot: &SlotDefinition) -> SchemaViewResult<bool> {
        let Some(range) = slot.range.as_deref() else {
            return Ok(false);
        };
        if self.get_type(range, true).is_none() {
            return Ok(false);
        }
        for ancestor in self.type_ancestors(range, Traversal::default())? {
            let t = self.require_type(&ancestor, true)?;
            if t.annotations.contains_key(PERCENT_ENCODED) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Slots keyed by their code-safe (underscored) name
    pub fn slot_name_mappings(&self) -> SchemaViewResult<IndexMap<String, SlotDefinition>> {
        Ok(self
            .all_slots(Default::default(), true, true)?
            .into_values()
            .map(|s| (underscore(&s.name), s))
            .collect())
    }

    /// Classes keyed by their code-safe (camel-cased) name
    pub fn class_name_mappings(&self) -> SchemaViewResult<IndexMap<String, ClassDefinition>> {
        Ok(self
            .all_classes(Default::default(), true)?
            .into_values()
            .map(|c| (camelcase(&c.name), c))
            .collect())
    }
}
