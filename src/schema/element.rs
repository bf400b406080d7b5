//! Polymorphic access to schema elements
//!
//! `Element` exposes the fields every element kind shares. `ElementRef` names an element
//! together with its kind once a lookup has resolved it; `Definition` carries an owned copy.

use super::model::{
    Annotations, ClassDefinition, EnumDefinition, SlotDefinition, SubsetDefinition, TypeDefinition,
};
use super::names::{camelcase, underscore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element kinds a schema can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Class,
    Slot,
    Type,
    Enum,
    Subset,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElementKind::Class => "class",
            ElementKind::Slot => "slot",
            ElementKind::Type => "type",
            ElementKind::Enum => "enum",
            ElementKind::Subset => "subset",
        };
        write!(f, "{}", label)
    }
}

/// Mapping categories reported by `SchemaView::get_mappings`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingType {
    /// The element's own URI
    Itself,
    /// The URI synthesized from the default prefix
    Native,
    Exact,
    Narrow,
    Broad,
    Related,
    Close,
    /// Plain `mappings`
    Undefined,
}

impl MappingType {
    pub const ALL: [MappingType; 8] = [
        MappingType::Itself,
        MappingType::Native,
        MappingType::Exact,
        MappingType::Narrow,
        MappingType::Broad,
        MappingType::Related,
        MappingType::Close,
        MappingType::Undefined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MappingType::Itself => "self",
            MappingType::Native => "native",
            MappingType::Exact => "exact",
            MappingType::Narrow => "narrow",
            MappingType::Broad => "broad",
            MappingType::Related => "related",
            MappingType::Close => "close",
            MappingType::Undefined => "undefined",
        }
    }
}

/// Shared view over any schema element
pub trait Element {
    fn kind(&self) -> ElementKind;
    fn name(&self) -> &str;
    fn is_a(&self) -> Option<&str>;
    fn mixins(&self) -> &[String];
    fn from_schema(&self) -> Option<&str>;
    fn set_from_schema(&mut self, schema_id: &str);
    fn rank(&self) -> Option<i64>;
    fn annotations(&self) -> &Annotations;
    fn description(&self) -> Option<&str>;

    /// Explicit `class_uri` / `slot_uri` / type `uri` / `enum_uri`
    fn declared_uri(&self) -> Option<&str> {
        None
    }

    /// Local name used when synthesizing a URI
    fn uri_local_name(&self) -> String {
        self.name().to_string()
    }

    /// Declared mappings of one category; `Itself` and `Native` are computed by the view.
    fn mappings_of(&self, _mapping: MappingType) -> &[String] {
        &[]
    }
}

macro_rules! impl_element {
    ($ty:ty, $kind:expr, uri = $uri:ident, local = $local:expr) => {
        impl Element for $ty {
            fn kind(&self) -> ElementKind {
                $kind
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn is_a(&self) -> Option<&str> {
                self.is_a.as_deref()
            }

            fn mixins(&self) -> &[String] {
                &self.mixins
            }

            fn from_schema(&self) -> Option<&str> {
                self.from_schema.as_deref()
            }

            fn set_from_schema(&mut self, schema_id: &str) {
                self.from_schema = Some(schema_id.to_string());
            }

            fn rank(&self) -> Option<i64> {
                self.rank
            }

            fn annotations(&self) -> &Annotations {
                &self.annotations
            }

            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }

            fn declared_uri(&self) -> Option<&str> {
                self.$uri.as_deref()
            }

            fn uri_local_name(&self) -> String {
                let local: fn(&str) -> String = $local;
                local(&self.name)
            }

            fn mappings_of(&self, mapping: MappingType) -> &[String] {
                match mapping {
                    MappingType::Exact => &self.exact_mappings,
                    MappingType::Narrow => &self.narrow_mappings,
                    MappingType::Broad => &self.broad_mappings,
                    MappingType::Related => &self.related_mappings,
                    MappingType::Close => &self.close_mappings,
                    MappingType::Undefined => &self.mappings,
                    MappingType::Itself | MappingType::Native => &[],
                }
            }
        }
    };
}

impl_element!(ClassDefinition, ElementKind::Class, uri = class_uri, local = camelcase);
impl_element!(SlotDefinition, ElementKind::Slot, uri = slot_uri, local = underscore);
impl_element!(TypeDefinition, ElementKind::Type, uri = uri, local = underscore);
impl_element!(EnumDefinition, ElementKind::Enum, uri = enum_uri, local = str::to_string);

impl Element for SubsetDefinition {
    fn kind(&self) -> ElementKind {
        ElementKind::Subset
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_a(&self) -> Option<&str> {
        None
    }

    fn mixins(&self) -> &[String] {
        &[]
    }

    fn from_schema(&self) -> Option<&str> {
        self.from_schema.as_deref()
    }

    fn set_from_schema(&mut self, schema_id: &str) {
        self.from_schema = Some(schema_id.to_string());
    }

    fn rank(&self) -> Option<i64> {
        self.rank
    }

    fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn mappings_of(&self, mapping: MappingType) -> &[String] {
        match mapping {
            MappingType::Exact => &self.exact_mappings,
            MappingType::Narrow => &self.narrow_mappings,
            MappingType::Broad => &self.broad_mappings,
            MappingType::Related => &self.related_mappings,
            MappingType::Close => &self.close_mappings,
            MappingType::Undefined => &self.mappings,
            MappingType::Itself | MappingType::Native => &[],
        }
    }
}

/// A resolved reference to a named element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ElementRef {
    Class(String),
    Slot(String),
    Type(String),
    Enum(String),
    Subset(String),
}

impl ElementRef {
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            ElementKind::Class => ElementRef::Class(name),
            ElementKind::Slot => ElementRef::Slot(name),
            ElementKind::Type => ElementRef::Type(name),
            ElementKind::Enum => ElementRef::Enum(name),
            ElementKind::Subset => ElementRef::Subset(name),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Class(_) => ElementKind::Class,
            ElementRef::Slot(_) => ElementKind::Slot,
            ElementRef::Type(_) => ElementKind::Type,
            ElementRef::Enum(_) => ElementKind::Enum,
            ElementRef::Subset(_) => ElementKind::Subset,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ElementRef::Class(n)
            | ElementRef::Slot(n)
            | ElementRef::Type(n)
            | ElementRef::Enum(n)
            | ElementRef::Subset(n) => n,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

/// An owned element of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Class(ClassDefinition),
    Slot(SlotDefinition),
    Type(TypeDefinition),
    Enum(EnumDefinition),
    Subset(SubsetDefinition),
}

impl Definition {
    pub fn as_element(&self) -> &dyn Element {
        match self {
            Definition::Class(c) => c,
            Definition::Slot(s) => s,
            Definition::Type(t) => t,
            Definition::Enum(e) => e,
            Definition::Subset(s) => s,
        }
    }

    pub fn element_ref(&self) -> ElementRef {
        let element = self.as_element();
        ElementRef::new(element.kind(), element.name())
    }
}
