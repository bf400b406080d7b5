//! Reverse index of where elements are used by induced slots

use super::error::SchemaViewResult;
use super::SchemaView;
use serde::{Deserialize, Serialize};
use std::fmt;
use indexmap::IndexMap;

/// Metaslot through which an element is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageRole {
    #[serde(rename = "domain")]
    Domain,
    #[serde(rename = "range")]
    Range,
    #[serde(rename = "any_of[range]")]
    AnyOf,
    #[serde(rename = "exactly_one_of[range]")]
    ExactlyOneOf,
}

impl fmt::Display for UsageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UsageRole::Domain => "domain",
            UsageRole::Range => "range",
            UsageRole::AnyOf => "any_of[range]",
            UsageRole::ExactlyOneOf => "exactly_one_of[range]",
        };
        f.write_str(label)
    }
}

/// One use of an element by a slot of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaUsage {
    /// Class whose induced slot refers to the element
    pub used_by: String,
    pub slot: String,
    pub metaslot: UsageRole,
    /// The referenced element
    pub used: String,
    /// The slot is inherited rather than declared on `used_by`
    pub inferred: bool,
}

impl SchemaView {
    /// Element name to every induced slot that names it as domain or range
    pub fn usage_index(&self) -> SchemaViewResult<IndexMap<String, Vec<SchemaUsage>>> {
        let mut index: IndexMap<String, Vec<SchemaUsage>> = IndexMap::new();
        for class in self.class_index(true).into_values() {
            for slot_name in self.class_slots(&class.name, false, true)? {
                let slot = self.induced_slot(&slot_name, Some(&class.name))?;
                let inferred = !class.slots.contains(&slot_name);

                let mut uses: Vec<(UsageRole, &str)> = Vec::new();
                uses.extend(slot.domain.as_deref().map(|d| (UsageRole::Domain, d)));
                uses.extend(slot.range.as_deref().map(|r| (UsageRole::Range, r)));
                uses.extend(
                    slot.any_of
                        .iter()
                        .filter_map(|x| x.range.as_deref())
                        .map(|r| (UsageRole::AnyOf, r)),
                );
                uses.extend(
                    slot.exactly_one_of
                        .iter()
                        .filter_map(|x| x.range.as_deref())
                        .map(|r| (UsageRole::ExactlyOneOf, r)),
                );

                for (role, used) in uses {
                    index.entry(used.to_string()).or_default().push(SchemaUsage {
                        used_by: class.name.clone(),
                        slot: slot_name.clone(),
                        metaslot: role,
                        used: used.to_string(),
                        inferred,
                    });
                }
            }
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_index() {
        let view = SchemaView::from_yaml(
            r#"
id: http://example.org/usage
name: usage
imports: [linkml:types]
default_range: string
slots:
  id: {}
  pet:
    range: Pet
    any_of:
      - range: Dog
      - range: Cat
classes:
  Pet: {}
  Dog:
    is_a: Pet
  Cat:
    is_a: Pet
  Person:
    slots: [id, pet]
  Student:
    is_a: Person
"#,
        )
        .unwrap();
        let index = view.usage_index().unwrap();

        let pet_uses = &index["Pet"];
        assert_eq!(pet_uses.len(), 2);
        assert_eq!(pet_uses[0].used_by, "Person");
        assert_eq!(pet_uses[0].metaslot, UsageRole::Range);
        assert!(!pet_uses[0].inferred);
        assert_eq!(pet_uses[1].used_by, "Student");
        assert!(pet_uses[1].inferred);

        let dog_uses = &index["Dog"];
        assert_eq!(dog_uses[0].metaslot.to_string(), "any_of[range]");
        assert_eq!(index["string"].len(), 2);
    }
}
