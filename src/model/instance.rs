//! Dynamic model instances

use super::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An object of a model class: its class name and field values in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub class_name: String,
    pub fields: IndexMap<String, Value>,
}

impl Instance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder form of [`Instance::set`]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Remove a field, yielding `Null` when it is absent
    pub fn take(&mut self, field: &str) -> Value {
        self.fields.shift_remove(field).unwrap_or(Value::Null)
    }

    /// Whether any field holds a non-null value
    pub fn has_values(&self) -> bool {
        self.fields.values().any(|v| !v.is_null())
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_fields() {
        let mut person = Instance::new("Person")
            .with("id", "P:001")
            .with("age", 33)
            .with("nickname", None::<String>);
        assert_eq!(person.get_str("id"), Some("P:001"));
        assert_eq!(person.get("age").and_then(Value::as_integer), Some(33));
        assert!(person.has_values());
        assert_eq!(person.to_string(), "Person(id=\"P:001\", age=33, nickname=null)");

        assert_eq!(person.take("age"), Value::Integer(33));
        assert_eq!(person.take("age"), Value::Null);
        assert!(!Instance::new("Empty").with("x", Value::Null).has_values());
    }
}
