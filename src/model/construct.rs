//! Instance construction with cardinality and type checks

use super::error::{ModelError, ModelResult};
use super::instance::Instance;
use super::meta::{ClassMeta, FieldDescriptor, FieldKind, ModelModule};
use super::value::Value;
use chrono::NaiveDate;
use indexmap::IndexMap;

impl ModelModule {
    /// Build an instance of `class_name` from a field map.
    ///
    /// Every field must be declared by the class, required fields must be present,
    /// list-valued fields must hold lists and single-valued fields must not. Scalars are
    /// checked against the field kind: integers widen to decimals, ISO dates are parsed,
    /// language tags are dropped from single strings and enum text must be permissible.
    pub fn construct(
        &self,
        class_name: &str,
        mut fields: IndexMap<String, Value>,
    ) -> ModelResult<Instance> {
        let class = self.class(class_name)?;
        if let Some(unknown) = fields.keys().find(|name| class.field(name).is_none()) {
            return Err(ModelError::UnknownField {
                class: class.name.clone(),
                field: unknown.clone(),
            });
        }

        let mut instance = Instance::new(class_name);
        for field in &class.fields {
            let value = fields.shift_remove(&field.name).unwrap_or(Value::Null);
            if value.is_null() {
                if field.required {
                    return Err(ModelError::MissingField {
                        class: class.name.clone(),
                        field: field.name.clone(),
                    });
                }
                continue;
            }
            let value = self.check_field(class, field, value)?;
            instance.set(field.name.clone(), value);
        }
        Ok(instance)
    }

    fn check_field(
        &self,
        class: &ClassMeta,
        field: &FieldDescriptor,
        value: Value,
    ) -> ModelResult<Value> {
        let cardinality = |expected| ModelError::Cardinality {
            class: class.name.clone(),
            field: field.name.clone(),
            expected,
        };
        match value {
            Value::List(items) if field.multivalued => items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(|v| self.check_scalar(class, field, v))
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::List),
            Value::Map(map) if field.multivalued => map
                .into_iter()
                .map(|(key, v)| Ok((key, self.check_scalar(class, field, v)?)))
                .collect::<ModelResult<IndexMap<_, _>>>()
                .map(Value::Map),
            _ if field.multivalued => Err(cardinality("a list")),
            Value::List(items) => {
                let untagged = items.iter().all(|v| matches!(v, Value::String(_)));
                if field.kind == FieldKind::String && items.len() > 1 && untagged {
                    Err(ModelError::MultipleUntaggedValues {
                        class: class.name.clone(),
                        field: field.name.clone(),
                    })
                } else {
                    Err(cardinality("a single value"))
                }
            }
            Value::Map(_) => Err(cardinality("a single value")),
            scalar => self.check_scalar(class, field, scalar),
        }
    }

    fn check_scalar(
        &self,
        class: &ClassMeta,
        field: &FieldDescriptor,
        value: Value,
    ) -> ModelResult<Value> {
        let invalid = |message: String| ModelError::InvalidValue {
            class: class.name.clone(),
            field: field.name.clone(),
            message,
        };
        match (&field.kind, value) {
            (FieldKind::String | FieldKind::Uri, Value::String(s)) => Ok(Value::String(s)),
            (FieldKind::String, Value::LangString { value, .. }) => Ok(Value::String(value)),
            (FieldKind::Integer, Value::Integer(i)) => Ok(Value::Integer(i)),
            (FieldKind::Decimal, Value::Decimal(d)) => Ok(Value::Decimal(d)),
            (FieldKind::Decimal, Value::Integer(i)) => Ok(Value::Decimal(i as f64)),
            (FieldKind::Boolean, Value::Boolean(b)) => Ok(Value::Boolean(b)),
            (FieldKind::Date, Value::Date(d)) => Ok(Value::Date(d)),
            (FieldKind::Date, Value::String(s)) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| invalid(format!("{} is not a date: {}", s, e))),
            (FieldKind::Enum(name), Value::String(text)) => {
                let permitted = self
                    .enums
                    .get(name)
                    .map_or(true, |e| e.permissible_values.contains_key(&text));
                if permitted {
                    Ok(Value::String(text))
                } else {
                    Err(invalid(format!("{} is not a permissible value of {}", text, name)))
                }
            }
            (FieldKind::Object(_), Value::Object(instance)) => Ok(Value::Object(instance)),
            (FieldKind::Object(_), Value::String(reference)) => Ok(Value::String(reference)),
            (kind, other) => Err(invalid(format!(
                "expected {} but got {}",
                kind,
                other.type_name()
            ))),
        }
    }
}
