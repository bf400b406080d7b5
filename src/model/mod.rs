//! Model instances and their embedded metadata
//!
//! Instances are dynamic: a class name plus a map of field values. Typed structs take
//! part in RDF projection by implementing [`RdfModel`], converting to and from
//! [`Instance`] and pointing at the [`ModelModule`] metadata generated alongside them.
//!
//! # Example
//!
//! ```rust
//! use linkml_runtime::model::{ClassMeta, FieldDescriptor, FieldKind, ModelModule, Value};
//! use indexmap::IndexMap;
//!
//! let module = ModelModule::new("https://example.org/people", "people").with_class(
//!     ClassMeta::new("Person")
//!         .with_field(FieldDescriptor::new("id", FieldKind::Uri).as_identifier())
//!         .with_field(FieldDescriptor::new("name", FieldKind::String)),
//! );
//!
//! let mut fields = IndexMap::new();
//! fields.insert("id".to_string(), Value::from("P:001"));
//! fields.insert("name".to_string(), Value::from("Alice"));
//! let person = module.construct("Person", fields).unwrap();
//! assert_eq!(person.get_str("name"), Some("Alice"));
//! ```

mod construct;
mod error;
mod instance;
mod meta;
mod value;

pub use error::{ModelError, ModelResult};
pub use instance::Instance;
pub use meta::{ClassMeta, EnumMeta, FieldDescriptor, FieldKind, ModelModule};
pub(crate) use meta::expand;
pub use value::Value;

/// A typed model class that can be projected to and from RDF
pub trait RdfModel: Sized {
    /// Name of the class in [`RdfModel::module`]
    const CLASS_NAME: &'static str;

    /// Metadata of the module the class belongs to
    fn module() -> &'static ModelModule;

    fn to_instance(&self) -> Instance;

    fn from_instance(instance: Instance) -> ModelResult<Self>;

    /// Field table of this class
    fn fields() -> &'static [FieldDescriptor] {
        Self::module()
            .classes
            .get(Self::CLASS_NAME)
            .map(|class| class.fields.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    #[derive(Debug, PartialEq)]
    struct Person {
        id: String,
        name: Option<String>,
    }

    impl RdfModel for Person {
        const CLASS_NAME: &'static str = "Person";

        fn module() -> &'static ModelModule {
            static MODULE: OnceLock<ModelModule> = OnceLock::new();
            MODULE.get_or_init(|| {
                ModelModule::new("https://example.org/people", "people").with_class(
                    ClassMeta::new("Person")
                        .with_field(FieldDescriptor::new("id", FieldKind::Uri).as_identifier())
                        .with_field(FieldDescriptor::new("name", FieldKind::String)),
                )
            })
        }

        fn to_instance(&self) -> Instance {
            Instance::new(Self::CLASS_NAME)
                .with("id", self.id.as_str())
                .with("name", self.name.clone())
        }

        fn from_instance(mut instance: Instance) -> ModelResult<Self> {
            Ok(Person {
                id: instance.take("id").as_str().unwrap_or_default().to_string(),
                name: instance.take("name").as_str().map(str::to_string),
            })
        }
    }

    #[test]
    fn test_rdf_model_fields() {
        let names: Vec<&str> = Person::fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);

        let alice = Person {
            id: "P:001".to_string(),
            name: Some("Alice".to_string()),
        };
        let instance = alice.to_instance();
        assert_eq!(Person::from_instance(instance).unwrap(), alice);
    }
}
