//! Element URIs and CURIE expansion

use super::error::{SchemaViewError, SchemaViewResult};
use super::SchemaView;
use crate::schema::{sfx, Element, ElementKind, MappingType, SchemaDefinition};
use indexmap::IndexMap;

impl SchemaView {
    /// URI or CURIE of a named element.
    ///
    /// The declared `class_uri` / `slot_uri` / type `uri` / `enum_uri` is used when present;
    /// otherwise one is synthesized from the default prefix of the declaring schema.
    pub fn get_uri(&self, element: &str, expand: bool) -> SchemaViewResult<String> {
        self.uri_memoized(element, expand, false)
    }

    /// The synthesized URI of an element, ignoring any declared URI
    pub fn get_native_uri(&self, element: &str, expand: bool) -> SchemaViewResult<String> {
        self.uri_memoized(element, expand, true)
    }

    fn uri_memoized(&self, element: &str, expand: bool, native: bool) -> SchemaViewResult<String> {
        let flags = format!("{}{}", expand as u8, native as u8);
        self.try_memoized("get_uri", &[element, flags.as_str()], || {
            let definition = self
                .get_element(element, true)
                .ok_or_else(|| SchemaViewError::unknown(ElementKind::Class, element))?;
            self.uri_of(definition.as_element(), expand, native)
        })
    }

    /// URI of an element value, for definitions that are not looked up by name
    /// (induced slots, attributes)
    pub fn uri_of(
        &self,
        element: &dyn Element,
        expand: bool,
        native: bool,
    ) -> SchemaViewResult<String> {
        if element.kind() == ElementKind::Subset {
            return Err(SchemaViewError::NoUri(element.name().to_string()));
        }
        let uri = match element.declared_uri() {
            Some(uri) if !native => uri.to_string(),
            _ => {
                let schema = self.declaring_schema(element)?;
                let prefix = schema.effective_default_prefix();
                let local = element.uri_local_name();
                if prefix == sfx(&schema.id) {
                    format!("{}{}", prefix, local)
                } else {
                    format!("{}:{}", prefix, local)
                }
            }
        };
        Ok(if expand { self.expand_curie(&uri) } else { uri })
    }

    fn declaring_schema(&self, element: &dyn Element) -> SchemaViewResult<&SchemaDefinition> {
        if let Some(origin) = element.from_schema() {
            return self
                .schema_map()
                .values()
                .find(|s| s.id == origin)
                .ok_or_else(|| SchemaViewError::NoUri(format!("{} (from {})", element.name(), origin)));
        }
        Ok(self
            .in_schema(element.name())
            .ok()
            .and_then(|name| self.schema_map().get(&name))
            .unwrap_or_else(|| self.schema()))
    }

    /// Expand `prefix:local` when the prefix is known; anything else is returned unchanged
    pub fn expand_curie(&self, uri: &str) -> String {
        let parts: Vec<&str> = uri.split(':').collect();
        if let [prefix, local] = parts.as_slice() {
            if let Ok(namespace) = self.namespaces().get_iri(prefix) {
                return format!("{}{}", namespace, local);
            }
        }
        uri.to_string()
    }

    /// Own URI, native URI and declared mappings of a class, slot or type
    pub fn get_mappings(
        &self,
        element: &str,
        imports: bool,
        expand: bool,
    ) -> SchemaViewResult<IndexMap<MappingType, Vec<String>>> {
        let mut mappings = IndexMap::new();
        let Some(definition) = self.get_element(element, imports) else {
            return Ok(mappings);
        };
        let e = definition.as_element();
        if !matches!(
            e.kind(),
            ElementKind::Class | ElementKind::Slot | ElementKind::Type
        ) {
            return Ok(mappings);
        }
        for mapping in MappingType::ALL {
            let values = match mapping {
                MappingType::Itself => vec![self.uri_of(e, false, false)?],
                MappingType::Native => vec![self.uri_of(e, false, true)?],
                other => e.mappings_of(other).to_vec(),
            };
            let values = if expand {
                values.iter().map(|v| self.expand_curie(v)).collect()
            } else {
                values
            };
            mappings.insert(mapping, values);
        }
        Ok(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URIS: &str = r#"
id: http://example.org/uris
name: uris
default_prefix: ex
prefixes:
  ex: http://example.org/uris/
  schema: http://schema.org/
  sh: http://www.w3.org/ns/shacl#
imports:
  - linkml:types
classes:
  named thing:
    exact_mappings: [schema:Thing]
  Person:
    class_uri: schema:Person
slots:
  lives at: {}
  name:
    slot_uri: schema:name
subsets:
  core: {}
enums:
  Severity:
    enum_uri: sh:Severity
"#;

    fn view() -> SchemaView {
        SchemaView::from_yaml(URIS).unwrap()
    }

    #[test]
    fn test_declared_uris() {
        let view = view();
        assert_eq!(view.get_uri("Person", false).unwrap(), "schema:Person");
        assert_eq!(
            view.get_uri("Person", true).unwrap(),
            "http://schema.org/Person"
        );
        assert_eq!(view.get_uri("name", false).unwrap(), "schema:name");
        assert_eq!(
            view.get_uri("Severity", true).unwrap(),
            "http://www.w3.org/ns/shacl#Severity"
        );
    }

    #[test]
    fn test_synthesized_uris() {
        let view = view();
        assert_eq!(view.get_uri("named thing", false).unwrap(), "ex:NamedThing");
        assert_eq!(view.get_uri("lives at", false).unwrap(), "ex:lives_at");
        assert_eq!(
            view.get_uri("lives at", true).unwrap(),
            "http://example.org/uris/lives_at"
        );
        assert_eq!(view.get_native_uri("Person", false).unwrap(), "ex:Person");
    }

    #[test]
    fn test_imported_type_uses_declaring_schema() {
        let view = view();
        assert_eq!(view.get_uri("string", false).unwrap(), "xsd:string");
        assert_eq!(view.get_native_uri("string", false).unwrap(), "linkml:string");
    }

    #[test]
    fn test_schema_without_default_prefix() {
        let view = SchemaView::from_yaml(
            "id: http://example.org/bare\nclasses:\n  Thing: {}\n",
        )
        .unwrap();
        assert_eq!(
            view.get_uri("Thing", false).unwrap(),
            "http://example.org/bare/Thing"
        );
    }

    #[test]
    fn test_expand_curie() {
        let view = view();
        assert_eq!(view.expand_curie("schema:Person"), "http://schema.org/Person");
        assert_eq!(view.expand_curie("unknown:x"), "unknown:x");
        assert_eq!(view.expand_curie("a:b:c"), "a:b:c");
        assert_eq!(view.expand_curie("plain"), "plain");
    }

    #[test]
    fn test_subset_has_no_uri() {
        assert!(matches!(
            view().get_uri("core", false),
            Err(SchemaViewError::NoUri(_))
        ));
    }

    #[test]
    fn test_mappings() {
        let view = view();
        let mappings = view.get_mappings("named thing", true, true).unwrap();
        assert_eq!(
            mappings[&MappingType::Itself],
            vec!["http://example.org/uris/NamedThing"]
        );
        assert_eq!(mappings[&MappingType::Exact], vec!["http://schema.org/Thing"]);
        assert!(mappings[&MappingType::Broad].is_empty());
        assert!(view.get_mappings("Severity", true, false).unwrap().is_empty());
    }
}
