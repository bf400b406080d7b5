//! The bundled `linkml:types` schema

use super::model::{Prefix, SchemaDefinition, TypeDefinition};

pub const TYPES_SCHEMA_ID: &str = "https://w3id.org/linkml/types";
pub const TYPES_IMPORT: &str = "linkml:types";
pub const LINKML_NAMESPACE: &str = "https://w3id.org/linkml/";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// (name, uri, base, repr, typeof, description)
const BUILTIN_TYPES: &[(&str, &str, &str, Option<&str>, Option<&str>, &str)] = &[
    ("string", "xsd:string", "str", None, None, "A character string"),
    ("integer", "xsd:integer", "int", None, None, "An integer"),
    ("boolean", "xsd:boolean", "Bool", Some("bool"), None, "A binary (true or false) value"),
    ("float", "xsd:float", "float", None, None, "A real number that conforms to the xsd:float specification"),
    ("double", "xsd:double", "float", None, None, "A real number that conforms to the xsd:double specification"),
    ("decimal", "xsd:decimal", "Decimal", None, None, "A real number with arbitrary precision"),
    ("time", "xsd:time", "XSDTime", Some("str"), None, "A time object represents a (local) time of day"),
    ("date", "xsd:date", "XSDDate", Some("str"), None, "a date (year, month and day) in an idealized calendar"),
    ("datetime", "xsd:dateTime", "XSDDateTime", Some("str"), None, "The combination of a date and time"),
    ("date_or_datetime", "linkml:DateOrDatetime", "str", Some("str"), None, "Either a date or a datetime"),
    ("uriorcurie", "xsd:anyURI", "URIorCURIE", Some("str"), None, "a URI or a CURIE"),
    ("curie", "xsd:string", "Curie", Some("str"), None, "a compact URI"),
    ("uri", "xsd:anyURI", "URI", Some("str"), None, "a complete URI"),
    ("ncname", "xsd:string", "NCName", Some("str"), None, "Prefix part of CURIE"),
    ("objectidentifier", "shex:iri", "ElementIdentifier", Some("str"), None, "A URI or CURIE that represents an object in the model."),
    ("nodeidentifier", "shex:nonLiteral", "NodeIdentifier", Some("str"), None, "A URI, CURIE or BNODE that represents a node in a model."),
    ("jsonpointer", "xsd:string", "str", Some("str"), None, "A string encoding a JSON Pointer"),
    ("jsonpath", "xsd:string", "str", Some("str"), None, "A string encoding a JSON Path"),
    ("sparqlpath", "xsd:string", "str", Some("str"), None, "A string encoding a SPARQL Property Path"),
];

/// Build the bundled types schema
pub fn types_schema() -> SchemaDefinition {
    let mut schema = SchemaDefinition::new(TYPES_SCHEMA_ID, "types");
    schema.title = Some("Core LinkML metamodel types".to_string());
    schema.default_prefix = Some("linkml".to_string());
    schema.default_range = Some("string".to_string());
    for (prefix, reference) in [
        ("linkml", LINKML_NAMESPACE),
        ("xsd", XSD_NAMESPACE),
        ("shex", "http://www.w3.org/ns/shex#"),
        ("schema", "http://schema.org/"),
    ] {
        schema
            .prefixes
            .insert(prefix.to_string(), Prefix::new(prefix, reference));
    }

    for (name, uri, base, repr, typeof_, description) in BUILTIN_TYPES {
        let t = TypeDefinition {
            name: name.to_string(),
            description: Some(description.to_string()),
            uri: Some(uri.to_string()),
            base: Some(base.to_string()),
            repr: repr.map(str::to_string),
            typeof_: typeof_.map(str::to_string),
            from_schema: Some(TYPES_SCHEMA_ID.to_string()),
            ..Default::default()
        };
        schema.types.insert(name.to_string(), t);
    }
    schema
}

/// Full xsd datatype IRI for a builtin type name, if it has one
pub fn xsd_datatype_for(type_name: &str) -> Option<String> {
    BUILTIN_TYPES
        .iter()
        .find(|(name, ..)| *name == type_name)
        .and_then(|(_, uri, ..)| uri.strip_prefix("xsd:"))
        .map(|local| format!("{}{}", XSD_NAMESPACE, local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_schema() {
        let schema = types_schema();
        assert_eq!(schema.name, "types");
        assert_eq!(schema.types["string"].uri.as_deref(), Some("xsd:string"));
        assert_eq!(schema.types["datetime"].uri.as_deref(), Some("xsd:dateTime"));
        assert_eq!(schema.types["objectidentifier"].uri.as_deref(), Some("shex:iri"));
        assert_eq!(schema.prefixes["xsd"].prefix_reference, XSD_NAMESPACE);
    }

    #[test]
    fn test_xsd_datatype_for() {
        assert_eq!(
            xsd_datatype_for("integer").as_deref(),
            Some("http://www.w3.org/2001/XMLSchema#integer")
        );
        assert_eq!(xsd_datatype_for("objectidentifier"), None);
        assert_eq!(xsd_datatype_for("Person"), None);
    }
}
