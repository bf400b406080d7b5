use linkml_runtime::schemaview::{SchemaView, SchemaViewError, Traversal};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MAIN: &str = r#"
id: https://example.org/main
name: main
default_prefix: main
prefixes:
  main: https://example.org/main/
imports:
  - linkml:types
  - core
  - sub/extra
default_range: string
classes:
  Shop:
    slots: [id, stock]
slots:
  stock:
    range: Widget
    multivalued: true
"#;

const CORE: &str = r#"
id: https://example.org/core
name: core
prefixes:
  core: https://example.org/core/
  main: https://example.org/not-main/
default_prefix: core
imports:
  - linkml:types
slots:
  id:
    identifier: true
    range: string
  label:
    range: string
classes:
  Thing:
    slots: [id, label]
"#;

const EXTRA: &str = r#"
id: https://example.org/extra
name: extra
default_prefix: core
imports:
  - ../core
classes:
  Widget:
    is_a: Thing
    slot_usage:
      label:
        required: true
"#;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn schema_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.yaml", MAIN);
    write(dir.path(), "core.yaml", CORE);
    write(dir.path(), "sub/extra.yaml", EXTRA);
    dir
}

#[test]
fn test_closure_from_disk() {
    let dir = schema_tree();
    let view = SchemaView::from_path(dir.path().join("main.yaml")).unwrap();

    let closure = view.imports_closure(true);
    assert_eq!(closure, vec!["linkml:types", "core", "sub/extra", "main"]);
    assert_eq!(view.imports_closure(false), vec!["main"]);

    assert_eq!(view.in_schema("Widget").unwrap(), "sub/extra");
    assert_eq!(view.in_schema("Thing").unwrap(), "core");
    assert_eq!(view.in_schema("string").unwrap(), "linkml:types");
}

#[test]
fn test_queries_span_the_closure() {
    let dir = schema_tree();
    let view = SchemaView::from_path(dir.path().join("main.yaml")).unwrap();

    assert_eq!(
        view.class_ancestors("Widget", Traversal::default()).unwrap(),
        vec!["Widget", "Thing"]
    );
    assert!(view.get_class("Widget", false).is_none());
    assert!(view.get_class("Widget", true).is_some());

    let label = view.induced_slot("label", Some("Widget")).unwrap();
    assert_eq!(label.required, Some(true));
    let id = view.get_identifier_slot("Widget", false).unwrap().unwrap();
    assert_eq!(id.name, "id");

    // the root schema's prefixes win
    let ns = view.namespaces();
    assert_eq!(ns.get_iri("main").unwrap(), "https://example.org/main/");
    assert_eq!(ns.get_iri("core").unwrap(), "https://example.org/core/");

    assert_eq!(
        view.get_uri("Widget", true).unwrap(),
        "https://example.org/core/Widget"
    );
}

#[test]
fn test_missing_import_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main.yaml", MAIN);
    let err = SchemaView::from_path(dir.path().join("main.yaml")).unwrap_err();
    assert!(matches!(err, SchemaViewError::Import { .. }));
}

#[test]
fn test_merge_imports_flattens_closure() {
    let dir = schema_tree();
    let mut view = SchemaView::from_path(dir.path().join("main.yaml")).unwrap();
    view.merge_imports();

    assert!(view.schema().imports.is_empty());
    assert!(view.get_class("Widget", false).is_some());
    assert!(view.get_type("string", false).is_some());
    assert_eq!(view.imports_closure(true), vec!["main"]);
}
