//! Import closure resolution
//!
//! Schemas are loaded through a [`SchemaLoader`]. Import names that are relative paths are
//! rewritten relative to the importing schema before they are loaded, so the same file name
//! in two directories yields two distinct closure entries.

use super::error::{SchemaViewError, SchemaViewResult};
use crate::schema::{types_schema, SchemaDefinition, SchemaError, SchemaResult, TYPES_IMPORT};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loads one schema document by import name
pub trait SchemaLoader: fmt::Debug {
    /// `base_dir` is the directory of the root schema's source file, if it has one.
    fn load(&self, name: &str, base_dir: Option<&Path>) -> SchemaResult<SchemaDefinition>;
}

/// Reads `<name>.yaml` from disk
#[derive(Debug, Clone, Default)]
pub struct FileSchemaLoader {
    base_dir: Option<PathBuf>,
}

impl FileSchemaLoader {
    /// Resolve imports against `base_dir` when the root schema has no source file
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn path_for(&self, name: &str, base_dir: Option<&Path>) -> PathBuf {
        let file = if [".yaml", ".yml", ".json"].iter().any(|ext| name.ends_with(ext)) {
            PathBuf::from(name)
        } else {
            PathBuf::from(format!("{}.yaml", name))
        };
        if file.is_absolute() {
            return file;
        }
        match base_dir.or(self.base_dir.as_deref()) {
            Some(dir) => dir.join(file),
            None => file,
        }
    }
}

impl SchemaLoader for FileSchemaLoader {
    fn load(&self, name: &str, base_dir: Option<&Path>) -> SchemaResult<SchemaDefinition> {
        if name.contains("://") {
            return Err(SchemaError::NotFound {
                kind: "local schema",
                name: name.to_string(),
            });
        }
        let path = self.path_for(name, base_dir);
        debug!("Loading schema {} from {}", name, path.display());
        SchemaDefinition::from_path(path)
    }
}

/// Serves schemas registered by import name
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaLoader {
    schemas: IndexMap<String, SchemaDefinition>,
}

impl InMemorySchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, name: impl Into<String>, schema: SchemaDefinition) -> Self {
        self.insert(name, schema);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaDefinition) {
        self.schemas.insert(name.into(), schema);
    }
}

impl SchemaLoader for InMemorySchemaLoader {
    fn load(&self, name: &str, _base_dir: Option<&Path>) -> SchemaResult<SchemaDefinition> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound {
                kind: "schema",
                name: name.to_string(),
            })
    }
}

/// Apply an import map: exact names first, then `prefix:` entries.
pub(crate) fn map_import(importmap: &IndexMap<String, String>, name: &str) -> String {
    if let Some(mapped) = importmap.get(name) {
        return mapped.clone();
    }
    if let Some((prefix, local)) = name.split_once(':') {
        if let Some(dir) = importmap.get(&format!("{}:", prefix)) {
            return format!("{}/{}", dir.trim_end_matches('/'), local);
        }
    }
    name.to_string()
}

/// Load a single import on behalf of the schema whose source file is `root_source`.
///
/// `linkml:types` resolves to the bundled types schema unless the import map redirects it.
pub(crate) fn load_import(
    loader: &dyn SchemaLoader,
    importmap: &IndexMap<String, String>,
    root_source: Option<&str>,
    name: &str,
) -> SchemaViewResult<SchemaDefinition> {
    let mapped = map_import(importmap, name);
    if mapped == TYPES_IMPORT {
        debug!("Using bundled types schema for {}", name);
        return Ok(types_schema());
    }
    if mapped.starts_with("linkml:") {
        return Err(SchemaViewError::Import {
            name: name.to_string(),
            source: SchemaError::NotFound {
                kind: "bundled schema",
                name: mapped,
            },
        });
    }

    let base_dir = match root_source {
        Some(source) if !Path::new(&mapped).is_absolute() => Path::new(source).parent(),
        _ => None,
    };
    info!(
        "Importing {} as {} from source {:?}; base_dir={:?}",
        name, mapped, root_source, base_dir
    );
    loader
        .load(&mapped, base_dir)
        .map_err(|source| SchemaViewError::Import {
            name: name.to_string(),
            source,
        })
}

/// Ordered, deduplicated import closure starting at `root`.
///
/// `imports_of` returns the declared imports of a schema, or `None` if it is not available;
/// unavailable schemas are left out. Leaves come first and the root last.
pub(crate) fn closure_names<F, E>(root: &str, mut imports_of: F) -> Result<Vec<String>, E>
where
    F: FnMut(&str) -> Result<Option<Vec<String>>, E>,
{
    let mut closure: VecDeque<String> = VecDeque::new();
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut todo = vec![root.to_string()];

    while let Some(sn) = todo.pop() {
        let Some(imports) = imports_of(&sn)? else {
            warn!("Import {} is not loaded; leaving it out of the closure", sn);
            continue;
        };
        if !visited.contains(&sn) {
            for import in imports {
                if import == sn {
                    continue;
                }
                if sn.contains('/') && !import.contains(':') {
                    todo.push(relative_to(&sn, &import));
                } else {
                    todo.push(import);
                }
            }
        }
        closure.push_front(sn.clone());
        visited.insert(sn);
    }

    let mut seen = FxHashSet::default();
    Ok(closure
        .into_iter()
        .filter(|sn| seen.insert(sn.clone()))
        .collect())
}

/// `import` resolved against the directory of `importer`
fn relative_to(importer: &str, import: &str) -> String {
    let parent = match importer.rfind('/') {
        Some(0) => "/",
        Some(idx) => &importer[..idx],
        None => "",
    };
    if parent.is_empty() {
        normpath(import)
    } else {
        normpath(&format!("{}/{}", parent, import))
    }
}

/// Lexically collapse `.` and `..` segments
pub(crate) fn normpath(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
