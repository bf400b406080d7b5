//! is_a / mixin traversal
//!
//! Ancestor and descendant queries are reflexive transitive closures over a parent
//! function. Parents of an element are its mixins followed by its `is_a` parent.

use super::error::{SchemaViewError, SchemaViewResult};
use super::SchemaView;
use crate::schema::{Element, ElementKind};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Which edges a traversal follows and how it walks them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Traversal {
    /// Include imported schemas
    pub imports: bool,
    /// Follow mixin edges
    pub mixins: bool,
    /// Follow is_a edges
    pub is_a: bool,
    /// Include the starting element
    pub reflexive: bool,
    /// Depth-first when set, breadth-first otherwise
    pub depth_first: bool,
}

impl Default for Traversal {
    fn default() -> Self {
        Self {
            imports: true,
            mixins: true,
            is_a: true,
            reflexive: true,
            depth_first: true,
        }
    }
}

impl Traversal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports(mut self, imports: bool) -> Self {
        self.imports = imports;
        self
    }

    pub fn mixins(mut self, mixins: bool) -> Self {
        self.mixins = mixins;
        self
    }

    pub fn is_a(mut self, is_a: bool) -> Self {
        self.is_a = is_a;
        self
    }

    pub fn reflexive(mut self, reflexive: bool) -> Self {
        self.reflexive = reflexive;
        self
    }

    pub fn depth_first(mut self, depth_first: bool) -> Self {
        self.depth_first = depth_first;
        self
    }

    fn key(&self) -> String {
        [self.imports, self.mixins, self.is_a, self.reflexive, self.depth_first]
            .iter()
            .map(|flag| if *flag { '1' } else { '0' })
            .collect()
    }
}

/// Transitive closure of `parents` from `start`, deduplicated in discovery order
pub(crate) fn closure<F>(
    start: &str,
    mut parents: F,
    reflexive: bool,
    depth_first: bool,
) -> SchemaViewResult<Vec<String>>
where
    F: FnMut(&str) -> SchemaViewResult<Vec<String>>,
{
    let mut found = if reflexive {
        vec![start.to_string()]
    } else {
        Vec::new()
    };
    let mut seen: FxHashSet<String> = found.iter().cloned().collect();
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut todo: VecDeque<String> = VecDeque::from([start.to_string()]);

    loop {
        let next = if depth_first {
            todo.pop_back()
        } else {
            todo.pop_front()
        };
        let Some(item) = next else { break };
        visited.insert(item.clone());
        let values = parents(&item)?;
        for value in values {
            if !visited.contains(&value) && !seen.contains(&value) {
                todo.push_back(value.clone());
                seen.insert(value.clone());
                found.push(value);
            }
        }
    }
    Ok(found)
}

fn direct_parents(element: &dyn Element, opts: &Traversal) -> Vec<String> {
    let mut parents = Vec::new();
    if opts.mixins {
        parents.extend(element.mixins().iter().cloned());
    }
    if opts.is_a {
        if let Some(parent) = element.is_a() {
            parents.push(parent.to_string());
        }
    }
    parents
}

impl SchemaView {
    fn check_parents(
        &self,
        kind: ElementKind,
        name: &str,
        parents: &[String],
        exists: impl Fn(&str) -> bool,
    ) -> SchemaViewResult<()> {
        match parents.iter().find(|p| !exists(p)) {
            Some(parent) => Err(SchemaViewError::UnresolvedReference {
                kind,
                name: name.to_string(),
                parent: parent.clone(),
            }),
            None => Ok(()),
        }
    }

    // ---- classes ----

    /// Mixins then is_a parent of a class
    pub fn class_parents(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let class = self.require_class(name, opts.imports)?;
        let parents = direct_parents(class, &opts);
        self.check_parents(ElementKind::Class, name, &parents, |p| {
            self.get_class(p, opts.imports).is_some()
        })?;
        Ok(parents)
    }

    pub fn class_ancestors(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let key = opts.key();
        self.try_memoized("class_ancestors", &[name, key.as_str()], || {
            closure(
                name,
                |c| self.class_parents(c, opts),
                opts.reflexive,
                opts.depth_first,
            )
        })
    }

    /// Classes whose is_a (or, with `mixins`, one of whose mixins) is `name`
    pub fn class_children(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        self.require_class(name, opts.imports)?;
        Ok(self
            .class_index(opts.imports)
            .into_values()
            .filter(|c| is_child(*c, name, &opts))
            .map(|c| c.name.clone())
            .collect())
    }

    pub fn class_descendants(
        &self,
        name: &str,
        opts: Traversal,
    ) -> SchemaViewResult<Vec<String>> {
        let key = opts.key();
        self.try_memoized("class_descendants", &[name, key.as_str()], || {
            closure(
                name,
                |c| self.class_children(c, opts),
                opts.reflexive,
                opts.depth_first,
            )
        })
    }

    /// Classes without parents
    pub fn class_roots(&self, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let mut roots = Vec::new();
        for name in self.class_index(opts.imports).into_keys() {
            if self.class_parents(name, opts)?.is_empty() {
                roots.push(name.to_string());
            }
        }
        Ok(roots)
    }

    /// Classes without children
    pub fn class_leaves(&self, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let mut leaves = Vec::new();
        for name in self.class_index(opts.imports).into_keys() {
            if self.class_children(name, opts)?.is_empty() {
                leaves.push(name.to_string());
            }
        }
        Ok(leaves)
    }

    // ---- slots ----

    pub fn slot_parents(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let slot = self.require_slot(name, opts.imports, true)?;
        let parents = direct_parents(&slot, &opts);
        self.check_parents(ElementKind::Slot, name, &parents, |p| {
            self.get_slot(p, opts.imports, true).is_some()
        })?;
        Ok(parents)
    }

    pub fn slot_ancestors(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let key = opts.key();
        self.try_memoized("slot_ancestors", &[name, key.as_str()], || {
            closure(
                name,
                |s| self.slot_parents(s, opts),
                opts.reflexive,
                opts.depth_first,
            )
        })
    }

    pub fn slot_children(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        self.require_slot(name, opts.imports, true)?;
        Ok(self
            .slot_index(opts.imports)
            .into_values()
            .filter(|s| is_child(*s, name, &opts))
            .map(|s| s.name.clone())
            .collect())
    }

    pub fn slot_descendants(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let key = opts.key();
        self.try_memoized("slot_descendants", &[name, key.as_str()], || {
            closure(
                name,
                |s| self.slot_children(s, opts),
                opts.reflexive,
                opts.depth_first,
            )
        })
    }

    pub fn slot_roots(&self, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let mut roots = Vec::new();
        for name in self.slot_index(opts.imports).into_keys() {
            if self.slot_parents(name, opts)?.is_empty() {
                roots.push(name.to_string());
            }
        }
        Ok(roots)
    }

    pub fn slot_leaves(&self, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let mut leaves = Vec::new();
        for name in self.slot_index(opts.imports).into_keys() {
            if self.slot_children(name, opts)?.is_empty() {
                leaves.push(name.to_string());
            }
        }
        Ok(leaves)
    }

    // ---- types ----

    /// The `typeof` parent of a type
    pub fn type_parents(&self, name: &str, imports: bool) -> SchemaViewResult<Vec<String>> {
        let parents: Vec<String> = self
            .require_type(name, imports)?
            .typeof_
            .iter()
            .cloned()
            .collect();
        self.check_parents(ElementKind::Type, name, &parents, |p| {
            self.get_type(p, imports).is_some()
        })?;
        Ok(parents)
    }

    pub fn type_ancestors(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let key = opts.key();
        self.try_memoized("type_ancestors", &[name, key.as_str()], || {
            closure(
                name,
                |t| self.type_parents(t, opts.imports),
                opts.reflexive,
                opts.depth_first,
            )
        })
    }

    // ---- enums ----

    /// Enum parents; callers usually restrict this to the root schema without mixins
    pub fn enum_parents(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let e = self.require_enum(name, opts.imports)?;
        let parents = direct_parents(e, &opts);
        self.check_parents(ElementKind::Enum, name, &parents, |p| {
            self.get_enum(p, opts.imports).is_some()
        })?;
        Ok(parents)
    }

    pub fn enum_ancestors(&self, name: &str, opts: Traversal) -> SchemaViewResult<Vec<String>> {
        let key = opts.key();
        self.try_memoized("enum_ancestors", &[name, key.as_str()], || {
            closure(
                name,
                |e| self.enum_parents(e, opts),
                opts.reflexive,
                opts.depth_first,
            )
        })
    }

    // ---- permissible values ----

    /// The is_a parent of a permissible value, if it has one
    pub fn permissible_value_parent(
        &self,
        text: &str,
        enum_name: &str,
    ) -> SchemaViewResult<Option<String>> {
        let e = self.require_enum(enum_name, true)?;
        Ok(e.permissible_values
            .get(text)
            .and_then(|pv| pv.is_a.clone()))
    }

    /// Permissible values whose is_a is `text`
    pub fn permissible_value_children(
        &self,
        text: &str,
        enum_name: &str,
    ) -> SchemaViewResult<Vec<String>> {
        let e = self.require_enum(enum_name, true)?;
        if !e.permissible_values.contains_key(text) {
            return Ok(Vec::new());
        }
        Ok(e.permissible_values
            .values()
            .filter(|pv| pv.is_a.as_deref() == Some(text))
            .map(|pv| pv.text.clone())
            .collect())
    }

    pub fn permissible_value_ancestors(
        &self,
        text: &str,
        enum_name: &str,
        opts: Traversal,
    ) -> SchemaViewResult<Vec<String>> {
        closure(
            text,
            |pv| Ok(self.permissible_value_parent(pv, enum_name)?.into_iter().collect()),
            opts.reflexive,
            opts.depth_first,
        )
    }

    pub fn permissible_value_descendants(
        &self,
        text: &str,
        enum_name: &str,
        opts: Traversal,
    ) -> SchemaViewResult<Vec<String>> {
        closure(
            text,
            |pv| self.permissible_value_children(pv, enum_name),
            opts.reflexive,
            opts.depth_first,
        )
    }

    /// Classes, slots and enums whose is_a (or, with `mixin`, a mixin) is `name`
    pub fn get_children(&self, name: &str, mixin: bool) -> Vec<String> {
        let classes = self.class_index(true);
        let slots = self.slot_index(true);
        let enums = self.merged(true, |s| &s.enums);
        let elements = classes
            .values()
            .map(|c| *c as &dyn Element)
            .chain(slots.values().map(|s| *s as &dyn Element))
            .chain(enums.values().map(|e| *e as &dyn Element));

        let mut children = Vec::new();
        for element in elements {
            if element.is_a() == Some(name) {
                children.push(element.name().to_string());
            }
            if mixin && element.mixins().iter().any(|m| m == name) {
                children.push(element.name().to_string());
            }
        }
        children
    }
}

fn is_child(element: &dyn Element, parent: &str, opts: &Traversal) -> bool {
    (opts.is_a && element.is_a() == Some(parent))
        || (opts.mixins && element.mixins().iter().any(|m| m == parent))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXINS: &str = r#"
id: http://example.org/mixins
name: mixins
classes:
  Root:
    mixins: [RootMixin]
  A:
    is_a: Root
    mixins: [Am1, Am2, AZ]
  B:
    is_a: A
    mixins: [Bm1, Bm2, BY]
  C:
    is_a: B
    mixins: [Cm1, Cm2, CX]
  RootMixin:
    mixin: true
  Am1:
    is_a: RootMixin
  Am2:
    is_a: RootMixin
  AZ:
    is_a: RootMixin
  BY:
    is_a: RootMixin
  CX:
    is_a: RootMixin
  Bm1:
    is_a: Am1
  Bm2:
    is_a: Am2
  Cm1:
    is_a: Bm1
  Cm2:
    is_a: Bm2
"#;

    fn view() -> SchemaView {
        SchemaView::from_yaml(MIXINS).unwrap()
    }

    #[test]
    fn test_depth_first_ancestors() {
        let ancestors = view().class_ancestors("C", Traversal::default()).unwrap();
        assert_eq!(
            ancestors,
            vec![
                "C", "Cm1", "Cm2", "CX", "B", "Bm1", "Bm2", "BY", "A", "Am1", "Am2", "AZ",
                "Root", "RootMixin"
            ]
        );
    }

    #[test]
    fn test_breadth_first_ancestors() {
        let ancestors = view()
            .class_ancestors("C", Traversal::default().depth_first(false))
            .unwrap();
        assert_eq!(
            ancestors,
            vec![
                "C", "Cm1", "Cm2", "CX", "B", "Bm1", "Bm2", "RootMixin", "BY", "A", "Am1",
                "Am2", "AZ", "Root"
            ]
        );
    }

    #[test]
    fn test_edge_filters() {
        let view = view();
        assert_eq!(
            view.class_ancestors("C", Traversal::default().mixins(false))
                .unwrap(),
            vec!["C", "B", "A", "Root"]
        );
        assert_eq!(
            view.class_ancestors("C", Traversal::default().is_a(false))
                .unwrap(),
            vec!["C", "Cm1", "Cm2", "CX"]
        );
        assert_eq!(
            view.class_ancestors("C", Traversal::default().mixins(false).reflexive(false))
                .unwrap(),
            vec!["B", "A", "Root"]
        );
    }

    #[test]
    fn test_children_and_descendants() {
        let view = view();
        assert_eq!(
            view.class_children("A", Traversal::default()).unwrap(),
            vec!["B"]
        );
        assert_eq!(
            view.class_children("RootMixin", Traversal::default()).unwrap(),
            vec!["Root", "Am1", "Am2", "AZ", "BY", "CX"]
        );
        let descendants = view
            .class_descendants("Root", Traversal::default().mixins(false))
            .unwrap();
        assert_eq!(descendants, vec!["Root", "A", "B", "C"]);
    }

    #[test]
    fn test_roots_and_leaves() {
        let view = view();
        assert_eq!(view.class_roots(Traversal::default()).unwrap(), vec!["RootMixin"]);
        let leaves = view.class_leaves(Traversal::default()).unwrap();
        assert_eq!(leaves, vec!["C"]);
        assert_eq!(
            view.get_children("RootMixin", false),
            vec!["Am1", "Am2", "AZ", "BY", "CX"]
        );
    }

    #[test]
    fn test_dangling_parent_is_an_error() {
        let view = SchemaView::from_yaml(
            "id: http://example.org/d\nclasses:\n  A:\n    is_a: Missing\n",
        )
        .unwrap();
        let err = view.class_ancestors("A", Traversal::default()).unwrap_err();
        assert!(matches!(
            err,
            SchemaViewError::UnresolvedReference { ref parent, .. } if parent == "Missing"
        ));
        assert!(matches!(
            view.class_ancestors("Nope", Traversal::default()),
            Err(SchemaViewError::UnknownElement { .. })
        ));
    }

    #[test]
    fn test_permissible_value_hierarchy() {
        let view = SchemaView::from_yaml(
            r#"
id: http://example.org/pv
enums:
  Animal:
    permissible_values:
      ANIMAL: {}
      MAMMAL:
        is_a: ANIMAL
      CAT:
        is_a: MAMMAL
      DOG:
        is_a: MAMMAL
"#,
        )
        .unwrap();
        assert_eq!(
            view.permissible_value_parent("CAT", "Animal").unwrap(),
            Some("MAMMAL".to_string())
        );
        assert_eq!(view.permissible_value_parent("ANIMAL", "Animal").unwrap(), None);
        assert_eq!(
            view.permissible_value_children("MAMMAL", "Animal").unwrap(),
            vec!["CAT", "DOG"]
        );
        assert_eq!(
            view.permissible_value_ancestors("CAT", "Animal", Traversal::default())
                .unwrap(),
            vec!["CAT", "MAMMAL", "ANIMAL"]
        );
        assert_eq!(
            view.permissible_value_descendants("ANIMAL", "Animal", Traversal::default())
                .unwrap(),
            vec!["ANIMAL", "MAMMAL", "CAT", "DOG"]
        );
        assert!(view.permissible_value_children("X", "Nope").is_err());
    }

    #[test]
    fn test_type_ancestors() {
        let view = SchemaView::from_yaml(
            r#"
id: http://example.org/t
imports: [linkml:types]
types:
  phone:
    typeof: string
  mobile:
    typeof: phone
"#,
        )
        .unwrap();
        assert_eq!(
            view.type_ancestors("mobile", Traversal::default()).unwrap(),
            vec!["mobile", "phone", "string"]
        );
    }
}
