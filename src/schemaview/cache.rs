//! Memo table for derived schema view queries
//!
//! Entries are keyed by method, arguments and the view revision. Bumping the revision
//! makes every older entry unreachable; stale entries are not evicted.

use crate::rdf::Namespaces;
use crate::schema::SlotDefinition;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    method: &'static str,
    args: Vec<String>,
    revision: u64,
}

impl MemoKey {
    pub(crate) fn new<I, S>(method: &'static str, args: I, revision: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            args: args.into_iter().map(Into::into).collect(),
            revision,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Memoized {
    Names(Vec<String>),
    Slot(Box<SlotDefinition>),
    Slots(Vec<SlotDefinition>),
    Text(String),
    Namespaces(Namespaces),
}

/// Values that can live in the memo table
pub(crate) trait Memoize: Clone {
    fn into_memo(self) -> Memoized;
    fn from_memo(memo: &Memoized) -> Option<Self>;
}

macro_rules! memoize {
    ($ty:ty, $variant:ident) => {
        impl Memoize for $ty {
            fn into_memo(self) -> Memoized {
                Memoized::$variant(self)
            }

            fn from_memo(memo: &Memoized) -> Option<Self> {
                match memo {
                    Memoized::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

memoize!(Vec<String>, Names);
memoize!(Vec<SlotDefinition>, Slots);
memoize!(String, Text);
memoize!(Namespaces, Namespaces);

impl Memoize for SlotDefinition {
    fn into_memo(self) -> Memoized {
        Memoized::Slot(Box::new(self))
    }

    fn from_memo(memo: &Memoized) -> Option<Self> {
        match memo {
            Memoized::Slot(slot) => Some(slot.as_ref().clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Memo {
    entries: RefCell<FxHashMap<MemoKey, Memoized>>,
}

impl Memo {
    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// No borrow is held while `compute` runs, so computations may recurse into the memo.
    pub(crate) fn get_or_try_insert<T, E, F>(&self, key: MemoKey, compute: F) -> Result<T, E>
    where
        T: Memoize,
        F: FnOnce() -> Result<T, E>,
    {
        let hit = self.entries.borrow().get(&key).and_then(T::from_memo);
        if let Some(value) = hit {
            return Ok(value);
        }
        let value = compute()?;
        self.entries.borrow_mut().insert(key, value.clone().into_memo());
        Ok(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Clone for Memo {
    fn clone(&self) -> Self {
        Self {
            entries: RefCell::new(self.entries.borrow().clone()),
        }
    }
}
