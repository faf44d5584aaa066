//! Ordered dictionary representation.
//!
//! Keys compare by their string form; iteration follows insertion order.
//! The key object is kept alongside the value so a key that was created as
//! an integer keeps its integer rep when handed back out.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::list::format_list;
use crate::{Obj, ValueError};

#[derive(Clone, Debug, Default)]
pub struct Dict {
    entries: IndexMap<Box<str>, (Obj, Obj), FxBuildHasher>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat `key value key value ...` element list.
    pub fn from_flat(items: &[Obj]) -> Result<Self, ValueError> {
        if items.len() % 2 != 0 {
            return Err(ValueError::MissingDictValue);
        }
        let mut dict = Self::new();
        for pair in items.chunks_exact(2) {
            dict.insert(pair[0].clone(), pair[1].clone());
        }
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Obj> {
        self.entries.get(key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, key: Obj, value: Obj) {
        let name: Box<str> = key.as_str().into();
        match self.entries.get_mut(&name) {
            Some(slot) => slot.1 = value,
            None => {
                self.entries.insert(name, (key, value));
            }
        }
    }

    /// Mutable access to an existing value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Obj> {
        self.entries.get_mut(key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Obj> {
        self.entries.shift_remove(key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Obj, &Obj)> {
        self.entries.values().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Obj> {
        self.entries.values().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Obj> {
        self.entries.values().map(|(_, v)| v)
    }

    /// Flatten back into `key value ...` elements.
    pub fn to_flat(&self) -> Vec<Obj> {
        let mut out = Vec::with_capacity(self.entries.len() * 2);
        for (k, v) in self.entries.values() {
            out.push(k.clone());
            out.push(v.clone());
        }
        out
    }

    pub(crate) fn to_string_rep(&self) -> String {
        format_list(&self.to_flat())
    }
}
