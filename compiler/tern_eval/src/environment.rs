//! Variable storage.
//!
//! Each call frame owns one [`VarTable`] behind a [`LocalScope`] handle.
//! A variable slot either holds a value or is a [`Link`] to a slot in
//! another table (`upvar`, `global`, `variable`). Links hold a weak
//! reference: when the frame that owns the target table is popped the table
//! is freed and the link fails cleanly as dangling.
//!
//! Arrays are dict values stored under the array's base name; an element
//! name `a(i)` addresses key `i` of the dict held by `a`.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use tern_value::Obj;

/// A single-threaded shared handle to a variable table.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// A handle that does not keep the table alive.
    #[inline]
    pub fn downgrade(&self) -> WeakScope<T> {
        WeakScope(Rc::downgrade(&self.0))
    }

    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Weak counterpart of [`LocalScope`].
pub struct WeakScope<T>(Weak<RefCell<T>>);

impl<T> WeakScope<T> {
    /// The table, if its frame is still alive.
    #[inline]
    pub fn upgrade(&self) -> Option<LocalScope<T>> {
        self.0.upgrade().map(LocalScope)
    }
}

impl<T> Clone for WeakScope<T> {
    fn clone(&self) -> Self {
        WeakScope(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for WeakScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakScope")
    }
}

/// Shared handle to a frame's variables.
pub type Vars = LocalScope<VarTable>;

/// Where a link points.
#[derive(Clone, Debug)]
pub struct Link {
    pub table: WeakScope<VarTable>,
    pub name: Rc<str>,
    /// Set when the link targets one element of an array.
    pub index: Option<Rc<str>>,
}

#[derive(Clone, Debug)]
pub enum Var {
    Value(Obj),
    Link(Link),
}

/// Variables of one frame (or of the global namespace).
#[derive(Debug, Default)]
pub struct VarTable {
    vars: FxHashMap<Rc<str>, Var>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Var> {
        self.vars.get(name)
    }

    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Var> {
        self.vars.get_mut(name)
    }

    /// The value held directly in `name`, ignoring links.
    pub fn value(&self, name: &str) -> Option<&Obj> {
        match self.vars.get(name) {
            Some(Var::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set(&mut self, name: Rc<str>, value: Obj) {
        self.vars.insert(name, Var::Value(value));
    }

    pub fn link(&mut self, name: Rc<str>, link: Link) {
        self.vars.insert(name, Var::Link(link));
    }

    pub fn remove(&mut self, name: &str) -> Option<Var> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Every name, links included, sorted.
    pub fn names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<_> = self.vars.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Names that hold values directly (not links), sorted.
    pub fn local_names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<_> = self
            .vars
            .iter()
            .filter(|(_, var)| matches!(var, Var::Value(_)))
            .map(|(name, _)| Rc::clone(name))
            .collect();
        names.sort_unstable();
        names
    }
}

/// Split `a(i)` into `("a", Some("i"))`; any other name is a scalar.
pub fn split_element(name: &str) -> (&str, Option<&str>) {
    if let Some(stripped) = name.strip_suffix(')') {
        if let Some(open) = stripped.find('(') {
            if open > 0 {
                return (&stripped[..open], Some(&stripped[open + 1..]));
            }
        }
    }
    (name, None)
}

#[cfg(test)]
mod tests;
