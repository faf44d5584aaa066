//! Variable lookup, assignment and linking.
//!
//! # Name resolution
//!
//! - `::a::b` is absolute: key `a::b` in the global table.
//! - Inside a proc, a simple name is a local of the proc's frame.
//! - Everywhere else (the global frame, `namespace eval` bodies) and for
//!   relative qualified names, the name is qualified with the active
//!   namespace and looked up in the global table.
//!
//! The slot found that way may be a link; links are followed until a value
//! slot (or a missing one) is reached. A link whose table has been freed is
//! reported as dangling.

use std::rc::Rc;

use tern_value::{Dict, Obj};

use crate::environment::{split_element, Link, LocalScope, Var, Vars};
use crate::errors::{
    dangling_link, no_such_element, no_such_variable, not_an_array, ScriptError,
};

use super::frames::FrameKind;
use super::Interp;

/// Links followed before giving up on a chain.
const MAX_LINK_HOPS: usize = 1000;

/// A variable slot after qualification and link following.
pub(crate) struct Resolved {
    pub(crate) table: Vars,
    pub(crate) key: Rc<str>,
    /// Element of the array stored at `key`.
    pub(crate) index: Option<Rc<str>>,
}

fn display(base: &str, index: Option<&str>) -> String {
    match index {
        Some(index) => format!("{base}({index})"),
        None => base.to_string(),
    }
}

fn follow_links(
    mut table: Vars,
    mut key: Rc<str>,
    mut index: Option<Rc<str>>,
    op: &'static str,
    name: impl Fn() -> String,
) -> Result<Resolved, ScriptError> {
    for _ in 0..MAX_LINK_HOPS {
        let link = match table.borrow().get(&key) {
            Some(Var::Link(link)) => Some(link.clone()),
            _ => None,
        };
        let Some(link) = link else {
            return Ok(Resolved { table, key, index });
        };
        let Some(target) = link.table.upgrade() else {
            tracing::warn!(var = %name(), "dangling variable link");
            return Err(dangling_link(op, &name()));
        };
        if let Some(link_index) = link.index {
            if index.is_some() {
                return Err(not_an_array(op, &name()));
            }
            index = Some(link_index);
        }
        table = target;
        key = link.name;
    }
    Err(dangling_link(op, &name()))
}

impl Interp {
    /// The table and key a (non-element) variable name refers to, before
    /// links are followed.
    pub(crate) fn locate(&self, name: &str) -> (Vars, Rc<str>) {
        if let Some(absolute) = name.strip_prefix("::") {
            return (self.globals.clone(), Rc::from(absolute.trim_start_matches(':')));
        }
        let frame = self.frames.current();
        if frame.kind == FrameKind::Proc && !name.contains("::") {
            return (frame.vars.clone(), Rc::from(name));
        }
        let key = if frame.namespace.is_empty() {
            Rc::from(name)
        } else {
            Rc::from(format!("{}::{name}", frame.namespace))
        };
        (self.globals.clone(), key)
    }

    pub(crate) fn resolve_var(
        &self,
        base: &str,
        index: Option<&str>,
        op: &'static str,
    ) -> Result<Resolved, ScriptError> {
        let (table, key) = self.locate(base);
        follow_links(table, key, index.map(Rc::from), op, || display(base, index))
    }

    // Reading

    /// Value of a scalar or `array(index)` variable.
    pub fn get_var(&self, name: &str) -> Result<Obj, ScriptError> {
        let (base, index) = split_element(name);
        self.read(base, index)
    }

    /// Value of element `index` of array `base`.
    pub fn get_element(&self, base: &str, index: &str) -> Result<Obj, ScriptError> {
        self.read(base, Some(index))
    }

    pub fn var_exists(&self, name: &str) -> bool {
        self.get_var(name).is_ok()
    }

    fn read(&self, base: &str, index: Option<&str>) -> Result<Obj, ScriptError> {
        let slot = self.resolve_var(base, index, "read")?;
        let table = slot.table.borrow();
        let Some(value) = table.value(&slot.key) else {
            return Err(no_such_variable("read", &display(base, index)));
        };
        match &slot.index {
            None => Ok(value.clone()),
            Some(element) => {
                let dict = value
                    .get_dict()
                    .map_err(|_| not_an_array("read", &display(base, index)))?;
                dict.get(element)
                    .cloned()
                    .ok_or_else(|| no_such_element("read", &display(base, index)))
            }
        }
    }

    // Writing

    /// Assign a scalar or `array(index)` variable, creating it if needed.
    /// Returns the stored value.
    pub fn set_var(&mut self, name: &str, value: impl Into<Obj>) -> Result<Obj, ScriptError> {
        let (base, index) = split_element(name);
        self.write_var(base, index, value.into())
    }

    pub fn set_element(
        &mut self,
        base: &str,
        index: &str,
        value: impl Into<Obj>,
    ) -> Result<Obj, ScriptError> {
        self.write_var(base, Some(index), value.into())
    }

    fn write_var(
        &mut self,
        base: &str,
        index: Option<&str>,
        value: Obj,
    ) -> Result<Obj, ScriptError> {
        let slot = self.resolve_var(base, index, "set")?;
        {
            let mut table = slot.table.borrow_mut();
            match &slot.index {
                None => table.set(Rc::clone(&slot.key), value.clone()),
                Some(element) => {
                    let mut array = match table.remove(&slot.key) {
                        Some(Var::Value(array)) => array,
                        _ => Obj::dict(Dict::new()),
                    };
                    let stored = array
                        .dict_mut()
                        .map(|dict| dict.insert(Obj::from(&**element), value.clone()));
                    table.set(Rc::clone(&slot.key), array);
                    stored.map_err(|_| not_an_array("set", &display(base, index)))?;
                }
            }
        }
        self.touched(&slot);
        Ok(value)
    }

    /// Modify a variable's value in place.
    ///
    /// The value is taken out of its slot while `f` runs, so it is only
    /// shared if something else holds it; `f` then mutates it without a
    /// copy. A missing variable starts out empty when `create` is set and is
    /// an error otherwise. Returns the new value.
    ///
    /// Whatever `f` leaves behind is stored even when it fails, so `f` must
    /// validate before it mutates.
    pub(crate) fn update_var(
        &mut self,
        name: &str,
        create: bool,
        f: impl FnOnce(&mut Obj) -> Result<(), ScriptError>,
    ) -> Result<Obj, ScriptError> {
        let (base, index) = split_element(name);
        let slot = self.resolve_var(base, index, "set")?;
        let updated = match &slot.index {
            None => {
                let current = match slot.table.borrow_mut().remove(&slot.key) {
                    Some(Var::Value(value)) => Some(value),
                    _ => None,
                };
                let existed = current.is_some();
                if !existed && !create {
                    return Err(no_such_variable("read", name));
                }
                let mut value = current.unwrap_or_else(Obj::empty);
                let outcome = f(&mut value);
                if outcome.is_ok() || existed {
                    slot.table
                        .borrow_mut()
                        .set(Rc::clone(&slot.key), value.clone());
                }
                outcome.map(|()| value)?
            }
            Some(element) => update_element(&slot, element, create, name, f)?,
        };
        self.touched(&slot);
        Ok(updated)
    }

    /// Note a write for `vwait`.
    fn touched(&mut self, slot: &Resolved) {
        if self.watched.is_empty() || !LocalScope::ptr_eq(&slot.table, &self.globals) {
            return;
        }
        if let Some(written) = self.watched.get_mut(&*slot.key) {
            *written = true;
        }
    }

    /// Remove a variable or array element.
    pub fn unset_var(&mut self, name: &str, complain: bool) -> Result<(), ScriptError> {
        let (base, index) = split_element(name);
        let slot = match self.resolve_var(base, index, "unset") {
            Ok(slot) => slot,
            Err(err) if complain => return Err(err),
            Err(_) => return Ok(()),
        };
        let mut table = slot.table.borrow_mut();
        let error = match &slot.index {
            None => table
                .remove(&slot.key)
                .is_none()
                .then(|| no_such_variable("unset", name)),
            Some(element) => match table.remove(&slot.key) {
                Some(Var::Value(mut array)) => {
                    let removed = array.dict_mut().ok().and_then(|dict| dict.remove(element));
                    table.set(Rc::clone(&slot.key), array);
                    removed
                        .is_none()
                        .then(|| no_such_element("unset", name))
                }
                Some(Var::Link(link)) => {
                    table.link(Rc::clone(&slot.key), link);
                    None
                }
                None => Some(no_such_variable("unset", name)),
            },
        };
        match error {
            Some(err) if complain => Err(err),
            _ => Ok(()),
        }
    }

    // Linking

    /// Make `local` in the active frame an alias of `target` as seen from
    /// frame `target_frame`.
    pub(crate) fn link_var(
        &mut self,
        local: &str,
        target_frame: usize,
        target: &str,
    ) -> Result<(), ScriptError> {
        if split_element(local).1.is_some() {
            return Err(ScriptError::new(format!(
                "bad variable name \"{local}\": can't create a scalar variable that looks like an array element"
            )));
        }
        let (base, index) = split_element(target);
        let (table, key) = self.with_level(target_frame, |interp| interp.locate(base));
        let slot = follow_links(table, key, index.map(Rc::from), "upvar", || {
            target.to_string()
        })?;
        if slot.index.is_some() {
            let is_array = slot
                .table
                .borrow()
                .value(&slot.key)
                .is_some_and(|value| value.get_dict().is_ok());
            if !is_array {
                return Err(ScriptError::new(format!(
                    "can't upvar to \"{target}\": variable isn't array"
                )));
            }
        }

        let (table, key) = self.locate(local);
        if slot.index.is_none() && LocalScope::ptr_eq(&table, &slot.table) && key == slot.key {
            return Err(ScriptError::new("can't upvar from variable to itself"));
        }
        let mut vars = table.borrow_mut();
        if matches!(vars.get(&key), Some(Var::Value(_))) {
            return Err(ScriptError::new(format!(
                "variable \"{local}\" already exists"
            )));
        }
        vars.link(
            key,
            Link {
                table: slot.table.downgrade(),
                name: slot.key,
                index: slot.index,
            },
        );
        Ok(())
    }

    /// Make `local` an alias of the global (namespace) variable `key`.
    pub(crate) fn link_global(&mut self, local: &str, key: &str) -> Result<(), ScriptError> {
        self.link_var(local, 0, &format!("::{key}"))
    }

    /// Names visible in the active frame, sorted.
    pub(crate) fn visible_vars(&self) -> Vec<Rc<str>> {
        self.frames.current().vars.borrow().names()
    }
}

fn update_element(
    slot: &Resolved,
    element: &str,
    create: bool,
    name: &str,
    f: impl FnOnce(&mut Obj) -> Result<(), ScriptError>,
) -> Result<Obj, ScriptError> {
    let mut array = match slot.table.borrow_mut().remove(&slot.key) {
        Some(Var::Value(array)) => array,
        _ if create => Obj::dict(Dict::new()),
        _ => return Err(no_such_variable("read", name)),
    };
    let outcome = update_in_array(&mut array, element, create, name, f);
    slot.table.borrow_mut().set(Rc::clone(&slot.key), array);
    outcome
}

fn update_in_array(
    array: &mut Obj,
    element: &str,
    create: bool,
    name: &str,
    f: impl FnOnce(&mut Obj) -> Result<(), ScriptError>,
) -> Result<Obj, ScriptError> {
    let dict = array.dict_mut().map_err(|_| not_an_array("set", name))?;
    let created = !dict.contains(element);
    if created {
        if !create {
            return Err(no_such_element("read", name));
        }
        dict.insert(Obj::from(element), Obj::empty());
    }
    let value = dict
        .get_mut(element)
        .ok_or_else(|| no_such_element("read", name))?;
    match f(value) {
        Ok(()) => Ok(value.clone()),
        Err(err) => {
            if created {
                dict.remove(element);
            }
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
