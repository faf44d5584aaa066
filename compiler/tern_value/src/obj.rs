//! The value object.
//!
//! An [`Obj`] is a reference-counted cell holding a cached string rep and an
//! optional native rep. Either may be absent but never both. Conversions
//! (`get_int`, `get_list`, ...) parse the string rep and cache the result as
//! the new native rep, replacing whatever was there before ("shimmering").
//!
//! # Ownership
//!
//! `Obj` is an `Rc` handle: cloning retains, dropping releases, and the cell
//! (with its native rep's free hook) is destroyed when the last handle goes.
//! [`Obj::ref_count`] is the live handle count.
//!
//! # Copy-on-write
//!
//! An object with more than one handle is *shared* and its value must not
//! change. Every mutator takes `&mut self` and goes through `Rc::make_mut`,
//! which duplicates the cell first when it is shared, so the other handles
//! keep seeing the old value.

use std::any::Any;
use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dict::Dict;
use crate::intern;
use crate::list::{format_list, parse_list};
use crate::number::{format_double, parse_bool, parse_double, parse_int, parse_number, Number};
use crate::types::{ExtRep, ObjType, DICT_TYPE, DOUBLE_TYPE, INT_TYPE, LIST_TYPE};
use crate::ValueError;

thread_local! {
    static SHIMMERS: Cell<u64> = const { Cell::new(0) };
}

/// Number of native reps installed on objects by this thread so far.
///
/// Lets callers check that a repeated conversion hits the cache instead of
/// re-parsing.
pub fn shimmer_count() -> u64 {
    SHIMMERS.with(Cell::get)
}

fn count_shimmer() {
    SHIMMERS.with(|c| c.set(c.get().wrapping_add(1)));
}

/// Where a piece of script text came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: Rc<str>,
    pub line: u32,
}

pub(crate) enum Rep {
    None,
    Int(i64),
    Double(f64),
    List(Rc<Vec<Obj>>),
    Dict(Rc<Dict>),
    Ext(ExtRep),
}

impl Rep {
    fn type_name(&self) -> &'static str {
        match self {
            Rep::None => "string",
            Rep::Int(_) => INT_TYPE.name,
            Rep::Double(_) => DOUBLE_TYPE.name,
            Rep::List(_) => LIST_TYPE.name,
            Rep::Dict(_) => DICT_TYPE.name,
            Rep::Ext(ext) => ext.ty.name,
        }
    }

    fn update_string(&self) -> String {
        match self {
            Rep::None => String::new(),
            Rep::Int(v) => v.to_string(),
            Rep::Double(v) => format_double(*v),
            Rep::List(items) => format_list(items),
            Rep::Dict(dict) => dict.to_string_rep(),
            Rep::Ext(ext) => ext.update_string().unwrap_or_default(),
        }
    }

    /// Whether this rep relies on the string rep staying cached.
    fn needs_string(&self) -> bool {
        match self {
            Rep::None => true,
            Rep::Ext(ext) => ext.ty.update_string.is_none(),
            _ => false,
        }
    }

    /// Native rep for a duplicated object.
    ///
    /// List and dict payloads are shared and copied lazily by `Rc::make_mut`
    /// on the first mutation of either copy.
    fn duplicate(&self) -> Rep {
        match self {
            Rep::None => Rep::None,
            Rep::Int(v) => Rep::Int(*v),
            Rep::Double(v) => Rep::Double(*v),
            Rep::List(items) => Rep::List(Rc::clone(items)),
            Rep::Dict(dict) => Rep::Dict(Rc::clone(dict)),
            Rep::Ext(ext) => ext.duplicate().map_or(Rep::None, Rep::Ext),
        }
    }
}

struct ObjCell {
    bytes: OnceCell<String>,
    rep: RefCell<Rep>,
    source: RefCell<Option<SourceLoc>>,
}

impl ObjCell {
    fn new(bytes: Option<String>, rep: Rep) -> Self {
        ObjCell {
            bytes: bytes.map_or_else(OnceCell::new, OnceCell::from),
            rep: RefCell::new(rep),
            source: RefCell::new(None),
        }
    }

    /// The string rep, generated from the native rep on first use.
    fn string(&self) -> &str {
        self.bytes
            .get_or_init(|| self.rep.borrow().update_string())
    }
}

/// Duplication for copy-on-write.
impl Clone for ObjCell {
    fn clone(&self) -> Self {
        let rep = self.rep.borrow().duplicate();
        let keep_string = self.bytes.get().is_some() || rep.needs_string();
        let bytes = keep_string.then(|| self.string().to_owned());
        let cell = ObjCell::new(bytes, rep);
        cell.source.replace(self.source.borrow().clone());
        cell
    }
}

/// A reference-counted value.
#[derive(Clone)]
pub struct Obj(Rc<ObjCell>);

impl Obj {
    fn from_parts(bytes: Option<String>, rep: Rep) -> Self {
        Obj(Rc::new(ObjCell::new(bytes, rep)))
    }

    /// A new pure-string object.
    pub fn new_string(text: impl Into<String>) -> Self {
        Self::from_parts(Some(text.into()), Rep::None)
    }

    /// The shared empty string.
    pub fn empty() -> Self {
        intern::empty()
    }

    /// An integer object; small values come from the shared pool.
    pub fn int(value: i64) -> Self {
        intern::small_int(value).unwrap_or_else(|| Self::fresh_int(value))
    }

    /// An unshared integer object, never taken from the pool.
    pub fn fresh_int(value: i64) -> Self {
        Self::from_parts(None, Rep::Int(value))
    }

    pub fn double(value: f64) -> Self {
        Self::from_parts(None, Rep::Double(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::int(i64::from(value))
    }

    pub fn list(items: Vec<Obj>) -> Self {
        Self::from_parts(None, Rep::List(Rc::new(items)))
    }

    pub fn dict(dict: Dict) -> Self {
        Self::from_parts(None, Rep::Dict(Rc::new(dict)))
    }

    /// An object carrying an extension payload.
    ///
    /// `text` is required when the type has no `update_string` hook.
    pub fn from_ext(ty: &'static ObjType, data: Rc<dyn Any>, text: Option<String>) -> Self {
        let text = match text {
            Some(text) => Some(text),
            None if ty.update_string.is_none() => Some(String::new()),
            None => None,
        };
        Self::from_parts(text, Rep::Ext(ExtRep { ty, data }))
    }

    /// Live handle count.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// More than one handle: must not be mutated in place.
    #[inline]
    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.0) > 1
    }

    #[inline]
    pub fn ptr_eq(a: &Obj, b: &Obj) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// The string rep, generated and cached on first use.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.string()
    }

    pub fn is_empty_string(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn has_string_rep(&self) -> bool {
        self.0.bytes.get().is_some()
    }

    /// Name of the current native rep's kind, `"string"` if there is none.
    pub fn type_name(&self) -> &'static str {
        self.0.rep.borrow().type_name()
    }

    pub fn source(&self) -> Option<SourceLoc> {
        self.0.source.borrow().clone()
    }

    /// Annotate with a source location. Does not change the value, so it is
    /// allowed on shared objects.
    pub fn set_source(&self, loc: SourceLoc) {
        self.0.source.replace(Some(loc));
    }

    /// An unshared copy with the same value.
    #[must_use]
    pub fn duplicate(&self) -> Obj {
        Obj(Rc::new((*self.0).clone()))
    }

    /// Replace the native rep. The string rep is materialized first when the
    /// new rep cannot regenerate it.
    fn install(&self, rep: Rep) {
        if rep.needs_string() {
            let _ = self.0.string();
        }
        let old = self.0.rep.replace(rep);
        count_shimmer();
        // Dropped after the borrow ends so a free hook never sees it held.
        drop(old);
    }

    pub fn get_int(&self) -> Result<i64, ValueError> {
        if let Rep::Int(v) = *self.0.rep.borrow() {
            return Ok(v);
        }
        let value = parse_int(self.as_str())?;
        self.install(Rep::Int(value));
        Ok(value)
    }

    pub fn get_double(&self) -> Result<f64, ValueError> {
        match self.get_number() {
            Ok(number) => Ok(number.as_f64()),
            // Too wide for an integer but still a valid double.
            Err(ValueError::IntegerTooLarge(_)) => {
                let value = parse_double(self.as_str())?;
                self.install(Rep::Double(value));
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    /// Integer if the value reads as one, otherwise a double.
    pub fn get_number(&self) -> Result<Number, ValueError> {
        match *self.0.rep.borrow() {
            Rep::Int(v) => return Ok(Number::Int(v)),
            Rep::Double(v) => return Ok(Number::Double(v)),
            _ => {}
        }
        let number = parse_number(self.as_str())?;
        self.install(match number {
            Number::Int(v) => Rep::Int(v),
            Number::Double(v) => Rep::Double(v),
        });
        Ok(number)
    }

    pub fn get_bool(&self) -> Result<bool, ValueError> {
        if let Rep::Int(v) = *self.0.rep.borrow() {
            return Ok(v != 0);
        }
        parse_bool(self.as_str())
    }

    /// The list rep. The returned handle stays valid even if the object
    /// shimmers to another kind afterwards.
    pub fn get_list(&self) -> Result<Rc<Vec<Obj>>, ValueError> {
        let from_dict = match &*self.0.rep.borrow() {
            Rep::List(items) => return Ok(Rc::clone(items)),
            Rep::Dict(dict) => Some(dict.to_flat()),
            _ => None,
        };
        let items = match from_dict {
            Some(items) => items,
            None => parse_list(self.as_str())?,
        };
        let items = Rc::new(items);
        self.install(Rep::List(Rc::clone(&items)));
        Ok(items)
    }

    pub fn list_len(&self) -> Result<usize, ValueError> {
        Ok(self.get_list()?.len())
    }

    pub fn get_dict(&self) -> Result<Rc<Dict>, ValueError> {
        let dict = match &*self.0.rep.borrow() {
            Rep::Dict(dict) => return Ok(Rc::clone(dict)),
            Rep::List(items) => Some(Dict::from_flat(items)?),
            _ => None,
        };
        let dict = match dict {
            Some(dict) => dict,
            None => Dict::from_flat(&parse_list(self.as_str())?)?,
        };
        let dict = Rc::new(dict);
        self.install(Rep::Dict(Rc::clone(&dict)));
        Ok(dict)
    }

    /// The extension payload, if the current native rep is of kind `ty`.
    pub fn ext_rep(&self, ty: &'static ObjType) -> Option<Rc<dyn Any>> {
        match &*self.0.rep.borrow() {
            Rep::Ext(ext) if ext.ty.is(ty) => Some(Rc::clone(&ext.data)),
            _ => None,
        }
    }

    /// Typed access to an extension payload.
    pub fn ext_as<T: Any>(&self, ty: &'static ObjType) -> Option<Rc<T>> {
        self.ext_rep(ty)?.downcast::<T>().ok()
    }

    /// Attach an extension payload computed from this object's value.
    ///
    /// Allowed on shared objects: the value does not change, only its cached
    /// native form.
    pub fn set_ext_rep(&self, ty: &'static ObjType, data: Rc<dyn Any>) {
        self.install(Rep::Ext(ExtRep { ty, data }));
    }

    /// Unique access to the cell, duplicating it first if shared.
    fn cell_mut(&mut self) -> &mut ObjCell {
        Rc::make_mut(&mut self.0)
    }

    pub fn set_string(&mut self, text: impl Into<String>) {
        if self.is_shared() {
            *self = Obj::new_string(text);
            return;
        }
        let cell = self.cell_mut();
        *cell.rep.get_mut() = Rep::None;
        cell.bytes = OnceCell::from(text.into());
    }

    pub fn set_int(&mut self, value: i64) {
        let cell = self.cell_mut();
        cell.bytes.take();
        *cell.rep.get_mut() = Rep::Int(value);
    }

    /// Append to the string rep, dropping any native rep.
    pub fn append_str(&mut self, suffix: &str) {
        let cell = self.cell_mut();
        let mut text = match cell.bytes.take() {
            Some(text) => text,
            None => cell.rep.get_mut().update_string(),
        };
        text.push_str(suffix);
        *cell.rep.get_mut() = Rep::None;
        cell.bytes = OnceCell::from(text);
    }

    /// Mutable access to the element vector, converting and unsharing first.
    /// The string rep is invalidated.
    pub fn list_mut(&mut self) -> Result<&mut Vec<Obj>, ValueError> {
        let items = self.get_list()?;
        let cell = self.cell_mut();
        cell.bytes.take();
        let rep = cell.rep.get_mut();
        // Replacing the old handle leaves `items` unshared unless another
        // object still refers to the same vector.
        *rep = Rep::List(items);
        match rep {
            Rep::List(items) => Ok(Rc::make_mut(items)),
            _ => unreachable!("list rep installed above"),
        }
    }

    pub fn list_push(&mut self, item: Obj) -> Result<(), ValueError> {
        self.list_mut()?.push(item);
        Ok(())
    }

    /// Mutable access to the dict rep, converting and unsharing first.
    pub fn dict_mut(&mut self) -> Result<&mut Dict, ValueError> {
        let dict = self.get_dict()?;
        let cell = self.cell_mut();
        cell.bytes.take();
        let rep = cell.rep.get_mut();
        *rep = Rep::Dict(dict);
        match rep {
            Rep::Dict(dict) => Ok(Rc::make_mut(dict)),
            _ => unreachable!("dict rep installed above"),
        }
    }
}

impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        Obj::ptr_eq(self, other) || self.as_str() == other.as_str()
    }
}

impl Eq for Obj {}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj({:?}: {})", self.as_str(), self.type_name())
    }
}

impl Default for Obj {
    fn default() -> Self {
        Obj::empty()
    }
}

impl From<&str> for Obj {
    fn from(text: &str) -> Self {
        Obj::new_string(text)
    }
}

impl From<String> for Obj {
    fn from(text: String) -> Self {
        Obj::new_string(text)
    }
}

impl From<i64> for Obj {
    fn from(value: i64) -> Self {
        Obj::int(value)
    }
}

impl From<f64> for Obj {
    fn from(value: f64) -> Self {
        Obj::double(value)
    }
}

impl From<bool> for Obj {
    fn from(value: bool) -> Self {
        Obj::bool(value)
    }
}

impl From<Vec<Obj>> for Obj {
    fn from(items: Vec<Obj>) -> Self {
        Obj::list(items)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
