//! Type descriptors: the per-kind behavior table attached to a native rep.
//!
//! The core kinds (int, double, list, dict) are variants of a closed enum
//! inside [`Obj`](crate::Obj). Everything else (parsed scripts, compiled
//! expressions, command lookup caches, extension handles) is carried as an
//! *extension rep*: an `Rc<dyn Any>` payload tagged with a `&'static ObjType`
//! that says how to free, duplicate and re-stringify it.
//!
//! A kind with no `update_string` hook is a pure cache: the object keeps its
//! string rep for as long as the cache is attached.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Behavior table for one native representation kind.
pub struct ObjType {
    /// Unique name, also used as the registry key.
    pub name: &'static str,
    /// Regenerate the string form from the payload.
    pub update_string: Option<fn(&dyn Any) -> String>,
    /// Produce an independent payload for a duplicated object. Without it the
    /// duplicate drops the native rep and keeps only the string.
    pub dup: Option<fn(&dyn Any) -> Rc<dyn Any>>,
    /// Called exactly once when a payload is discarded.
    pub free: Option<fn(&dyn Any)>,
}

impl ObjType {
    /// A cache kind: no string regeneration, no duplication, no free hook.
    pub const fn cache(name: &'static str) -> Self {
        ObjType {
            name,
            update_string: None,
            dup: None,
            free: None,
        }
    }

    #[inline]
    pub fn is(&self, other: &ObjType) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for ObjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjType({})", self.name)
    }
}

pub static INT_TYPE: ObjType = ObjType::cache("int");
pub static DOUBLE_TYPE: ObjType = ObjType::cache("double");
pub static LIST_TYPE: ObjType = ObjType::cache("list");
pub static DICT_TYPE: ObjType = ObjType::cache("dict");

/// An attached extension payload. Dropping it runs the free hook.
pub(crate) struct ExtRep {
    pub(crate) ty: &'static ObjType,
    pub(crate) data: Rc<dyn Any>,
}

impl ExtRep {
    pub(crate) fn duplicate(&self) -> Option<ExtRep> {
        self.ty.dup.map(|dup| ExtRep {
            ty: self.ty,
            data: dup(&*self.data),
        })
    }

    pub(crate) fn update_string(&self) -> Option<String> {
        self.ty.update_string.map(|f| f(&*self.data))
    }
}

impl Drop for ExtRep {
    fn drop(&mut self) {
        if let Some(free) = self.ty.free {
            free(&*self.data);
        }
    }
}

/// Error from [`TypeRegistry::register`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("object type \"{0}\" is already registered")]
pub struct DuplicateType(pub &'static str);

/// Interpreter-wide table of known object types.
///
/// Extensions register their descriptors at init time so the interpreter can
/// report and look them up by name.
#[derive(Debug)]
pub struct TypeRegistry {
    types: FxHashMap<&'static str, &'static ObjType>,
}

impl TypeRegistry {
    /// A registry holding the four core kinds.
    pub fn with_core_types() -> Self {
        let mut types = FxHashMap::default();
        for ty in [&INT_TYPE, &DOUBLE_TYPE, &LIST_TYPE, &DICT_TYPE] {
            types.insert(ty.name, ty);
        }
        TypeRegistry { types }
    }

    pub fn register(&mut self, ty: &'static ObjType) -> Result<(), DuplicateType> {
        match self.types.get(ty.name) {
            Some(existing) if existing.is(ty) => Ok(()),
            Some(_) => Err(DuplicateType(ty.name)),
            None => {
                self.types.insert(ty.name, ty);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&'static ObjType> {
        self.types.get(name).copied()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_core_types()
    }
}
