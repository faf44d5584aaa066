//! Tern values: reference-counted objects with a dual string/native
//! representation.
//!
//! Every script value is an [`Obj`]. Its canonical form is a string; a
//! native form (integer, double, list, dict, or an extension payload) is
//! computed on demand and cached. The object layer knows nothing about the
//! parser or evaluator: their caches plug in as extension reps described by
//! an [`ObjType`].

mod dict;
mod error;
pub mod escape;
mod intern;
pub mod list;
pub mod number;
mod obj;
mod types;

pub use dict::Dict;
pub use error::ValueError;
pub use list::{format_list, parse_index, parse_list, quote_element, ListIndex};
pub use number::{format_double, parse_bool, parse_double, parse_int, parse_number, Number};
pub use obj::{shimmer_count, Obj, SourceLoc};
pub use types::{DuplicateType, ObjType, TypeRegistry, DICT_TYPE, DOUBLE_TYPE, INT_TYPE, LIST_TYPE};
