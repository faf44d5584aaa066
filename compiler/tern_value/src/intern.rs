//! Shared singletons for the most common values.
//!
//! Every evaluation produces empty results and small loop counters; handing
//! out a shared object for those avoids an allocation each time. Sharing is
//! safe because a shared object is never mutated in place.

use crate::Obj;

const SMALL_INT_MIN: i64 = -1;
const SMALL_INT_MAX: i64 = 256;

struct ObjPool {
    empty: Obj,
    ints: Vec<Obj>,
}

impl ObjPool {
    fn new() -> Self {
        ObjPool {
            empty: Obj::new_string(""),
            ints: (SMALL_INT_MIN..=SMALL_INT_MAX).map(Obj::fresh_int).collect(),
        }
    }
}

thread_local! {
    static POOL: ObjPool = ObjPool::new();
}

pub(crate) fn empty() -> Obj {
    POOL.with(|pool| pool.empty.clone())
}

pub(crate) fn small_int(value: i64) -> Option<Obj> {
    if !(SMALL_INT_MIN..=SMALL_INT_MAX).contains(&value) {
        return None;
    }
    let slot = (value - SMALL_INT_MIN) as usize;
    POOL.with(|pool| pool.ints.get(slot).cloned())
}
