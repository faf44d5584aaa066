//! RAII guards for frame management.
//!
//! [`ScopedInterp`] holds `&mut Interp` and derefs to it, so code running
//! "inside" a frame uses the guard exactly like the interpreter. Dropping the
//! guard undoes what created it: a pushed frame is popped (releasing its
//! local variables and invalidating links into it), or the active frame
//! switched by `uplevel` is switched back. This happens on every exit path,
//! including `?` early returns and unwinding.

use std::ops::{Deref, DerefMut};

use super::frames::Frame;
use super::Interp;

enum Restore {
    /// Pop the top frame, then reactivate this index.
    Pop(usize),
    /// Reactivate this index.
    Activate(usize),
}

pub struct ScopedInterp<'a> {
    interp: &'a mut Interp,
    restore: Restore,
}

impl Drop for ScopedInterp<'_> {
    fn drop(&mut self) {
        match self.restore {
            Restore::Pop(index) => {
                if let Some(frame) = self.interp.frames.pop(index) {
                    tracing::debug!(level = frame.level, proc = %frame.proc_name, "pop frame");
                }
            }
            Restore::Activate(index) => {
                self.interp.frames.activate(index);
            }
        }
    }
}

impl Deref for ScopedInterp<'_> {
    type Target = Interp;

    fn deref(&self) -> &Interp {
        self.interp
    }
}

impl DerefMut for ScopedInterp<'_> {
    fn deref_mut(&mut self) -> &mut Interp {
        self.interp
    }
}

impl Interp {
    /// Push `frame` for as long as the returned guard lives.
    pub(crate) fn scoped(&mut self, frame: Frame) -> ScopedInterp<'_> {
        let restore = self.frames.push(frame);
        tracing::debug!(
            level = self.frames.current().level,
            proc = %self.frames.current().proc_name,
            "push frame"
        );
        ScopedInterp {
            interp: self,
            restore: Restore::Pop(restore),
        }
    }

    /// Make frame `index` active for as long as the returned guard lives.
    pub(crate) fn at_frame(&mut self, index: usize) -> ScopedInterp<'_> {
        let restore = self.frames.activate(index);
        ScopedInterp {
            interp: self,
            restore: Restore::Activate(restore),
        }
    }

    /// Run `f` inside a freshly pushed frame.
    pub(crate) fn with_frame<T>(&mut self, frame: Frame, f: impl FnOnce(&mut Interp) -> T) -> T {
        let mut scoped = self.scoped(frame);
        f(&mut scoped)
    }

    /// Run `f` with frame `index` active.
    pub(crate) fn with_level<T>(&mut self, index: usize, f: impl FnOnce(&mut Interp) -> T) -> T {
        let mut scoped = self.at_frame(index);
        f(&mut scoped)
    }
}
