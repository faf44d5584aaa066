//! The call-frame stack.
//!
//! Frames live in a `Vec` in push order; the frame that is *active* is
//! tracked separately as `current`, because `uplevel` evaluates in an outer
//! frame while the inner ones stay on the stack. Each frame records the
//! frame that was active when it was pushed (`caller`), and relative levels
//! are resolved by following those links, not by position in the `Vec`.

use std::rc::Rc;

use tern_value::Obj;

use crate::environment::Vars;
use crate::errors::{bad_level, ScriptError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// The outermost frame; its variables are the global namespace.
    Global,
    /// A procedure (or `apply`) body with its own local variables.
    Proc,
    /// A `namespace eval` body: simple names resolve in that namespace.
    Namespace,
}

#[derive(Debug)]
pub struct Frame {
    pub kind: FrameKind,
    pub vars: Vars,
    /// Current namespace, without the leading `::`; empty for global.
    pub namespace: Rc<str>,
    /// Procedure running in this frame, empty at the top level.
    pub proc_name: Rc<str>,
    /// Words of the invocation that pushed the frame.
    pub call: Vec<Obj>,
    /// Index of the frame that was active when this one was pushed.
    pub caller: usize,
    /// Number of frames between this one and the global frame.
    pub level: usize,
    /// Location of the command being evaluated.
    pub line: u32,
    pub file: Option<Rc<str>>,
}

impl Frame {
    pub fn global(vars: Vars) -> Self {
        Frame {
            kind: FrameKind::Global,
            vars,
            namespace: Rc::from(""),
            proc_name: Rc::from(""),
            call: Vec::new(),
            caller: 0,
            level: 0,
            line: 0,
            file: None,
        }
    }

    /// A frame for a call; `caller` and `level` are filled in on push.
    pub fn new(
        kind: FrameKind,
        vars: Vars,
        namespace: Rc<str>,
        proc_name: Rc<str>,
        call: Vec<Obj>,
    ) -> Self {
        Frame {
            kind,
            vars,
            namespace,
            proc_name,
            call,
            caller: 0,
            level: 0,
            line: 0,
            file: None,
        }
    }
}

#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
    current: usize,
}

impl CallStack {
    pub fn new(globals: Vars) -> Self {
        CallStack {
            frames: vec![Frame::global(globals)],
            current: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> &Frame {
        &self.frames[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.current]
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frames on the stack, the global frame included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push `frame` as a callee of the active frame and make it active.
    /// Returns the index that was active before.
    pub fn push(&mut self, mut frame: Frame) -> usize {
        let caller = self.current;
        frame.caller = caller;
        frame.level = self.frames[caller].level + 1;
        self.frames.push(frame);
        self.current = self.frames.len() - 1;
        caller
    }

    /// Pop the top frame and reactivate `restore`.
    pub fn pop(&mut self, restore: usize) -> Option<Frame> {
        debug_assert!(self.frames.len() > 1, "popped the global frame");
        let frame = if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        };
        self.current = restore.min(self.frames.len() - 1);
        frame
    }

    /// Make `index` the active frame. Returns the previous one.
    pub fn activate(&mut self, index: usize) -> usize {
        let previous = self.current;
        self.current = index.min(self.frames.len() - 1);
        previous
    }

    /// The frame at absolute `level` on the active frame's caller chain.
    pub fn at_level(&self, level: usize) -> Option<usize> {
        let mut index = self.current;
        loop {
            let frame = &self.frames[index];
            if frame.level == level {
                return Some(index);
            }
            if frame.level < level || index == 0 {
                return None;
            }
            index = frame.caller;
        }
    }

    /// Resolve a level argument: `#N` is absolute, `N` is relative to the
    /// active frame.
    pub fn resolve_level(&self, text: &str) -> Result<usize, ScriptError> {
        let level = match text.strip_prefix('#') {
            Some(abs) => abs.parse::<usize>().ok(),
            None => text
                .parse::<usize>()
                .ok()
                .and_then(|up| self.current().level.checked_sub(up)),
        };
        level
            .and_then(|level| self.at_level(level))
            .ok_or_else(|| bad_level(text))
    }
}

/// Whether `word` reads as a level (`#N` or a non-negative integer), used to
/// decide if an optional level argument was supplied.
pub fn looks_like_level(word: &str) -> bool {
    let digits = word.strip_prefix('#').unwrap_or(word);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
