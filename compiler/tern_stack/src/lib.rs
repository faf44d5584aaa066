//! Stack growth guard for deep recursion.
//!
//! Script evaluation in Tern is recursive: a `[...]` substitution evaluates
//! a nested script, a procedure call evaluates its body, and the expression
//! engine walks nested operator trees. The interpreter bounds the *logical*
//! nesting depth itself; this crate makes sure the native stack can actually
//! hold that many levels.
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: passthrough.
//!
//! # Configuration
//!
//! - **Red zone**: 128KB. If less than this remains, grow.
//! - **Growth size**: 2MB per segment. One evaluator level (substitution,
//!   argument vector, frame bookkeeping) is a few KB, so a segment covers
//!   several hundred levels.

/// Minimum stack space to keep available before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Stack space to allocate when growing.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// Wrap every recursive entry point (script evaluation, procedure call,
/// expression evaluation, parser recursion into `[...]`):
///
/// ```text
/// fn eval_script(&mut self, script: &Obj) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_script_inner(script))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version, calls `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining native stack in bytes, if the platform can report it.
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

/// WASM version: unknown.
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests;
