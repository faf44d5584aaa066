//! Command table and command records.
//!
//! Every command is either a native function or a script-defined procedure.
//! The table owns one `Rc<Command>` per name; an invocation clones that `Rc`
//! so a command that deletes or renames itself keeps running safely.
//!
//! # Resolution cache
//!
//! The object naming a command (usually a literal word of a parsed script,
//! evaluated many times) caches the resolved command as a native rep. The
//! cache records the table's epoch; every create, delete and rename bumps
//! the epoch, so a stale cache is simply ignored and the name resolved again.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tern_value::{Obj, ObjType};

use crate::errors::{EvalResult, ScriptError};
use crate::Interp;

/// Signature of a native command. `argv[0]` is the command name as invoked.
pub type NativeFn = dyn Fn(&mut Interp, &[Obj]) -> EvalResult;

/// Runs once when a command is deleted or the interpreter is dropped.
pub type DeleteFn = Box<dyn FnOnce()>;

/// A formal parameter of a procedure.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: Rc<str>,
    pub default: Option<Obj>,
}

/// A script-defined procedure.
#[derive(Debug)]
pub struct Proc {
    pub params: Vec<Param>,
    /// The last parameter is `args` and collects the remaining arguments.
    pub variadic: bool,
    pub body: Obj,
    /// Namespace the procedure was defined in; its body resolves names
    /// relative to it.
    pub namespace: Rc<str>,
    /// Parameter list exactly as written, for `info args`.
    pub arg_spec: Obj,
}

impl Proc {
    /// Build from an argument specification such as `{a {b 2} args}`.
    pub fn new(arg_spec: Obj, body: Obj, namespace: Rc<str>) -> Result<Self, ScriptError> {
        let specs = arg_spec.get_list()?;
        let mut params = Vec::with_capacity(specs.len());
        let mut variadic = false;
        for (i, spec) in specs.iter().enumerate() {
            let fields = spec.get_list()?;
            let (name, default) = match fields.as_slice() {
                [name] => (name.clone(), None),
                [name, default] => (name.clone(), Some(default.clone())),
                [] => return Err(ScriptError::new("argument with no name")),
                _ => {
                    return Err(ScriptError::new(format!(
                        "too many fields in argument specifier \"{spec}\""
                    )))
                }
            };
            if name.is_empty_string() {
                return Err(ScriptError::new("argument with no name"));
            }
            if name.as_str() == "args" && i + 1 == specs.len() {
                variadic = true;
            }
            params.push(Param {
                name: Rc::from(name.as_str()),
                default,
            });
        }
        Ok(Proc {
            params,
            variadic,
            body,
            namespace,
            arg_spec,
        })
    }

    /// Parameters bound positionally, excluding a trailing `args`.
    pub fn fixed_params(&self) -> &[Param] {
        let fixed = self.params.len() - usize::from(self.variadic);
        &self.params[..fixed]
    }

    /// `name a ?b? ?arg ...?`, as shown in a wrong # args error.
    pub fn usage(&self, name: &str) -> String {
        let mut usage = name.to_string();
        for param in self.fixed_params() {
            usage.push(' ');
            if param.default.is_some() {
                usage.push('?');
                usage.push_str(&param.name);
                usage.push('?');
            } else {
                usage.push_str(&param.name);
            }
        }
        if self.variadic {
            usage.push_str(" ?arg ...?");
        }
        usage
    }
}

#[derive(Clone)]
pub enum CommandKind {
    Native(Rc<NativeFn>),
    Proc(Rc<Proc>),
}

/// One entry of the command table.
pub struct Command {
    pub kind: CommandKind,
    on_delete: RefCell<Option<DeleteFn>>,
}

impl Command {
    pub fn native(f: impl Fn(&mut Interp, &[Obj]) -> EvalResult + 'static) -> Self {
        Command {
            kind: CommandKind::Native(Rc::new(f)),
            on_delete: RefCell::new(None),
        }
    }

    pub fn proc(proc: Proc) -> Self {
        Command {
            kind: CommandKind::Proc(Rc::new(proc)),
            on_delete: RefCell::new(None),
        }
    }

    /// Attach a callback that releases state owned by the command.
    #[must_use]
    pub fn with_delete(self, on_delete: DeleteFn) -> Self {
        self.on_delete.replace(Some(on_delete));
        self
    }

    pub fn as_proc(&self) -> Option<&Rc<Proc>> {
        match &self.kind {
            CommandKind::Proc(proc) => Some(proc),
            CommandKind::Native(_) => None,
        }
    }

    fn run_delete(&self) {
        let callback = self.on_delete.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CommandKind::Native(_) => f.write_str("Command::Native"),
            CommandKind::Proc(proc) => f.debug_tuple("Command::Proc").field(proc).finish(),
        }
    }
}

/// Name to command, in creation order.
#[derive(Default)]
pub struct CommandTable {
    commands: IndexMap<Rc<str>, Rc<Command>, FxBuildHasher>,
    epoch: u64,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes whenever a name starts or stops resolving to a command.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Rc<Command>> {
        self.commands.get(name)
    }

    #[inline]
    pub fn get_key_value(&self, name: &str) -> Option<(&Rc<str>, &Rc<Command>)> {
        self.commands.get_key_value(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Define `name`, replacing (and deleting) any previous command.
    pub fn insert(&mut self, name: Rc<str>, command: Command) {
        tracing::debug!(name = %name, "create command");
        self.epoch += 1;
        if let Some(old) = self.commands.insert(name, Rc::new(command)) {
            old.run_delete();
        }
    }

    /// Delete `name`. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.commands.shift_remove(name) {
            Some(command) => {
                tracing::debug!(name, "delete command");
                self.epoch += 1;
                command.run_delete();
                true
            }
            None => false,
        }
    }

    /// Move a command to a new name. Its delete callback stays attached.
    pub fn rename(&mut self, old: &str, new: Rc<str>) -> Result<(), ScriptError> {
        if self.commands.contains_key(&*new) {
            return Err(ScriptError::new(format!(
                "can't rename to \"{new}\": command already exists"
            )));
        }
        let Some(command) = self.commands.shift_remove(old) else {
            return Err(ScriptError::new(format!(
                "can't rename \"{old}\": command doesn't exist"
            )));
        };
        tracing::debug!(old, new = %new, "rename command");
        self.epoch += 1;
        self.commands.insert(new, command);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &Rc<str>> {
        self.commands.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Rc<Command>)> {
        self.commands.iter()
    }

    /// Delete everything, running delete callbacks in creation order.
    pub fn clear(&mut self) {
        self.epoch += 1;
        for (_, command) in self.commands.drain(..) {
            command.run_delete();
        }
    }
}

impl Drop for CommandTable {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Native rep kind of a command name that has been resolved.
pub static COMMAND_TYPE: ObjType = ObjType::cache("command");

/// Cached resolution stored on a command-name object.
pub(crate) struct CachedCommand {
    pub(crate) epoch: u64,
    pub(crate) namespace: Rc<str>,
    pub(crate) command: Weak<Command>,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
