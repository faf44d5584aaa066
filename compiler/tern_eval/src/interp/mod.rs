//! The interpreter: frames, command dispatch and script evaluation.
//!
//! # Evaluation
//!
//! A script object is parsed once (the parse is cached on the object) and
//! its commands run in order. For each command every word is substituted
//! according to its shape, `{*}` words are spliced in as lists, the first
//! word is resolved to a command and the command is invoked with the whole
//! argument vector. Anything other than `Ok` stops the script and travels
//! up as `Err(Flow)` until some construct absorbs it.
//!
//! # Nesting
//!
//! Every invocation goes through [`Interp::nested`], which counts logical
//! depth and makes sure the native stack can hold another level. Going past
//! `max_nesting_depth` is treated as a fatal defect in the script (runaway
//! recursion) and aborts the process.
//!
//! # Error traces
//!
//! The first command to see an error at a given proc level records its
//! location in the error's trace. Leaving a proc clears the "recorded" mark
//! so the call site one level up is recorded next, giving one trace frame
//! per proc level.

mod builder;
pub(crate) mod frames;
mod procs;
mod scope_guard;
mod variables;

use std::path::Path;
use std::rc::Rc;

use smallvec::SmallVec;
use tern_parse::{
    cache_script, cached_script, script_parser, Command as ParsedCommand, Part, Script, VarRef,
    WordKind,
};
use tern_value::{DuplicateType, Obj, ObjType, SourceLoc, TypeRegistry};

use crate::commands::{CachedCommand, Command, CommandKind, CommandTable, COMMAND_TYPE};
use crate::environment::{LocalScope, Vars};
use crate::errors::{
    outside_loop, uncaught_signal, unknown_command, EvalError, EvalResult, Flow, ScriptError,
    StackTrace, TraceFrame,
};
use crate::events::EventLoop;
use crate::packages::PackageRegistry;
use crate::print_handler::SharedPrintHandler;
use crate::signal::SignalHandle;

pub use builder::{InterpBuilder, InterpConfig};
pub use frames::{Frame, FrameKind};
pub(crate) use procs::{absorb_return, apply_return_code};
pub use scope_guard::ScopedInterp;

use frames::CallStack;

/// Argument vector of one command; most commands have few words.
pub(crate) type Argv = SmallVec<[Obj; 8]>;

/// An interpreter instance.
///
/// Single-threaded: it owns `Rc`-based values and must stay on the thread
/// that created it. Only the [`SignalHandle`] may cross threads.
pub struct Interp {
    pub(crate) commands: CommandTable,
    pub(crate) frames: CallStack,
    pub(crate) globals: Vars,
    pub(crate) config: InterpConfig,
    nesting: usize,
    in_unknown: bool,
    print: SharedPrintHandler,
    signals: SignalHandle,
    pub(crate) packages: PackageRegistry,
    pub(crate) events: EventLoop,
    types: TypeRegistry,
    result: Obj,
    /// Trace of the most recent error, for `info stacktrace`.
    pub(crate) last_trace: StackTrace,
    /// File being sourced, for `info script`.
    pub(crate) script_file: Option<Rc<str>>,
    /// Global variables `vwait` is waiting on, and whether each was written.
    pub(crate) watched: rustc_hash::FxHashMap<Rc<str>, bool>,
    /// State of the `rand()` generator.
    pub(crate) rand_state: u64,
}

impl Interp {
    /// An interpreter with the default configuration and all built-in
    /// commands.
    pub fn new() -> Self {
        InterpBuilder::new().build()
    }

    pub fn builder() -> InterpBuilder {
        InterpBuilder::new()
    }

    /// An interpreter with no commands and no variables.
    pub(crate) fn bare(config: InterpConfig, print: SharedPrintHandler) -> Self {
        let globals: Vars = LocalScope::default();
        Interp {
            commands: CommandTable::new(),
            frames: CallStack::new(globals.clone()),
            globals,
            config,
            nesting: 0,
            in_unknown: false,
            print,
            signals: SignalHandle::new(),
            packages: PackageRegistry::default(),
            events: EventLoop::default(),
            types: TypeRegistry::with_core_types(),
            result: Obj::empty(),
            last_trace: StackTrace::default(),
            script_file: None,
            watched: rustc_hash::FxHashMap::default(),
            rand_state: 0x2545_f491_4f6c_dd1d,
        }
    }

    pub fn config(&self) -> &InterpConfig {
        &self.config
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    /// Handle for raising signals from another context.
    pub fn signal_handle(&self) -> SignalHandle {
        self.signals.clone()
    }

    /// Result of the last completed top-level evaluation.
    pub fn result(&self) -> &Obj {
        &self.result
    }

    pub fn reset_result(&mut self) {
        self.result = Obj::empty();
    }

    /// Make an extension object type known by name.
    pub fn register_type(&mut self, ty: &'static ObjType) -> Result<(), DuplicateType> {
        self.types.register(ty)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Active call frame.
    pub fn frame(&self) -> &Frame {
        self.frames.current()
    }

    // Top-level evaluation

    /// Evaluate `script` in the active frame, as the host sees it.
    ///
    /// A stray `break` or `continue` becomes an error, a `return` completes
    /// normally with its value, and an error updates `::errorInfo` and
    /// `::errorCode`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval(&mut self, script: &str) -> Result<Obj, EvalError> {
        let script = Obj::new_string(script);
        let result = self.eval_obj(&script);
        self.complete(result)
    }

    /// Evaluate the contents of a file. Errors carry the file name in their
    /// trace.
    pub fn eval_file(&mut self, path: impl AsRef<Path>) -> Result<Obj, EvalError> {
        let result = self.source_file(path.as_ref());
        self.complete(result)
    }

    /// Turn the outcome of a top-level evaluation into what the host sees.
    fn complete(&mut self, result: EvalResult) -> Result<Obj, EvalError> {
        let result = match result {
            Err(Flow::Return {
                value,
                code,
                error_code,
                ..
            }) => apply_return_code(value, code, error_code),
            other => other,
        };
        let error = match result {
            Ok(value) => {
                self.result = value.clone();
                return Ok(value);
            }
            Err(Flow::Exit(code)) => return Err(EvalError::Exit(code)),
            Err(Flow::Error(err)) => err,
            Err(Flow::Signal(signal)) => Box::new(uncaught_signal(signal)),
            Err(flow @ (Flow::Break | Flow::Continue)) => Box::new(outside_loop(&flow)),
            Err(Flow::Return { .. }) => Box::new(ScriptError::new("invalid return code")),
        };
        self.note_error(&error);
        self.result = error.message.clone();
        Err(EvalError::Script(error))
    }

    /// Publish an error through `::errorInfo`, `::errorCode` and
    /// `info stacktrace`.
    pub(crate) fn note_error(&mut self, err: &ScriptError) {
        self.last_trace = err.trace.clone();
        let mut globals = self.globals.borrow_mut();
        globals.set(Rc::from("errorInfo"), Obj::new_string(err.error_info()));
        globals.set(Rc::from("errorCode"), err.error_code_obj());
    }

    /// Read, parse and evaluate a file in the active frame. A `return` at
    /// the file's top level ends the file.
    pub(crate) fn source_file(&mut self, path: &Path) -> EvalResult {
        let text = std::fs::read_to_string(path).map_err(|err| {
            ScriptError::new(format!("couldn't read file \"{}\": {err}", path.display()))
        })?;
        let file: Rc<str> = Rc::from(path.to_string_lossy().as_ref());
        tracing::debug!(file = %file, "source");
        let script = Obj::new_string(text);
        script.set_source(SourceLoc {
            file: Rc::clone(&file),
            line: 1,
        });
        let outer = self.script_file.replace(file);
        let result = self.eval_obj(&script);
        self.script_file = outer;
        absorb_return(result)
    }

    // Script evaluation

    /// Evaluate a script object in the active frame.
    pub fn eval_obj(&mut self, script: &Obj) -> EvalResult {
        match cached_script(script) {
            Some(parsed) => self.eval_script(&parsed),
            None => self.eval_unparsed(script),
        }
    }

    /// First run of a script: each command runs as soon as it is parsed.
    /// The parse is cached once the whole text has been read, including
    /// when a command stops the script early.
    fn eval_unparsed(&mut self, script: &Obj) -> EvalResult {
        let mut parser = script_parser(script);
        let file = parser.file().cloned();
        let mut commands = Vec::new();
        let mut result = Obj::empty();
        while let Some(command) = parser.next_command() {
            let command = command?;
            let outcome = self.eval_command(&command, file.as_ref());
            commands.push(command);
            match outcome {
                Ok(value) => result = value,
                Err(flow) => {
                    if let Ok(rest) = parser.by_ref().collect::<Result<Vec<_>, _>>() {
                        commands.extend(rest);
                        cache_script(script, Script { commands, file });
                    }
                    return Err(flow);
                }
            }
        }
        cache_script(script, Script { commands, file });
        Ok(result)
    }

    /// Evaluate an already parsed script in the active frame.
    pub(crate) fn eval_script(&mut self, script: &Script) -> EvalResult {
        let mut result = Obj::empty();
        for command in &script.commands {
            result = self.eval_command(command, script.file.as_ref())?;
        }
        Ok(result)
    }

    fn eval_command(&mut self, command: &ParsedCommand, file: Option<&Rc<str>>) -> EvalResult {
        self.poll_signals()?;
        let frame = self.frames.current_mut();
        frame.line = command.line;
        frame.file = file.cloned();
        let outcome = match self.substitute_command(command) {
            Ok(argv) if argv.is_empty() => Ok(Obj::empty()),
            Ok(argv) => self.invoke(&argv),
            Err(flow) => Err(flow),
        };
        outcome.map_err(|flow| self.record_site(flow, command.line, file))
    }

    /// Add this proc level's location to an error's trace, once.
    fn record_site(&self, flow: Flow, line: u32, file: Option<&Rc<str>>) -> Flow {
        match flow {
            Flow::Error(mut err) if !err.site_recorded => {
                err.site_recorded = true;
                let frame = TraceFrame {
                    proc: Rc::clone(&self.frames.current().proc_name),
                    file: file.cloned(),
                    line,
                };
                err.trace.push(frame, self.config.max_trace_depth);
                Flow::Error(err)
            }
            other => other,
        }
    }

    /// Convert a pending signal into [`Flow::Signal`].
    fn poll_signals(&self) -> Result<(), Flow> {
        match self.signals.take() {
            Some(signal) => {
                tracing::debug!(signal, "signal delivered");
                Err(Flow::Signal(signal))
            }
            None => Ok(()),
        }
    }

    // Substitution

    /// Substitute every word of a command into an argument vector.
    pub(crate) fn substitute_command(&mut self, command: &ParsedCommand) -> Result<Argv, Flow> {
        let mut argv = Argv::with_capacity(command.words.len());
        for word in &command.words {
            let value = self.substitute_word(&word.kind)?;
            if word.expand {
                argv.extend(value.get_list()?.iter().cloned());
            } else {
                argv.push(value);
            }
        }
        Ok(argv)
    }

    /// The value of one word. A word that is a single substitution yields
    /// the substituted object itself, native rep and all.
    pub(crate) fn substitute_word(&mut self, kind: &WordKind) -> EvalResult {
        match kind {
            WordKind::Literal(text) => Ok(text.clone()),
            WordKind::Single(part) => self.substitute_part(part),
            WordKind::Multi(parts) => self.substitute_parts(parts),
        }
    }

    /// Substitute and concatenate a sequence of parts.
    pub(crate) fn substitute_parts(&mut self, parts: &[Part]) -> EvalResult {
        let mut text = String::new();
        for part in parts {
            let value = self.substitute_part(part)?;
            text.push_str(value.as_str());
        }
        Ok(Obj::new_string(text))
    }

    fn substitute_part(&mut self, part: &Part) -> EvalResult {
        match part {
            Part::Text(text) => Ok(text.clone()),
            Part::Var(var) => self.read_var_ref(var),
            Part::Script(script) => self.nested(|interp| interp.eval_script(script)),
        }
    }

    fn read_var_ref(&mut self, var: &VarRef) -> EvalResult {
        match &var.index {
            None => Ok(self.get_var(var.name.as_str())?),
            Some(index) => {
                let index = self.substitute_word(index)?;
                Ok(self.get_element(var.name.as_str(), index.as_str())?)
            }
        }
    }

    // Dispatch

    /// Invoke the command named by `argv[0]` with the whole vector.
    pub fn invoke(&mut self, argv: &[Obj]) -> EvalResult {
        let Some(name) = argv.first() else {
            return Ok(Obj::empty());
        };
        match self.lookup_command(name) {
            Some(command) => self.nested(|interp| interp.call_command(&command, argv)),
            None => self.invoke_unknown(argv),
        }
    }

    fn call_command(&mut self, command: &Command, argv: &[Obj]) -> EvalResult {
        match &command.kind {
            CommandKind::Native(f) => f(self, argv),
            CommandKind::Proc(proc) => self.call_proc(proc, argv),
        }
    }

    /// Hand an unresolvable command to the `unknown` command if one exists.
    fn invoke_unknown(&mut self, argv: &[Obj]) -> EvalResult {
        let handler = if self.in_unknown {
            None
        } else {
            self.commands.get("unknown").cloned()
        };
        let Some(handler) = handler else {
            return Err(unknown_command(argv[0].as_str()).into());
        };
        let mut words = Vec::with_capacity(argv.len() + 1);
        words.push(Obj::new_string("unknown"));
        words.extend_from_slice(argv);
        self.in_unknown = true;
        let result = self.nested(|interp| interp.call_command(&handler, &words));
        self.in_unknown = false;
        result
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        if self.nesting >= self.config.max_nesting_depth {
            self.nesting_overflow();
        }
        self.nesting += 1;
        let out = tern_stack::ensure_sufficient_stack(|| f(self));
        self.nesting -= 1;
        out
    }

    #[cold]
    fn nesting_overflow(&self) -> ! {
        tracing::error!(
            depth = self.nesting,
            limit = self.config.max_nesting_depth,
            remaining_stack = ?tern_stack::remaining_stack(),
            "nesting limit exceeded"
        );
        eprintln!(
            "tern: too many nested evaluations ({}); infinite recursion? aborting",
            self.nesting
        );
        std::process::abort()
    }

    // Command table

    /// Resolve a command name against the active namespace, using and
    /// refreshing the cache stored on `name`.
    pub(crate) fn lookup_command(&self, name: &Obj) -> Option<Rc<Command>> {
        let namespace = &self.frames.current().namespace;
        if let Some(cached) = name.ext_as::<CachedCommand>(&COMMAND_TYPE) {
            if cached.epoch == self.commands.epoch() && cached.namespace == *namespace {
                if let Some(command) = cached.command.upgrade() {
                    return Some(command);
                }
            }
        }
        let command = Rc::clone(self.find_command(name.as_str())?.1);
        name.set_ext_rep(
            &COMMAND_TYPE,
            Rc::new(CachedCommand {
                epoch: self.commands.epoch(),
                namespace: Rc::clone(namespace),
                command: Rc::downgrade(&command),
            }),
        );
        Some(command)
    }

    /// Resolve a command name to its table key and record. A relative name
    /// is tried in the active namespace first, then globally.
    pub(crate) fn find_command(&self, name: &str) -> Option<(&Rc<str>, &Rc<Command>)> {
        if let Some(absolute) = name.strip_prefix("::") {
            return self.commands.get_key_value(absolute);
        }
        let namespace = &self.frames.current().namespace;
        if !namespace.is_empty() {
            let qualified = format!("{namespace}::{name}");
            if let Some(found) = self.commands.get_key_value(&qualified) {
                return Some(found);
            }
        }
        self.commands.get_key_value(name)
    }

    /// Table key a new command called `name` is created under.
    pub(crate) fn qualify_command(&self, name: &str) -> Rc<str> {
        if let Some(absolute) = name.strip_prefix("::") {
            return Rc::from(absolute);
        }
        let namespace = &self.frames.current().namespace;
        if namespace.is_empty() {
            Rc::from(name)
        } else {
            Rc::from(format!("{namespace}::{name}"))
        }
    }

    /// Define a native command in the active namespace.
    pub fn create_command(
        &mut self,
        name: &str,
        f: impl Fn(&mut Interp, &[Obj]) -> EvalResult + 'static,
    ) {
        let key = self.qualify_command(name);
        self.commands.insert(key, Command::native(f));
    }

    /// Define a native command owning state released by `on_delete`.
    pub fn create_command_with_delete(
        &mut self,
        name: &str,
        f: impl Fn(&mut Interp, &[Obj]) -> EvalResult + 'static,
        on_delete: impl FnOnce() + 'static,
    ) {
        let key = self.qualify_command(name);
        self.commands
            .insert(key, Command::native(f).with_delete(Box::new(on_delete)));
    }

    /// Define (or replace) a command record under `name`.
    pub fn define_command(&mut self, name: &str, command: Command) {
        let key = self.qualify_command(name);
        self.commands.insert(key, command);
    }

    pub fn delete_command(&mut self, name: &str) -> Result<(), ScriptError> {
        let key = self.find_command(name).map(|(key, _)| Rc::clone(key));
        match key {
            Some(key) => {
                self.commands.remove(&key);
                Ok(())
            }
            None => Err(ScriptError::new(format!(
                "can't delete \"{name}\": command doesn't exist"
            ))),
        }
    }

    /// Rename a command; an empty new name deletes it.
    pub fn rename_command(&mut self, old: &str, new: &str) -> Result<(), ScriptError> {
        if new.is_empty() {
            return self.delete_command(old);
        }
        let Some(key) = self.find_command(old).map(|(key, _)| Rc::clone(key)) else {
            return Err(ScriptError::new(format!(
                "can't rename \"{old}\": command doesn't exist"
            )));
        };
        let new = self.qualify_command(new);
        self.commands.rename(&key, new)
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.find_command(name).is_some()
    }

    // Output

    /// Write through the interpreter's print handler.
    pub fn write(&self, channel: crate::Channel, text: &str) {
        self.print.write(channel, text);
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Interp {
    fn drop(&mut self) {
        tracing::debug!(commands = self.commands.len(), "drop interpreter");
        // Delete callbacks run before variables and packages go away.
        self.commands.clear();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
