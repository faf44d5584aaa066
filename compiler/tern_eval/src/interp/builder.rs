//! `InterpBuilder` for creating interpreters with non-default settings.

use std::rc::Rc;

use tern_value::Obj;

use crate::packages::Extension;
use crate::print_handler::{stdout_handler, SharedPrintHandler};

use super::Interp;

/// Limits and switches fixed at construction.
#[derive(Clone, Debug)]
pub struct InterpConfig {
    /// Nested evaluations (commands, substitutions, calls) allowed before
    /// the process is aborted.
    pub max_nesting_depth: usize,
    /// Frames kept in an error's stack trace.
    pub max_trace_depth: usize,
}

impl Default for InterpConfig {
    fn default() -> Self {
        InterpConfig {
            max_nesting_depth: 1000,
            max_trace_depth: 100,
        }
    }
}

/// Builder for [`Interp`].
///
/// ```text
/// let interp = Interp::builder()
///     .print_handler(buffer_handler())
///     .script_name("main.tern")
///     .argv(["a", "b"])
///     .build();
/// ```
pub struct InterpBuilder {
    config: InterpConfig,
    print_handler: Option<SharedPrintHandler>,
    script_name: Option<String>,
    argv: Vec<String>,
    extensions: Vec<Rc<dyn Extension>>,
    auto_path: Vec<String>,
    interactive: bool,
}

impl InterpBuilder {
    pub fn new() -> Self {
        InterpBuilder {
            config: InterpConfig::default(),
            print_handler: None,
            script_name: None,
            argv: Vec::new(),
            extensions: Vec::new(),
            auto_path: Vec::new(),
            interactive: false,
        }
    }

    #[must_use]
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    #[must_use]
    pub fn max_trace_depth(mut self, depth: usize) -> Self {
        self.config.max_trace_depth = depth;
        self
    }

    /// Where `puts` writes. Defaults to the process's stdout and stderr.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Value of `::argv0`.
    #[must_use]
    pub fn script_name(mut self, name: impl Into<String>) -> Self {
        self.script_name = Some(name.into());
        self
    }

    /// Values of `::argv` (and so `::argc`).
    #[must_use]
    pub fn argv<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv = args.into_iter().map(Into::into).collect();
        self
    }

    /// Make a static extension available to `package require`.
    #[must_use]
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Rc::new(extension));
        self
    }

    /// Directories searched for `<name>.tern` by `package require`.
    #[must_use]
    pub fn auto_path<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auto_path = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Value of `::tern_interactive`.
    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn build(self) -> Interp {
        let print = self.print_handler.unwrap_or_else(stdout_handler);
        let mut interp = Interp::bare(self.config, print);
        crate::builtins::register_all(&mut interp);
        for extension in self.extensions {
            interp.packages.register_extension(extension);
        }

        let argv0 = self.script_name.unwrap_or_default();
        let argc = self.argv.len() as i64;
        let argv: Vec<_> = self.argv.into_iter().map(Obj::from).collect();
        let auto_path: Vec<_> = self.auto_path.into_iter().map(Obj::from).collect();
        let globals = interp.globals.clone();
        let mut vars = globals.borrow_mut();
        vars.set(Rc::from("argv0"), argv0.into());
        vars.set(Rc::from("argv"), Obj::list(argv));
        vars.set(Rc::from("argc"), Obj::int(argc));
        vars.set(Rc::from("auto_path"), Obj::list(auto_path));
        vars.set(Rc::from("tern_interactive"), Obj::bool(self.interactive));
        vars.set(Rc::from("errorInfo"), Obj::empty());
        vars.set(Rc::from("errorCode"), Obj::new_string("NONE"));
        drop(vars);
        interp
    }
}

impl Default for InterpBuilder {
    fn default() -> Self {
        Self::new()
    }
}
