//! Package registry and static extensions.
//!
//! A package is a name with a version. It becomes *provided* when a script
//! runs `package provide` or when an [`Extension`] finishes initializing.
//! `package require` loads a package the first time it is asked for and is
//! a cheap lookup afterwards:
//!
//! 1. an already provided package is returned as is;
//! 2. a registered extension is initialized;
//! 3. each directory of `::auto_path` is searched for `<name>.tern`, which
//!    is sourced in the global frame.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tern_value::Obj;

use crate::errors::{EvalResult, Flow, ScriptError};
use crate::Interp;

/// Version given to a package file that never calls `package provide`.
const DEFAULT_VERSION: &str = "1.0";

/// A package compiled into the host, initialized on first `require`.
///
/// ```text
/// struct Greeter;
///
/// impl Extension for Greeter {
///     fn name(&self) -> &str { "greeter" }
///     fn version(&self) -> &str { "1.2" }
///     fn init(&self, interp: &mut Interp) -> Result<(), ScriptError> {
///         interp.create_command("greet", |_, argv| Ok(argv[1].clone()));
///         Ok(())
///     }
/// }
/// ```
pub trait Extension {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Register the extension's commands. The package is provided with
    /// [`Extension::version`] afterwards unless `init` provided it itself.
    fn init(&self, interp: &mut Interp) -> Result<(), ScriptError>;
}

#[derive(Default)]
pub struct PackageRegistry {
    provided: IndexMap<Rc<str>, Rc<str>, FxBuildHasher>,
    extensions: IndexMap<Rc<str>, Rc<dyn Extension>, FxBuildHasher>,
    /// Packages whose loading is in progress, to catch require cycles.
    loading: FxHashSet<Rc<str>>,
}

impl PackageRegistry {
    pub fn provide(&mut self, name: &str, version: &str) {
        tracing::debug!(package = name, version, "provide");
        self.provided.insert(Rc::from(name), Rc::from(version));
    }

    pub fn provided(&self, name: &str) -> Option<&Rc<str>> {
        self.provided.get(name)
    }

    /// Forget that `name` was provided; the next `require` loads it again.
    pub fn forget(&mut self, name: &str) -> bool {
        self.provided.shift_remove(name).is_some()
    }

    /// Names of provided packages and of extensions that could be loaded.
    pub fn names(&self) -> Vec<Rc<str>> {
        let mut names: Vec<_> = self.provided.keys().cloned().collect();
        for name in self.extensions.keys() {
            if !self.provided.contains_key(name) {
                names.push(Rc::clone(name));
            }
        }
        names
    }

    pub fn register_extension(&mut self, extension: Rc<dyn Extension>) {
        let name: Rc<str> = Rc::from(extension.name());
        tracing::debug!(package = %name, "register extension");
        self.extensions.insert(name, extension);
    }

    fn extension(&self, name: &str) -> Option<Rc<dyn Extension>> {
        self.extensions.get(name).cloned()
    }
}

impl std::fmt::Debug for PackageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageRegistry")
            .field("provided", &self.provided)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Compare dotted versions numerically, component by component. A missing
/// component counts as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> { v.split('.').map(|c| c.parse().unwrap_or(0)).collect() };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Whether `have` satisfies a request for `want`: same major version and
/// at least as new.
pub fn version_satisfies(have: &str, want: &str) -> bool {
    let major = |v: &str| v.split('.').next().unwrap_or("").to_string();
    major(have) == major(want) && compare_versions(have, want) != Ordering::Less
}

/// Whether `text` is a dotted sequence of decimal integers.
pub fn is_valid_version(text: &str) -> bool {
    !text.is_empty()
        && text
            .split('.')
            .all(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()))
}

impl Interp {
    /// Load `name` if needed and return its version.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn require_package(&mut self, name: &str, version: Option<&str>) -> EvalResult {
        if let Some(have) = self.packages.provided(name).cloned() {
            return check_version(name, &have, version);
        }
        let key: Rc<str> = Rc::from(name);
        if !self.packages.loading.insert(Rc::clone(&key)) {
            return Err(ScriptError::new(format!(
                "circular package dependency: attempt to require \"{name}\" while loading it"
            ))
            .into());
        }
        let loaded = self.load_package(name);
        self.packages.loading.remove(&key);
        loaded?;
        match self.packages.provided(name).cloned() {
            Some(have) => check_version(name, &have, version),
            None => Err(cant_find(name, version).into()),
        }
    }

    /// Run whatever provides `name`; does nothing if nothing can.
    fn load_package(&mut self, name: &str) -> Result<(), Flow> {
        if let Some(extension) = self.packages.extension(name) {
            tracing::debug!(package = name, "init extension");
            extension.init(self)?;
            if self.packages.provided(name).is_none() {
                self.packages.provide(name, extension.version());
            }
            return Ok(());
        }
        let Some(path) = self.find_package_file(name) else {
            return Ok(());
        };
        tracing::debug!(package = name, path = %path.display(), "load package file");
        self.with_level(0, |interp| interp.source_file(&path))?;
        if self.packages.provided(name).is_none() {
            self.packages.provide(name, DEFAULT_VERSION);
        }
        Ok(())
    }

    fn find_package_file(&self, name: &str) -> Option<PathBuf> {
        let dirs = self.get_var("::auto_path").ok()?.get_list().ok()?;
        let file = format!("{name}.tern");
        dirs.iter()
            .map(|dir| PathBuf::from(dir.as_str()).join(&file))
            .find(|path| path.is_file())
    }
}

fn check_version(name: &str, have: &str, want: Option<&str>) -> EvalResult {
    match want {
        Some(want) if !version_satisfies(have, want) => Err(ScriptError::new(format!(
            "version conflict for package \"{name}\": have {have}, need {want}"
        ))
        .into()),
        _ => Ok(Obj::from(have)),
    }
}

fn cant_find(name: &str, version: Option<&str>) -> ScriptError {
    match version {
        Some(version) => ScriptError::new(format!("can't find package {name} {version}")),
        None => ScriptError::new(format!("can't find package {name}")),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
