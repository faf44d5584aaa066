use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{compare_versions, is_valid_version, version_satisfies, Extension};
use crate::errors::ScriptError;
use crate::print_handler::buffer_handler;
use crate::Interp;

struct Counter {
    inits: Rc<Cell<u32>>,
}

impl Extension for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn version(&self) -> &str {
        "2.1"
    }

    fn init(&self, interp: &mut Interp) -> Result<(), ScriptError> {
        self.inits.set(self.inits.get() + 1);
        interp.create_command("counter::hello", |_, _| Ok("hi".into()));
        Ok(())
    }
}

struct Broken;

impl Extension for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn init(&self, _interp: &mut Interp) -> Result<(), ScriptError> {
        Err(ScriptError::new("broken on purpose"))
    }
}

fn with_counter() -> (Interp, Rc<Cell<u32>>) {
    let inits = Rc::new(Cell::new(0));
    let interp = Interp::builder()
        .print_handler(buffer_handler())
        .extension(Counter {
            inits: Rc::clone(&inits),
        })
        .extension(Broken)
        .build();
    (interp, inits)
}

/// A scratch directory unique to this test process and test.
fn scratch_dir(test: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("tern-pkg-{}-{test}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn versions_compare_numerically() {
    assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
    assert_eq!(compare_versions("1.0", "1"), Ordering::Equal);
    assert_eq!(compare_versions("0.9.1", "0.10"), Ordering::Less);
}

#[test]
fn satisfies_needs_same_major_and_not_older() {
    assert!(version_satisfies("1.4", "1.2"));
    assert!(version_satisfies("1.2", "1.2"));
    assert!(!version_satisfies("1.1", "1.2"));
    assert!(!version_satisfies("2.0", "1.2"));
}

#[test]
fn version_syntax() {
    assert!(is_valid_version("1.2.3"));
    assert!(!is_valid_version("1..2"));
    assert!(!is_valid_version("a"));
    assert!(!is_valid_version(""));
}

#[test]
fn extension_initializes_once() {
    let (mut interp, inits) = with_counter();
    assert_eq!(interp.eval("package require counter").unwrap().as_str(), "2.1");
    assert_eq!(interp.eval("package require counter 2.0").unwrap().as_str(), "2.1");
    assert_eq!(inits.get(), 1);
    assert_eq!(interp.eval("counter::hello").unwrap().as_str(), "hi");
}

#[test]
fn version_conflict_is_reported() {
    let (mut interp, _) = with_counter();
    let err = interp.eval("package require counter 3.0").unwrap_err();
    assert_eq!(
        err.to_string(),
        "version conflict for package \"counter\": have 2.1, need 3.0"
    );
}

#[test]
fn failed_init_leaves_package_unprovided() {
    let (mut interp, _) = with_counter();
    let err = interp.eval("package require broken").unwrap_err();
    assert_eq!(err.to_string(), "broken on purpose");
    assert!(interp.packages.provided("broken").is_none());
}

#[test]
fn unknown_package() {
    let (mut interp, _) = with_counter();
    let err = interp.eval("package require nosuch").unwrap_err();
    assert_eq!(err.to_string(), "can't find package nosuch");
}

#[test]
fn package_file_is_found_on_auto_path() {
    let dir = scratch_dir("auto");
    std::fs::write(
        dir.join("shapes.tern"),
        "proc area {w h} { expr {$w * $h} }\npackage provide shapes 0.3\n",
    )
    .unwrap();
    let mut interp = Interp::builder()
        .print_handler(buffer_handler())
        .auto_path([dir.to_string_lossy().to_string()])
        .build();
    assert_eq!(interp.eval("package require shapes").unwrap().as_str(), "0.3");
    assert_eq!(interp.eval("area 3 4").unwrap().as_str(), "12");
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn package_file_without_provide_gets_default_version() {
    let dir = scratch_dir("noprovide");
    std::fs::write(dir.join("plain.tern"), "set ::plain_loaded 1\n").unwrap();
    let mut interp = Interp::builder()
        .print_handler(buffer_handler())
        .auto_path([dir.to_string_lossy().to_string()])
        .build();
    assert_eq!(interp.eval("package require plain").unwrap().as_str(), "1.0");
    assert_eq!(interp.get_var("plain_loaded").unwrap().as_str(), "1");
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn provide_forget_and_names() {
    let (mut interp, _) = with_counter();
    interp.eval("package provide local 1.5").unwrap();
    assert_eq!(interp.eval("package provide local").unwrap().as_str(), "1.5");
    let names = interp.eval("package names").unwrap();
    let names: Vec<String> = names
        .get_list()
        .unwrap()
        .iter()
        .map(|n| n.as_str().to_string())
        .collect();
    assert!(names.contains(&"local".to_string()));
    assert!(names.contains(&"counter".to_string()));
    interp.eval("package forget local").unwrap();
    assert_eq!(interp.eval("package provide local").unwrap().as_str(), "");
}
