//! `package` and `source`.

use std::path::Path;

use tern_value::Obj;

use crate::errors::{wrong_num_args, EvalResult, ScriptError};
use crate::packages::is_valid_version;
use crate::subcmd::{dispatch, SubCommand};
use crate::Interp;

use super::{arity, empty, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("package", package), ("source", source)];

static SUBCOMMANDS: &[SubCommand] = &[
    SubCommand::new("forget", "?package package ...?", 0, None, forget),
    SubCommand::new("names", "", 0, Some(0), names),
    SubCommand::new("provide", "package ?version?", 1, Some(2), provide),
    SubCommand::new("require", "?-exact? package ?version?", 1, Some(3), require),
];

fn package(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    dispatch(interp, SUBCOMMANDS, argv)
}

fn check_version_syntax(version: &str) -> Result<(), ScriptError> {
    if is_valid_version(version) {
        Ok(())
    } else {
        Err(ScriptError::new(format!(
            "expected version number but got \"{version}\""
        )))
    }
}

fn forget(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    for name in &argv[2..] {
        interp.packages.forget(name.as_str());
    }
    empty()
}

fn names(interp: &mut Interp, _argv: &[Obj]) -> EvalResult {
    let names = interp.packages.names();
    Ok(Obj::list(names.iter().map(|name| Obj::from(&**name)).collect()))
}

fn provide(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let name = argv[2].as_str();
    let Some(version) = argv.get(3) else {
        return Ok(interp
            .packages
            .provided(name)
            .map_or_else(Obj::empty, |have| Obj::from(&**have)));
    };
    check_version_syntax(version.as_str())?;
    if let Some(have) = interp.packages.provided(name) {
        if **have != *version.as_str() {
            return Err(ScriptError::new(format!(
                "conflicting versions provided for package \"{name}\": {have}, then {version}"
            ))
            .into());
        }
    }
    tracing::debug!(package = name, version = version.as_str(), "provide package");
    interp.packages.provide(name, version.as_str());
    empty()
}

fn require(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (exact, args) = match &argv[2..] {
        [flag, rest @ ..] if flag.as_str() == "-exact" => (true, rest),
        args => (false, args),
    };
    let (name, version) = match args {
        [name] if !exact => (name, None),
        [name, version] => (name, Some(version.as_str())),
        _ => return Err(wrong_num_args("package require ?-exact? package ?version?").into()),
    };
    if let Some(version) = version {
        check_version_syntax(version)?;
    }
    let have = interp.require_package(name.as_str(), version)?;
    match version {
        Some(want) if exact && have.as_str() != want => Err(ScriptError::new(format!(
            "version conflict for package \"{name}\": have {have}, need exactly {want}"
        ))
        .into()),
        _ => Ok(have),
    }
}

fn source(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(2), "fileName")?;
    interp.source_file(Path::new(argv[1].as_str()))
}
