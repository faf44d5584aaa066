//! Ensemble-style subcommand dispatch.
//!
//! An ensemble is a command such as `string` or `dict` whose first argument
//! picks one handler out of a fixed table. A given word resolves to:
//!
//! 1. the entry with exactly that name, if any;
//! 2. otherwise the single entry it is a prefix of;
//! 3. otherwise an ambiguous (several prefixes) or bad (none) subcommand
//!    error listing the valid names.
//!
//! The argument count is checked only after a match, so a miscounted call
//! reports `wrong # args` for the matched subcommand rather than an unknown
//! subcommand.
//!
//! The resolved index is cached on the subcommand word, keyed by the table's
//! address, so a word evaluated in a loop is matched once.

use std::rc::Rc;

use tern_value::{Obj, ObjType};

use crate::errors::{
    ambiguous_subcommand, bad_subcommand, wrong_num_args, wrong_num_args_for, EvalResult,
    ScriptError,
};
use crate::Interp;

/// Handler of one subcommand. Receives the full argument vector: `argv[0]`
/// is the ensemble name and `argv[1]` the subcommand word.
pub type SubCmdFn = fn(&mut Interp, &[Obj]) -> EvalResult;

pub struct SubCommand {
    pub name: &'static str,
    /// Synopsis of the arguments after the subcommand name.
    pub args: &'static str,
    pub min_args: usize,
    /// `None` for no upper bound.
    pub max_args: Option<usize>,
    pub handler: SubCmdFn,
}

impl SubCommand {
    pub const fn new(
        name: &'static str,
        args: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        handler: SubCmdFn,
    ) -> Self {
        SubCommand {
            name,
            args,
            min_args,
            max_args,
            handler,
        }
    }
}

/// Native rep kind of a resolved subcommand word.
pub static SUBCMD_TYPE: ObjType = ObjType::cache("subcommand");

struct CachedSubCmd {
    table: usize,
    index: usize,
}

fn table_key(table: &[SubCommand]) -> usize {
    table.as_ptr() as usize
}

/// Find the entry `given` names in `table`.
pub fn resolve<'t>(
    table: &'t [SubCommand],
    what: &'static str,
    given: &Obj,
) -> Result<&'t SubCommand, ScriptError> {
    let key = table_key(table);
    if let Some(cached) = given.ext_as::<CachedSubCmd>(&SUBCMD_TYPE) {
        if cached.table == key {
            if let Some(entry) = table.get(cached.index) {
                return Ok(entry);
            }
        }
    }
    let index = find(table, what, given.as_str())?;
    given.set_ext_rep(&SUBCMD_TYPE, Rc::new(CachedSubCmd { table: key, index }));
    Ok(&table[index])
}

fn find(table: &[SubCommand], what: &'static str, given: &str) -> Result<usize, ScriptError> {
    if let Some(index) = table.iter().position(|e| e.name == given) {
        return Ok(index);
    }
    let mut matches = table
        .iter()
        .enumerate()
        .filter(|(_, e)| !given.is_empty() && e.name.starts_with(given));
    let names = || table.iter().map(|e| e.name).collect::<Vec<_>>();
    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Ok(index),
        (Some(_), Some(_)) => Err(ambiguous_subcommand(what, given, &names())),
        (None, _) => Err(bad_subcommand(what, given, &names())),
    }
}

/// Resolve `argv[1]`, check the argument count and run the handler.
pub fn dispatch(interp: &mut Interp, table: &[SubCommand], argv: &[Obj]) -> EvalResult {
    let Some(given) = argv.get(1) else {
        return Err(wrong_num_args_for(argv, "subcommand ?arg ...?").into());
    };
    let entry = resolve(table, "subcommand", given)?;
    let count = argv.len() - 2;
    if count < entry.min_args || entry.max_args.is_some_and(|max| count > max) {
        let mut usage = format!("{} {}", argv[0], entry.name);
        if !entry.args.is_empty() {
            usage.push(' ');
            usage.push_str(entry.args);
        }
        return Err(wrong_num_args(usage).into());
    }
    (entry.handler)(interp, argv)
}

/// Match a command option (such as `-exact`) against a fixed list with the
/// same exact-then-unique-prefix rule.
pub fn option_index(options: &[&str], given: &Obj) -> Result<usize, ScriptError> {
    let given = given.as_str();
    if let Some(index) = options.iter().position(|o| *o == given) {
        return Ok(index);
    }
    let mut matches = options
        .iter()
        .enumerate()
        .filter(|(_, o)| given.len() > 1 && o.starts_with(given));
    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Ok(index),
        (Some(_), Some(_)) => Err(ambiguous_subcommand("option", given, options)),
        (None, _) => Err(bad_subcommand("option", given, options)),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
