//! `puts`.

use tern_value::Obj;

use crate::errors::{wrong_num_args, EvalResult, ScriptError};
use crate::print_handler::Channel;
use crate::Interp;

use super::{empty, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[("puts", puts)];

fn puts(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let (newline, args) = match &argv[1..] {
        [flag, rest @ ..] if flag.as_str() == "-nonewline" && !rest.is_empty() => (false, rest),
        args => (true, args),
    };
    let (channel, text) = match args {
        [text] => (Channel::Stdout, text),
        [channel, text] => {
            let channel = Channel::parse(channel.as_str()).ok_or_else(|| {
                ScriptError::new(format!("can not find channel named \"{channel}\""))
            })?;
            (channel, text)
        }
        _ => return Err(wrong_num_args("puts ?-nonewline? ?channelId? string").into()),
    };
    if newline {
        interp.print_handler().println(channel, text.as_str());
    } else {
        interp.write(channel, text.as_str());
    }
    empty()
}
