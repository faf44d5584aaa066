//! `after`, `update` and `vwait`.

use std::time::Duration;

use tern_value::Obj;

use crate::errors::{EvalResult, ScriptError};
use crate::events::{event_name, parse_event_name, EventFlags};
use crate::Interp;

use super::{arity, concat, empty, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[
    ("after", after),
    ("update", update),
    ("vwait", vwait),
];

fn after(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "option ?arg ...?")?;
    match argv[1].as_str() {
        "cancel" => after_cancel(interp, argv),
        "idle" => {
            arity(argv, 3, None, "idle script ?script ...?")?;
            let id = interp.events.schedule_idle(concat(&argv[2..]));
            Ok(Obj::new_string(event_name(id)))
        }
        "info" => after_info(interp, argv),
        _ => {
            let ms = argv[1].get_int().map_err(|_| {
                ScriptError::new(format!(
                    "bad argument \"{}\": must be cancel, idle, info, or an integer",
                    argv[1]
                ))
            })?;
            let delay = Duration::from_millis(u64::try_from(ms).unwrap_or(0));
            if argv.len() == 2 {
                std::thread::sleep(delay);
                return empty();
            }
            let id = interp.events.schedule(delay, concat(&argv[2..]));
            Ok(Obj::new_string(event_name(id)))
        }
    }
}

fn after_cancel(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 3, None, "cancel id|command")?;
    if argv.len() == 3 {
        if let Some(id) = parse_event_name(argv[2].as_str()) {
            interp.events.cancel(id);
            return empty();
        }
    }
    interp.events.cancel_script(concat(&argv[2..]).as_str());
    empty()
}

fn after_info(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(3), "info ?id?")?;
    let Some(name) = argv.get(2) else {
        let ids = interp.events.ids();
        return Ok(Obj::list(
            ids.into_iter()
                .map(|id| Obj::new_string(event_name(id)))
                .collect(),
        ));
    };
    let info = parse_event_name(name.as_str()).and_then(|id| interp.events.info(id));
    match info {
        Some((script, kind)) => Ok(Obj::list(vec![script, Obj::from(kind.name())])),
        None => Err(ScriptError::new(format!(
            "event \"{name}\" doesn't exist"
        ))
        .into()),
    }
}

fn update(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 1, Some(2), "?idletasks?")?;
    let classes = match argv.get(1).map(Obj::as_str) {
        None => EventFlags::ALL,
        Some("idletasks") => EventFlags::IDLE,
        Some(other) => {
            return Err(ScriptError::new(format!(
                "bad option \"{other}\": must be idletasks"
            ))
            .into())
        }
    };
    while interp.process_events(classes | EventFlags::DONT_WAIT)? > 0 {}
    empty()
}

fn vwait(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(2), "name")?;
    interp.wait_for_var(argv[1].as_str())?;
    empty()
}
