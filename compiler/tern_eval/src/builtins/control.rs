//! Conditionals, loops and non-local exits.
//!
//! Loops absorb `break` and `continue`; every other outcome of a body
//! leaves the loop unchanged.

use std::rc::Rc;

use tern_parse::{parse_subst, Subst};
use tern_value::{Dict, Obj, ObjType};

use crate::commands::Proc;
use crate::errors::{wrong_num_args, Code, EvalResult, Flow, ScriptError};
use crate::glob::glob_match;
use crate::interp::apply_return_code;
use crate::interp::frames::looks_like_level;
use crate::signal::signal_name;
use crate::Interp;

use super::{arity, concat, empty, Builtin};

pub(super) const COMMANDS: &[(&str, Builtin)] = &[
    ("if", if_cmd),
    ("while", while_cmd),
    ("for", for_cmd),
    ("foreach", foreach),
    ("break", break_cmd),
    ("continue", continue_cmd),
    ("return", return_cmd),
    ("error", error),
    ("catch", catch),
    ("exit", exit),
    ("switch", switch),
    ("uplevel", uplevel),
    ("eval", eval),
    ("subst", subst),
    ("apply", apply),
    ("expr", expr),
];

/// What a loop does after running its body once.
pub(super) enum Step {
    Next,
    Stop,
}

/// Absorb loop signals from one run of a loop body.
pub(super) fn loop_step(result: EvalResult) -> Result<Step, Flow> {
    match result {
        Ok(_) | Err(Flow::Continue) => Ok(Step::Next),
        Err(Flow::Break) => Ok(Step::Stop),
        Err(flow) => Err(flow),
    }
}

fn if_cmd(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let word = |i: usize| argv.get(i).map(Obj::as_str);
    let mut i = 1;
    loop {
        let Some(cond) = argv.get(i) else {
            return Err(ScriptError::new(format!(
                "wrong # args: no expression after \"{}\" argument",
                argv[i - 1]
            ))
            .into());
        };
        i += 1;
        if word(i) == Some("then") {
            i += 1;
        }
        let Some(body) = argv.get(i) else {
            return Err(ScriptError::new(format!(
                "wrong # args: no script following \"{cond}\" argument"
            ))
            .into());
        };
        i += 1;
        if interp.eval_condition(cond)? {
            return interp.eval_obj(body);
        }
        match word(i) {
            None => return empty(),
            Some("elseif") => i += 1,
            Some("else") => {
                let Some(body) = argv.get(i + 1) else {
                    return Err(ScriptError::new(
                        "wrong # args: no script following \"else\" argument",
                    )
                    .into());
                };
                if i + 2 != argv.len() {
                    return Err(wrong_num_args(
                        "if cond ?then? body ?elseif cond ?then? body ...? ?else? ?body?",
                    )
                    .into());
                }
                return interp.eval_obj(body);
            }
            Some(_) if i + 1 == argv.len() => return interp.eval_obj(&argv[i]),
            Some(_) => {
                return Err(wrong_num_args(
                    "if cond ?then? body ?elseif cond ?then? body ...? ?else? ?body?",
                )
                .into())
            }
        }
    }
}

fn while_cmd(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 3, Some(3), "test body")?;
    while interp.eval_condition(&argv[1])? {
        if let Step::Stop = loop_step(interp.eval_obj(&argv[2]))? {
            break;
        }
    }
    empty()
}

fn for_cmd(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 5, Some(5), "start test next body")?;
    interp.eval_obj(&argv[1])?;
    while interp.eval_condition(&argv[2])? {
        if let Step::Stop = loop_step(interp.eval_obj(&argv[4]))? {
            break;
        }
        if let Step::Stop = loop_step(interp.eval_obj(&argv[3]))? {
            break;
        }
    }
    empty()
}

fn foreach(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    if argv.len() < 4 || argv.len() % 2 != 0 {
        return Err(wrong_num_args("foreach varList list ?varList list ...? body").into());
    }
    let body = &argv[argv.len() - 1];
    let mut groups = Vec::with_capacity((argv.len() - 2) / 2);
    let mut iterations = 0;
    for pair in argv[1..argv.len() - 1].chunks_exact(2) {
        let vars = pair[0].get_list()?;
        if vars.is_empty() {
            return Err(ScriptError::new("foreach varlist is empty").into());
        }
        let values = pair[1].get_list()?;
        iterations = iterations.max(values.len().div_ceil(vars.len()));
        groups.push((vars, values));
    }
    for iteration in 0..iterations {
        for (vars, values) in &groups {
            for (j, var) in vars.iter().enumerate() {
                let value = values
                    .get(iteration * vars.len() + j)
                    .cloned()
                    .unwrap_or_else(Obj::empty);
                interp.set_var(var.as_str(), value)?;
            }
        }
        if let Step::Stop = loop_step(interp.eval_obj(body))? {
            break;
        }
    }
    empty()
}

fn break_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 1, Some(1), "")?;
    Err(Flow::Break)
}

fn continue_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 1, Some(1), "")?;
    Err(Flow::Continue)
}

fn parse_code(text: &Obj) -> Result<Code, ScriptError> {
    if let Some(code) = Code::parse(text.as_str()) {
        return Ok(code);
    }
    Err(ScriptError::new(format!(
        "bad completion code \"{text}\": must be ok, error, return, break, continue, signal, or exit"
    )))
}

fn return_cmd(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    let args = &argv[1..];
    let (options, value) = if args.len() % 2 == 1 {
        (&args[..args.len() - 1], args[args.len() - 1].clone())
    } else {
        (args, Obj::empty())
    };
    let mut code = Code::Ok;
    let mut level = 1_u32;
    let mut error_code = None;
    for pair in options.chunks_exact(2) {
        match pair[0].as_str() {
            "-code" => code = parse_code(&pair[1])?,
            "-level" => {
                level = u32::try_from(pair[1].get_int()?).map_err(|_| {
                    ScriptError::new(format!(
                        "bad -level value: expected non-negative integer but got \"{}\"",
                        pair[1]
                    ))
                })?;
            }
            "-errorcode" => error_code = Some(pair[1].clone()),
            "-errorinfo" => {}
            other => {
                return Err(ScriptError::new(format!(
                    "bad option \"{other}\": must be -code, -errorcode, -errorinfo, or -level"
                ))
                .into())
            }
        }
    }
    if level == 0 {
        return apply_return_code(value, code, error_code);
    }
    Err(Flow::Return {
        value,
        code,
        level,
        error_code,
    })
}

fn error(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, Some(4), "message ?errorInfo? ?errorCode?")?;
    let mut err = ScriptError::new(argv[1].clone());
    if let Some(info) = argv.get(2).filter(|info| !info.is_empty_string()) {
        err.info = Some(info.clone());
    }
    if let Some(code) = argv.get(3) {
        err.error_code = Some(code.clone());
    }
    Err(err.into())
}

/// Key/value pairs for `catch`'s options variable.
fn catch_options(code: Code, level: u32, err: Option<&ScriptError>) -> Obj {
    let mut options = Dict::new();
    options.insert(Obj::from("-code"), Obj::int(code.as_i64()));
    options.insert(Obj::from("-level"), Obj::int(i64::from(level)));
    if let Some(err) = err {
        options.insert(Obj::from("-errorcode"), err.error_code_obj());
        options.insert(Obj::from("-errorinfo"), Obj::new_string(err.error_info()));
    }
    Obj::dict(options)
}

fn catch(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const USAGE: &str = "?-signal? ?-exit? ?--? script ?resultVarName? ?optionVarName?";
    let mut catch_signal = false;
    let mut catch_exit = false;
    let mut i = 1;
    while let Some(option) = argv.get(i) {
        match option.as_str() {
            "-signal" => catch_signal = true,
            "-exit" => catch_exit = true,
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
        i += 1;
    }
    let rest = argv.get(i..).unwrap_or_default();
    if rest.is_empty() || rest.len() > 3 {
        return Err(wrong_num_args(format!("catch {USAGE}")).into());
    }

    let (code, message, options) = match interp.eval_obj(&rest[0]) {
        Ok(value) => (Code::Ok, value, catch_options(Code::Ok, 0, None)),
        Err(Flow::Error(err)) => {
            interp.note_error(&err);
            let options = catch_options(Code::Error, 0, Some(&err));
            (Code::Error, err.message.clone(), options)
        }
        Err(Flow::Return {
            value, code, level, ..
        }) => (Code::Return, value, catch_options(code, level, None)),
        Err(Flow::Break) => (Code::Break, Obj::empty(), catch_options(Code::Break, 0, None)),
        Err(Flow::Continue) => (
            Code::Continue,
            Obj::empty(),
            catch_options(Code::Continue, 0, None),
        ),
        Err(Flow::Signal(signal)) if catch_signal => (
            Code::Signal,
            Obj::new_string(signal_name(signal)),
            catch_options(Code::Signal, 0, None),
        ),
        Err(Flow::Exit(status)) if catch_exit => (
            Code::Exit,
            Obj::int(i64::from(status)),
            catch_options(Code::Exit, 0, None),
        ),
        Err(flow) => return Err(flow),
    };
    if let Some(var) = rest.get(1) {
        interp.set_var(var.as_str(), message)?;
    }
    if let Some(var) = rest.get(2) {
        interp.set_var(var.as_str(), options)?;
    }
    Ok(Obj::int(code.as_i64()))
}

fn exit(_interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 1, Some(2), "?exitCode?")?;
    let status = match argv.get(1) {
        Some(status) => status.get_int()? as i32,
        None => 0,
    };
    Err(Flow::Exit(status))
}

fn switch(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const USAGE: &str = "switch ?options? string pattern body ?pattern body ...?";
    let mut glob = false;
    let mut i = 1;
    while let Some(option) = argv.get(i) {
        let text = option.as_str();
        if !text.starts_with('-') {
            break;
        }
        i += 1;
        match text {
            "-exact" => glob = false,
            "-glob" => glob = true,
            "--" => break,
            other => {
                return Err(ScriptError::new(format!(
                    "bad option \"{other}\": must be -exact, -glob, or --"
                ))
                .into())
            }
        }
    }
    let Some(subject) = argv.get(i) else {
        return Err(wrong_num_args(USAGE).into());
    };
    let rest = &argv[i + 1..];
    let braced;
    let cases: &[Obj] = match rest {
        [] => return Err(wrong_num_args(USAGE).into()),
        [single] => {
            braced = single.get_list()?;
            &braced
        }
        _ => rest,
    };
    if cases.len() % 2 != 0 {
        return Err(ScriptError::new("extra switch pattern with no body").into());
    }
    let subject = subject.as_str();
    let last = cases.len() / 2 - 1;
    let matched = cases.chunks_exact(2).enumerate().position(|(n, case)| {
        let pattern = case[0].as_str();
        (n == last && pattern == "default")
            || if glob {
                glob_match(pattern, subject, false)
            } else {
                pattern == subject
            }
    });
    let Some(matched) = matched else {
        return empty();
    };
    // A body of "-" falls through to the next real body.
    let body = cases[matched * 2..]
        .chunks_exact(2)
        .map(|case| &case[1])
        .find(|body| body.as_str() != "-");
    match body {
        Some(body) => interp.eval_obj(body),
        None => Err(ScriptError::new(format!(
            "no body specified for pattern \"{}\"",
            cases[matched * 2]
        ))
        .into()),
    }
}

fn uplevel(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "?level? command ?arg ...?")?;
    let (level, words) = if argv.len() > 2 && looks_like_level(argv[1].as_str()) {
        (argv[1].as_str(), &argv[2..])
    } else {
        ("1", &argv[1..])
    };
    let frame = interp.frames.resolve_level(level)?;
    let script = concat(words);
    interp.with_level(frame, |interp| interp.eval_obj(&script))
}

fn eval(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "arg ?arg ...?")?;
    let script = concat(&argv[1..]);
    interp.eval_obj(&script)
}

fn subst(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    const USAGE: &str = "?-nobackslashes? ?-nocommands? ?-novariables? string";
    arity(argv, 2, None, USAGE)?;
    let mut flags = Subst::all();
    for option in &argv[1..argv.len() - 1] {
        match option.as_str() {
            "-nobackslashes" => flags.remove(Subst::BACKSLASHES),
            "-nocommands" => flags.remove(Subst::COMMANDS),
            "-novariables" => flags.remove(Subst::VARIABLES),
            other => {
                return Err(ScriptError::new(format!(
                    "bad option \"{other}\": must be -nobackslashes, -nocommands, or -novariables"
                ))
                .into())
            }
        }
    }
    let parts = parse_subst(argv[argv.len() - 1].as_str(), flags)?;
    interp.substitute_parts(&parts)
}

/// Native rep kind of a lambda used with `apply`.
static LAMBDA_TYPE: ObjType = ObjType::cache("lambda");

fn lambda_of(lambda: &Obj) -> Result<Rc<Proc>, ScriptError> {
    if let Some(proc) = lambda.ext_as::<Proc>(&LAMBDA_TYPE) {
        return Ok(proc);
    }
    let fields = lambda.get_list()?;
    let (args, body, namespace) = match fields.as_slice() {
        [args, body] => (args, body, ""),
        [args, body, namespace] => (args, body, namespace.as_str().trim_start_matches(':')),
        _ => {
            return Err(ScriptError::new(format!(
                "can't interpret \"{lambda}\" as a lambda expression"
            )))
        }
    };
    let proc = Rc::new(Proc::new(args.clone(), body.clone(), Rc::from(namespace))?);
    lambda.set_ext_rep(&LAMBDA_TYPE, proc.clone());
    Ok(proc)
}

fn apply(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "lambdaExpr ?arg ...?")?;
    let proc = lambda_of(&argv[1])?;
    interp.call_proc(&proc, &argv[1..])
}

fn expr(interp: &mut Interp, argv: &[Obj]) -> EvalResult {
    arity(argv, 2, None, "arg ?arg ...?")?;
    let expression = concat(&argv[1..]);
    interp.eval_expr(&expression)
}
