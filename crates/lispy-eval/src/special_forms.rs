use std::cell::Cell;

use lispy_core::{
    error_to_value, intern, resolve, Env, Lambda, LispyError, Macro, Params, Spur, Value,
};

use crate::eval::{self, Trampoline};

/// Pre-interned `Spur` handles for the special form names.
///
/// Special form dispatch is the hottest path in the evaluator: every list
/// expression checks whether its head is a special form. Caching the
/// interned key for each name turns the check into integer comparisons.
struct SpecialFormSpurs {
    begin: Spur,
    define: Spur,
    defined_q: Spur,
    if_: Spur,
    lambda: Spur,
    macro_: Spur,
    quote: Spur,
    set_bang: Spur,
    try_: Spur,
}

impl SpecialFormSpurs {
    fn init() -> Self {
        Self {
            begin: intern("begin"),
            define: intern("define"),
            defined_q: intern("defined?"),
            if_: intern("if"),
            lambda: intern("lambda"),
            macro_: intern("macro"),
            quote: intern("quote"),
            set_bang: intern("set!"),
            try_: intern("try"),
        }
    }
}

thread_local! {
    static SF: Cell<Option<&'static SpecialFormSpurs>> = const { Cell::new(None) };
}

fn special_forms() -> &'static SpecialFormSpurs {
    SF.with(|cell| match cell.get() {
        Some(sf) => sf,
        None => {
            let sf: &'static SpecialFormSpurs = Box::leak(Box::new(SpecialFormSpurs::init()));
            cell.set(Some(sf));
            sf
        }
    })
}

/// Canonical list of special form names recognized by the evaluator.
/// Used by the REPL for `,help` and by anything else that needs to
/// enumerate them.
pub const SPECIAL_FORM_NAMES: &[&str] = &[
    "begin", "define", "defined?", "if", "lambda", "macro", "quote", "set!", "try",
];

/// Evaluate a special form. Returns Some(result) if the head names a
/// special form, None for ordinary applications.
pub fn try_eval_special(
    head_spur: Spur,
    args: &[Value],
    env: &Env,
) -> Option<Result<Trampoline, LispyError>> {
    let sf = special_forms();

    if head_spur == sf.if_ {
        Some(eval_if(args, env))
    } else if head_spur == sf.define {
        Some(eval_define(args, env))
    } else if head_spur == sf.begin {
        Some(eval_begin(args, env))
    } else if head_spur == sf.lambda {
        Some(eval_lambda(args, env))
    } else if head_spur == sf.macro_ {
        Some(eval_macro(args, env))
    } else if head_spur == sf.quote {
        Some(eval_quote(args))
    } else if head_spur == sf.set_bang {
        Some(eval_set(args, env))
    } else if head_spur == sf.defined_q {
        Some(eval_defined(args, env))
    } else if head_spur == sf.try_ {
        Some(eval_try(args, env))
    } else {
        None
    }
}

fn eval_quote(args: &[Value]) -> Result<Trampoline, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity("quote", "1", args.len()));
    }
    Ok(Trampoline::Value(args[0].clone()))
}

fn eval_if(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(LispyError::arity("if", "2 or 3", args.len()));
    }
    let cond = eval::eval_value(&args[0], env)?;
    if cond.is_truthy() {
        Ok(Trampoline::Eval(args[1].clone(), env.clone()))
    } else if args.len() == 3 {
        Ok(Trampoline::Eval(args[2].clone(), env.clone()))
    } else {
        Ok(Trampoline::Value(Value::Nil))
    }
}

/// `(define name V)`: evaluate V, bind it in the *current* environment
/// and return it. The name may be a symbol or a string.
fn eval_define(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity("define", "2", args.len()));
    }
    let name = args[0].as_name_spur().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "define: name must be a symbol or string, got {}",
            args[0].type_name()
        ))
    })?;
    let val = eval::eval_value(&args[1], env)?;
    env.define(name, val.clone());
    Ok(Trampoline::Value(val))
}

/// `(defined? name)`: true iff the (unevaluated) name is visible from the
/// current environment.
fn eval_defined(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity("defined?", "1", args.len()));
    }
    let name = args[0].as_name_spur().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "defined?: name must be a symbol or string, got {}",
            args[0].type_name()
        ))
    })?;
    Ok(Trampoline::Value(Value::Bool(env.present(name))))
}

/// `(set! name V)`: assign to the nearest enclosing binding; never
/// creates one.
fn eval_set(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity("set!", "2", args.len()));
    }
    let name = args[0].as_name_spur().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "set!: name must be a symbol or string, got {}",
            args[0].type_name()
        ))
    })?;
    let val = eval::eval_value(&args[1], env)?;
    if !env.set_existing(name, val.clone()) {
        return Err(LispyError::key_not_found(resolve(name)));
    }
    Ok(Trampoline::Value(val))
}

fn eval_lambda(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity("lambda", "2", args.len()));
    }
    let params = Params::parse(&args[0])?;
    Ok(Trampoline::Value(Value::lambda(Lambda {
        params,
        body: args[1].clone(),
        env: env.clone(),
    })))
}

fn eval_macro(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity("macro", "2", args.len()));
    }
    let params = Params::parse(&args[0])?;
    Ok(Trampoline::Value(Value::macro_val(Macro {
        params,
        body: args[1].clone(),
        env: env.clone(),
    })))
}

fn eval_begin(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.is_empty() {
        return Ok(Trampoline::Value(Value::Nil));
    }
    for expr in &args[..args.len() - 1] {
        eval::eval_value(expr, env)?;
    }
    Ok(Trampoline::Eval(args[args.len() - 1].clone(), env.clone()))
}

/// `(try E H)`: evaluate E; on error, H must reduce to a procedure of one
/// argument, applied to the error value. A lambda handler runs in tail
/// position.
fn eval_try(args: &[Value], env: &Env) -> Result<Trampoline, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity("try", "2", args.len()));
    }
    match eval::eval_value(&args[0], env) {
        Ok(val) => Ok(Trampoline::Value(val)),
        Err(err) => {
            let err_val = error_to_value(&err);
            let handler = eval::eval_value(&args[1], env)?;
            match &handler {
                Value::Lambda(lambda) => {
                    let new_env = lispy_core::bind_params(
                        &lambda.params,
                        &[err_val],
                        std::rc::Rc::new(lambda.env.clone()),
                    );
                    Ok(Trampoline::Eval(lambda.body.clone(), new_env))
                }
                Value::NativeFn(native) => {
                    Ok(Trampoline::Value((native.func)(&[err_val])?))
                }
                Value::SpecialFn(special) => {
                    Ok(Trampoline::Value((special.func)(&[err_val], env)?))
                }
                other => Err(LispyError::invalid_argument(format!(
                    "try: handler must be callable, got {}",
                    other.type_name()
                ))),
            }
        }
    }
}
