use lispy_core::{call_via_callback, check_arity, LispyError, Value};

use crate::{register_fn, register_sfn, want_number};

fn want_list<'a>(name: &str, v: &'a Value) -> Result<&'a [Value], LispyError> {
    v.as_list().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected list, got {}", v.type_name()))
    })
}

fn want_seq<'a>(name: &str, v: &'a Value) -> Result<&'a [Value], LispyError> {
    match v {
        Value::List(items) => Ok(items),
        Value::Tuple(items) => Ok(items),
        other => Err(LispyError::invalid_argument(format!(
            "{name}: expected list or tuple, got {}",
            other.type_name()
        ))),
    }
}

pub fn register(env: &lispy_core::Env) {
    register_fn(env, "list", |args| Ok(Value::list(args.to_vec())));

    register_fn(env, "tuple", |args| Ok(Value::tuple(args.to_vec())));

    // car of the empty list is the soft default, not an error
    register_fn(env, "car", head);
    register_fn(env, "head", head);

    register_fn(env, "cdr", tail);
    register_fn(env, "tail", tail);

    register_fn(env, "cons", |args| {
        check_arity!(args, "cons", 2);
        match &args[1] {
            Value::List(items) => {
                let mut new = Vec::with_capacity(items.len() + 1);
                new.push(args[0].clone());
                new.extend(items.iter().cloned());
                Ok(Value::list(new))
            }
            Value::Nil => Ok(Value::list(vec![args[0].clone()])),
            other => Err(LispyError::invalid_argument(format!(
                "cons: expected list, got {}",
                other.type_name()
            ))),
        }
    });

    register_fn(env, "concat", |args| {
        let mut result = Vec::new();
        for arg in args {
            result.extend(want_list("concat", arg)?.iter().cloned());
        }
        Ok(Value::list(result))
    });

    register_fn(env, "length", |args| {
        check_arity!(args, "length", 1);
        match &args[0] {
            Value::List(items) => Ok(Value::Number(items.len() as f64)),
            Value::Tuple(items) => Ok(Value::Number(items.len() as f64)),
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            other => Err(LispyError::invalid_argument(format!(
                "length: expected list, tuple or string, got {}",
                other.type_name()
            ))),
        }
    });

    register_fn(env, "index", |args| {
        check_arity!(args, "index", 2);
        let items = want_seq("index", &args[0])?;
        let idx = want_number("index", &args[1])?;
        if idx < 0.0 {
            return Ok(Value::Undefined);
        }
        Ok(items.get(idx as usize).cloned().unwrap_or(Value::Undefined))
    });

    register_fn(env, "last", |args| {
        check_arity!(args, "last", 1);
        let items = want_seq("last", &args[0])?;
        Ok(items.last().cloned().unwrap_or(Value::Undefined))
    });

    register_fn(env, "slice", |args| {
        check_arity!(args, "slice", 2..=3);
        let items = want_list("slice", &args[0])?;
        let start = (want_number("slice", &args[1])?.max(0.0) as usize).min(items.len());
        let end = match args.get(2) {
            Some(v) => (want_number("slice", v)?.max(0.0) as usize).min(items.len()),
            None => items.len(),
        };
        if start >= end {
            return Ok(Value::list(vec![]));
        }
        Ok(Value::list(items[start..end].to_vec()))
    });

    // map/each/reduce observe the caller's environment so host callables
    // passed as `f` get a sensible env to run against.
    register_sfn(env, "map", |args, env| {
        check_arity!(args, "map", 2);
        let items = want_list("map", &args[1])?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(call_via_callback(&args[0], &[item.clone()], env)?);
        }
        Ok(Value::list(result))
    });

    register_sfn(env, "each", |args, env| {
        check_arity!(args, "each", 2);
        for item in want_list("each", &args[1])? {
            call_via_callback(&args[0], &[item.clone()], env)?;
        }
        Ok(Value::Nil)
    });

    register_sfn(env, "reduce", |args, env| {
        check_arity!(args, "reduce", 3);
        let mut acc = args[1].clone();
        for item in want_list("reduce", &args[2])? {
            acc = call_via_callback(&args[0], &[acc, item.clone()], env)?;
        }
        Ok(acc)
    });
}

fn head(args: &[Value]) -> Result<Value, LispyError> {
    check_arity!(args, "car", 1);
    let items = want_list("car", &args[0])?;
    Ok(items.first().cloned().unwrap_or(Value::Undefined))
}

fn tail(args: &[Value]) -> Result<Value, LispyError> {
    check_arity!(args, "cdr", 1);
    let items = want_list("cdr", &args[0])?;
    if items.is_empty() {
        return Ok(Value::list(vec![]));
    }
    Ok(Value::list(items[1..].to_vec()))
}
