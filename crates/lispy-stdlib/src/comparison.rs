use lispy_core::{check_arity, LispyError, Value};

use crate::{register_fn, want_number};

fn num_cmp(
    env: &lispy_core::Env,
    name: &'static str,
    f: impl Fn(f64, f64) -> bool + 'static,
) {
    register_fn(env, name, move |args| -> Result<Value, LispyError> {
        check_arity!(args, name, 2);
        let a = want_number(name, &args[0])?;
        let b = want_number(name, &args[1])?;
        Ok(Value::Bool(f(a, b)))
    });
}

pub fn register(env: &lispy_core::Env) {
    num_cmp(env, "<", |a, b| a < b);
    num_cmp(env, "<=", |a, b| a <= b);
    num_cmp(env, ">", |a, b| a > b);
    num_cmp(env, ">=", |a, b| a >= b);

    // `=` compares by value; two symbols are equal iff their names match.
    register_fn(env, "=", |args| {
        check_arity!(args, "=", 2);
        Ok(Value::Bool(args[0] == args[1]))
    });

    register_fn(env, "!=", |args| {
        check_arity!(args, "!=", 2);
        Ok(Value::Bool(args[0] != args[1]))
    });

    // `===` is the strict identity-style comparison: value comparison for
    // scalars and strings, pointer identity for heap values.
    register_fn(env, "===", |args| {
        check_arity!(args, "===", 2);
        Ok(Value::Bool(args[0].identical(&args[1])))
    });

    register_fn(env, "!==", |args| {
        check_arity!(args, "!==", 2);
        Ok(Value::Bool(!args[0].identical(&args[1])))
    });
}
