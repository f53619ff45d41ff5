use lispy_core::{check_arity, Value};

use crate::{register_fn, want_number};

pub fn register(env: &lispy_core::Env) {
    // Variadic left-folds over doubles. Zero-argument `+` and `*` return
    // their identities; `-` and `/` require at least one argument.

    register_fn(env, "+", |args| {
        let mut sum = 0.0;
        for arg in args {
            sum += want_number("+", arg)?;
        }
        Ok(Value::Number(sum))
    });

    register_fn(env, "*", |args| {
        let mut product = 1.0;
        for arg in args {
            product *= want_number("*", arg)?;
        }
        Ok(Value::Number(product))
    });

    register_fn(env, "-", |args| {
        check_arity!(args, "-", 1..);
        let first = want_number("-", &args[0])?;
        if args.len() == 1 {
            return Ok(Value::Number(-first));
        }
        let mut result = first;
        for arg in &args[1..] {
            result -= want_number("-", arg)?;
        }
        Ok(Value::Number(result))
    });

    register_fn(env, "/", |args| {
        check_arity!(args, "/", 1..);
        let first = want_number("/", &args[0])?;
        if args.len() == 1 {
            // reciprocal; division follows IEEE-754, so /0 is an infinity
            return Ok(Value::Number(1.0 / first));
        }
        let mut result = first;
        for arg in &args[1..] {
            result /= want_number("/", arg)?;
        }
        Ok(Value::Number(result))
    });
}
