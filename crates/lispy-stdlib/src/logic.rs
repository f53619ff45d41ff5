use lispy_core::{check_arity, Value};

use crate::register_fn;

pub fn register(env: &lispy_core::Env) {
    register_fn(env, "not", |args| {
        check_arity!(args, "not", 1);
        Ok(Value::Bool(!args[0].is_truthy()))
    });

    // Library procedures, so arguments are already evaluated; both return
    // the deciding value rather than a plain boolean.
    register_fn(env, "and", |args| {
        let mut last = Value::Bool(true);
        for arg in args {
            if !arg.is_truthy() {
                return Ok(arg.clone());
            }
            last = arg.clone();
        }
        Ok(last)
    });

    register_fn(env, "or", |args| {
        for arg in args {
            if arg.is_truthy() {
                return Ok(arg.clone());
            }
        }
        Ok(args.last().cloned().unwrap_or(Value::Bool(false)))
    });
}
