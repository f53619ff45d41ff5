use std::collections::BTreeMap;

use lispy_core::{check_arity, Value};

use crate::register_fn;

pub fn register(env: &lispy_core::Env) {
    register_fn(env, "kernel:debug?", |args| {
        check_arity!(args, "kernel:debug?", 0);
        Ok(Value::Bool(lispy_core::debug_enabled()))
    });

    // (kernel:debug) toggles the evaluation trace; (kernel:debug flag)
    // sets it. Returns the new state.
    register_fn(env, "kernel:debug", |args| {
        check_arity!(args, "kernel:debug", 0..=1);
        let next = match args.first() {
            Some(v) => v.is_truthy(),
            None => !lispy_core::debug_enabled(),
        };
        lispy_core::set_debug(next);
        Ok(Value::Bool(next))
    });

    register_fn(env, "kernel:stats", |args| {
        check_arity!(args, "kernel:stats", 0);
        let mut entries = BTreeMap::new();
        entries.insert(
            "environments".to_string(),
            Value::Number(lispy_core::env_count() as f64),
        );
        entries.insert(
            "symbols".to_string(),
            Value::Number(lispy_core::interner_len() as f64),
        );
        Ok(Value::dict(entries))
    });
}
