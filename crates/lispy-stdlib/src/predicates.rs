use lispy_core::{check_arity, LispyError, Value};

use crate::register_fn;

fn predicate(
    env: &lispy_core::Env,
    name: &'static str,
    f: impl Fn(&Value) -> bool + 'static,
) {
    register_fn(env, name, move |args| -> Result<Value, LispyError> {
        check_arity!(args, name, 1);
        Ok(Value::Bool(f(&args[0])))
    });
}

pub fn register(env: &lispy_core::Env) {
    predicate(env, "list?", |v| matches!(v, Value::List(_)));
    predicate(env, "tuple?", |v| matches!(v, Value::Tuple(_)));
    predicate(env, "number?", |v| matches!(v, Value::Number(_)));
    predicate(env, "string?", |v| matches!(v, Value::String(_)));
    predicate(env, "symbol?", |v| matches!(v, Value::Symbol(_)));
    predicate(env, "bool?", |v| matches!(v, Value::Bool(_)));
    predicate(env, "lambda?", |v| matches!(v, Value::Lambda(_)));
    predicate(env, "macro?", |v| matches!(v, Value::Macro(_)));
    predicate(env, "env?", |v| matches!(v, Value::Env(_)));
    predicate(env, "dict?", |v| matches!(v, Value::Dict(_)));
    predicate(env, "error?", |v| matches!(v, Value::Error(_)));

    // procedure? covers host callables; user closures answer to lambda?
    predicate(env, "procedure?", |v| {
        matches!(v, Value::NativeFn(_) | Value::SpecialFn(_))
    });

    // null? means "empty or absent"
    predicate(env, "null?", |v| match v {
        Value::Nil | Value::Undefined => true,
        Value::List(items) => items.is_empty(),
        _ => false,
    });

    register_fn(env, "typeof", |args| {
        check_arity!(args, "typeof", 1);
        Ok(Value::symbol(args[0].type_name()))
    });
}
