mod arithmetic;
mod closures;
mod comparison;
mod convert;
mod dict_ops;
mod env_ops;
mod error_ops;
mod io;
mod kernel;
mod list;
mod logic;
mod meta;
mod predicates;

use std::rc::Rc;

use lispy_core::{Env, LispyError, NativeFn, SpecialFn, Value};

/// Populate a root environment with the standard procedure library. The
/// evaluator's observable behavior depends on several of these being
/// present (`list`, `tuple`, the constants), so this always runs before
/// any program is evaluated.
pub fn register_stdlib(env: &Env) {
    env.define_str("nil", Value::Nil);
    env.define_str("undefined", Value::Undefined);
    env.define_str("true", Value::Bool(true));
    env.define_str("false", Value::Bool(false));

    arithmetic::register(env);
    comparison::register(env);
    convert::register(env);
    list::register(env);
    predicates::register(env);
    logic::register(env);
    io::register(env);
    env_ops::register(env);
    dict_ops::register(env);
    closures::register(env);
    error_ops::register(env);
    meta::register(env);
    kernel::register(env);
}

pub(crate) fn register_fn(
    env: &Env,
    name: &str,
    f: impl Fn(&[Value]) -> Result<Value, LispyError> + 'static,
) {
    env.define(
        lispy_core::intern(name),
        Value::NativeFn(Rc::new(NativeFn::new(name, f))),
    );
}

pub(crate) fn register_sfn(
    env: &Env,
    name: &str,
    f: impl Fn(&[Value], &Env) -> Result<Value, LispyError> + 'static,
) {
    env.define(
        lispy_core::intern(name),
        Value::SpecialFn(Rc::new(SpecialFn::new(name, f))),
    );
}

/// Coerce an argument to a number or fail with the procedure's name.
pub(crate) fn want_number(name: &str, v: &Value) -> Result<f64, LispyError> {
    v.as_number().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected number, got {}", v.type_name()))
    })
}
