use std::rc::Rc;

use lispy_core::{check_arity, ErrorValue, LispyError, Value};

use crate::register_fn;

fn want_error(name: &str, v: &Value) -> Result<Rc<ErrorValue>, LispyError> {
    v.as_error_rc().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected error, got {}", v.type_name()))
    })
}

pub fn register(env: &lispy_core::Env) {
    // (error v) raises v; a `try` upstream turns it back into an Error
    // value for the handler.
    register_fn(env, "error", |args| {
        check_arity!(args, "error", 1);
        Err(LispyError::Raised(args[0].clone()))
    });

    register_fn(env, "error:custom", |args| {
        check_arity!(args, "error:custom", 2);
        let name = match &args[0] {
            Value::Symbol(spur) => lispy_core::resolve(*spur),
            Value::String(s) => s.to_string(),
            other => {
                return Err(LispyError::invalid_argument(format!(
                    "error:custom: name must be a symbol or string, got {}",
                    other.type_name()
                )))
            }
        };
        let message = args[1].to_display_string();
        Ok(Value::error(ErrorValue::custom(name, message)))
    });

    register_fn(env, "error:name", |args| {
        check_arity!(args, "error:name", 1);
        Ok(Value::symbol(&want_error("error:name", &args[0])?.name))
    });

    register_fn(env, "error:message", |args| {
        check_arity!(args, "error:message", 1);
        Ok(Value::string(&want_error("error:message", &args[0])?.message))
    });

    register_fn(env, "error:stack", |args| {
        check_arity!(args, "error:stack", 1);
        Ok(match &want_error("error:stack", &args[0])?.stack {
            Some(stack) => Value::string(stack),
            None => Value::Nil,
        })
    });

    register_fn(env, "error:code", |args| {
        check_arity!(args, "error:code", 1);
        Ok(match &want_error("error:code", &args[0])?.code {
            Some(code) => Value::string(code),
            None => Value::Nil,
        })
    });

    register_fn(env, "error:data", |args| {
        check_arity!(args, "error:data", 1);
        Ok(want_error("error:data", &args[0])?
            .data
            .clone()
            .unwrap_or(Value::Undefined))
    });
}
