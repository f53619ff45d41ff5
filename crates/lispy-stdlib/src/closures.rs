use std::rc::Rc;

use lispy_core::{
    bind_params, call_via_callback, check_arity, eval_via_callback, Lambda, LispyError, Macro,
    NativeFn, Params, Value,
};

use crate::register_fn;

fn want_lambda(name: &str, v: &Value) -> Result<Rc<Lambda>, LispyError> {
    v.as_lambda_rc().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected lambda, got {}", v.type_name()))
    })
}

fn want_macro(name: &str, v: &Value) -> Result<Rc<Macro>, LispyError> {
    v.as_macro_rc().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected macro, got {}", v.type_name()))
    })
}

fn want_env_val(name: &str, v: &Value) -> Result<lispy_core::Env, LispyError> {
    v.as_env().cloned().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "{name}: expected environment, got {}",
            v.type_name()
        ))
    })
}

pub fn register(env: &lispy_core::Env) {
    // Introspection mirrors construction: a closure decomposes into the
    // parameter form, the body expression and the captured environment,
    // and those three pieces rebuild an equivalent closure.

    register_fn(env, "lambda:new", |args| {
        check_arity!(args, "lambda:new", 3);
        let params = Params::parse(&args[0])?;
        let captured = want_env_val("lambda:new", &args[2])?;
        Ok(Value::lambda(Lambda {
            params,
            body: args[1].clone(),
            env: captured,
        }))
    });

    register_fn(env, "lambda:args", |args| {
        check_arity!(args, "lambda:args", 1);
        Ok(want_lambda("lambda:args", &args[0])?.params.to_value())
    });

    register_fn(env, "lambda:body", |args| {
        check_arity!(args, "lambda:body", 1);
        Ok(want_lambda("lambda:body", &args[0])?.body.clone())
    });

    register_fn(env, "lambda:env", |args| {
        check_arity!(args, "lambda:env", 1);
        Ok(Value::Env(want_lambda("lambda:env", &args[0])?.env.clone()))
    });

    // A host procedure that applies the closure: what the self-hosted
    // dynamic evaluator installs into its dispatch tables.
    register_fn(env, "lambda:evaluator", |args| {
        check_arity!(args, "lambda:evaluator", 1);
        let lambda = want_lambda("lambda:evaluator", &args[0])?;
        let callee = Value::Lambda(Rc::clone(&lambda));
        Ok(Value::native_fn(NativeFn::new(
            "lambda-evaluator",
            move |call_args| call_via_callback(&callee, call_args, &lambda.env),
        )))
    });

    register_fn(env, "macro:new", |args| {
        check_arity!(args, "macro:new", 3);
        let params = Params::parse(&args[0])?;
        let captured = want_env_val("macro:new", &args[2])?;
        Ok(Value::macro_val(Macro {
            params,
            body: args[1].clone(),
            env: captured,
        }))
    });

    register_fn(env, "macro:args", |args| {
        check_arity!(args, "macro:args", 1);
        Ok(want_macro("macro:args", &args[0])?.params.to_value())
    });

    register_fn(env, "macro:body", |args| {
        check_arity!(args, "macro:body", 1);
        Ok(want_macro("macro:body", &args[0])?.body.clone())
    });

    register_fn(env, "macro:env", |args| {
        check_arity!(args, "macro:env", 1);
        Ok(Value::Env(want_macro("macro:env", &args[0])?.env.clone()))
    });

    // Produces the expansion without evaluating it in the caller.
    register_fn(env, "macro:evaluator", |args| {
        check_arity!(args, "macro:evaluator", 1);
        let mac = want_macro("macro:evaluator", &args[0])?;
        Ok(Value::native_fn(NativeFn::new(
            "macro-evaluator",
            move |call_args| {
                let expansion_env =
                    bind_params(&mac.params, call_args, Rc::new(mac.env.clone()));
                eval_via_callback(&mac.body, &expansion_env)
            },
        )))
    });
}
