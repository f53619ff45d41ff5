use std::rc::Rc;

use lispy_core::{check_arity, resolve, Env, LispyError, Spur, Value};

use crate::{register_fn, register_sfn};

fn want_env<'a>(name: &str, v: &'a Value) -> Result<&'a Env, LispyError> {
    v.as_env().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "{name}: expected environment, got {}",
            v.type_name()
        ))
    })
}

fn want_name(name: &str, v: &Value) -> Result<Spur, LispyError> {
    v.as_name_spur().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "{name}: expected symbol or string, got {}",
            v.type_name()
        ))
    })
}

fn name_list(name: &str, v: &Value) -> Result<Vec<Spur>, LispyError> {
    let items = v.as_list().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected list, got {}", v.type_name()))
    })?;
    items.iter().map(|item| want_name(name, item)).collect()
}

pub fn register(env: &lispy_core::Env) {
    // The one primitive that has to observe the caller: everything else
    // on this surface works on explicit first-class environment values.
    register_sfn(env, "env:current", |args, env| {
        check_arity!(args, "env:current", 0);
        Ok(Value::Env(env.clone()))
    });

    register_fn(env, "env:new", |args| {
        check_arity!(args, "env:new", 0..=1);
        match args.first() {
            Some(Value::Env(parent)) => {
                Ok(Value::Env(Env::with_parent(Rc::new(parent.clone()))))
            }
            Some(Value::Nil) | Some(Value::Undefined) | None => Ok(Value::Env(Env::new())),
            Some(other) => Err(LispyError::invalid_argument(format!(
                "env:new: expected environment or nil, got {}",
                other.type_name()
            ))),
        }
    });

    register_fn(env, "env:get", |args| {
        check_arity!(args, "env:get", 2);
        let target = want_env("env:get", &args[0])?;
        let name = want_name("env:get", &args[1])?;
        target
            .get(name)
            .ok_or_else(|| LispyError::key_not_found(resolve(name)))
    });

    register_fn(env, "env:define", |args| {
        check_arity!(args, "env:define", 3);
        let target = want_env("env:define", &args[0])?;
        let name = want_name("env:define", &args[1])?;
        target.define(name, args[2].clone());
        Ok(args[2].clone())
    });

    register_fn(env, "env:defined?", |args| {
        check_arity!(args, "env:defined?", 2);
        let target = want_env("env:defined?", &args[0])?;
        let name = want_name("env:defined?", &args[1])?;
        Ok(Value::Bool(target.present(name)))
    });

    register_fn(env, "env:set!", |args| {
        check_arity!(args, "env:set!", 3);
        let target = want_env("env:set!", &args[0])?;
        let name = want_name("env:set!", &args[1])?;
        if !target.set_existing(name, args[2].clone()) {
            return Err(LispyError::key_not_found(resolve(name)));
        }
        Ok(args[2].clone())
    });

    register_fn(env, "env:update", |args| {
        check_arity!(args, "env:update", 3);
        let target = want_env("env:update", &args[0])?;
        let names = name_list("env:update", &args[1])?;
        let values = args[2].as_list().ok_or_else(|| {
            LispyError::invalid_argument(format!(
                "env:update: expected list of values, got {}",
                args[2].type_name()
            ))
        })?;
        target.update(&names, values);
        Ok(args[0].clone())
    });

    register_fn(env, "env:parent", |args| {
        check_arity!(args, "env:parent", 1);
        let target = want_env("env:parent", &args[0])?;
        Ok(match target.parent() {
            Some(parent) => Value::Env((*parent).clone()),
            None => Value::Nil,
        })
    });

    register_fn(env, "env:parent?", |args| {
        check_arity!(args, "env:parent?", 1);
        let target = want_env("env:parent?", &args[0])?;
        Ok(Value::Bool(target.parent().is_some()))
    });

    register_fn(env, "env:toplevel", |args| {
        check_arity!(args, "env:toplevel", 1);
        let target = want_env("env:toplevel", &args[0])?;
        Ok(Value::Env(target.top_level()))
    });

    register_fn(env, "env:keys", |args| {
        check_arity!(args, "env:keys", 1);
        let target = want_env("env:keys", &args[0])?;
        Ok(Value::list(
            target
                .keys()
                .into_iter()
                .map(Value::Symbol)
                .collect(),
        ))
    });

    // Debug print of the chain; defaults to the caller's environment.
    register_sfn(env, "env:dump", |args, env| {
        check_arity!(args, "env:dump", 0..=1);
        let target = match args.first() {
            Some(v) => want_env("env:dump", v)?.clone(),
            None => env.clone(),
        };
        lispy_core::trace(&format!(
            "environments created: {}\n{}",
            lispy_core::env_count(),
            target.dump()
        ));
        Ok(Value::Nil)
    });
}
