use lispy_core::{call_via_callback, check_arity, eval_via_callback, LispyError, Value};

use crate::{register_fn, register_sfn};

pub fn register(env: &lispy_core::Env) {
    // (eval expr) evaluates in the caller's environment;
    // (eval expr e) evaluates in the given first-class environment.
    register_sfn(env, "eval", |args, env| {
        check_arity!(args, "eval", 1..=2);
        let target = match args.get(1) {
            Some(Value::Env(e)) => e.clone(),
            Some(other) => {
                return Err(LispyError::invalid_argument(format!(
                    "eval: expected environment, got {}",
                    other.type_name()
                )))
            }
            None => env.clone(),
        };
        eval_via_callback(&args[0], &target)
    });

    // (parse src): source text to expression tree. A multi-form program
    // wraps in (begin ...) so the result stays a single expression.
    register_fn(env, "parse", |args| {
        check_arity!(args, "parse", 1);
        let source = args[0].as_str().ok_or_else(|| {
            LispyError::invalid_argument(format!(
                "parse: expected string, got {}",
                args[0].type_name()
            ))
        })?;
        let mut exprs = lispy_reader::read_many(source)?;
        if exprs.len() == 1 {
            return Ok(exprs.pop().unwrap_or(Value::Nil));
        }
        let mut items = vec![Value::symbol("begin")];
        items.extend(exprs);
        Ok(Value::list(items))
    });

    register_fn(env, "inspect", |args| {
        check_arity!(args, "inspect", 1);
        Ok(Value::string_from(format!("{}", args[0])))
    });

    register_fn(env, "now", |args| {
        check_arity!(args, "now", 0);
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        Ok(Value::Number(ms))
    });

    // (time thunk): run a zero-argument callable, report elapsed wall
    // time on stderr, return its result.
    register_sfn(env, "time", |args, env| {
        check_arity!(args, "time", 1);
        let start = std::time::Instant::now();
        let result = call_via_callback(&args[0], &[], env)?;
        let elapsed = start.elapsed();
        eprintln!("Elapsed: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
        Ok(result)
    });
}
