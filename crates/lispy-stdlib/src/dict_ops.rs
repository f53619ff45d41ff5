use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lispy_core::{check_arity, resolve, LispyError, Value};

use crate::register_fn;

fn want_dict<'a>(
    name: &str,
    v: &'a Value,
) -> Result<&'a Rc<RefCell<BTreeMap<String, Value>>>, LispyError> {
    v.as_dict().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected dict, got {}", v.type_name()))
    })
}

/// Dict keys are strings; symbols coerce by name.
fn want_key(name: &str, v: &Value) -> Result<String, LispyError> {
    match v {
        Value::String(s) => Ok(s.to_string()),
        Value::Symbol(spur) => Ok(resolve(*spur)),
        other => Err(LispyError::invalid_argument(format!(
            "{name}: expected string or symbol key, got {}",
            other.type_name()
        ))),
    }
}

pub fn register(env: &lispy_core::Env) {
    // (dict:new k1 v1 k2 v2 ...)
    register_fn(env, "dict:new", |args| {
        if args.len() % 2 != 0 {
            return Err(LispyError::invalid_argument(
                "dict:new: expected an even number of arguments".to_string(),
            ));
        }
        let mut entries = BTreeMap::new();
        for pair in args.chunks(2) {
            entries.insert(want_key("dict:new", &pair[0])?, pair[1].clone());
        }
        Ok(Value::dict(entries))
    });

    register_fn(env, "dict:get", |args| {
        check_arity!(args, "dict:get", 2);
        let dict = want_dict("dict:get", &args[0])?;
        let key = want_key("dict:get", &args[1])?;
        Ok(dict.borrow().get(&key).cloned().unwrap_or(Value::Undefined))
    });

    register_fn(env, "dict:set", |args| {
        check_arity!(args, "dict:set", 3);
        let dict = want_dict("dict:set", &args[0])?;
        let key = want_key("dict:set", &args[1])?;
        dict.borrow_mut().insert(key, args[2].clone());
        Ok(args[2].clone())
    });

    // Bulk assign, mirroring env:update: parallel key and value lists.
    register_fn(env, "dict:update", |args| {
        check_arity!(args, "dict:update", 3);
        let dict = want_dict("dict:update", &args[0])?;
        let keys = args[1].as_list().ok_or_else(|| {
            LispyError::invalid_argument(format!(
                "dict:update: expected list of keys, got {}",
                args[1].type_name()
            ))
        })?;
        let values = args[2].as_list().ok_or_else(|| {
            LispyError::invalid_argument(format!(
                "dict:update: expected list of values, got {}",
                args[2].type_name()
            ))
        })?;
        let mut entries = dict.borrow_mut();
        for (i, key) in keys.iter().enumerate() {
            let key = want_key("dict:update", key)?;
            let val = values.get(i).cloned().unwrap_or(Value::Undefined);
            entries.insert(key, val);
        }
        drop(entries);
        Ok(args[0].clone())
    });

    register_fn(env, "dict:key?", |args| {
        check_arity!(args, "dict:key?", 2);
        let dict = want_dict("dict:key?", &args[0])?;
        let key = want_key("dict:key?", &args[1])?;
        Ok(Value::Bool(dict.borrow().contains_key(&key)))
    });

    register_fn(env, "dict:keys", |args| {
        check_arity!(args, "dict:keys", 1);
        let dict = want_dict("dict:keys", &args[0])?;
        Ok(Value::list(
            dict.borrow().keys().map(|k| Value::string(k)).collect(),
        ))
    });
}
