use lispy_core::{check_arity, Value};

use crate::register_fn;

pub fn register(env: &lispy_core::Env) {
    // `to_s` and plain `to_string` render a top-level string bare; the
    // optional `withquotes` flag switches to the reader-syntax form
    // (strings quoted, escapes re-applied).
    register_fn(env, "to_s", |args| {
        check_arity!(args, "to_s", 1);
        Ok(Value::string_from(args[0].to_display_string()))
    });

    register_fn(env, "to_string", |args| {
        check_arity!(args, "to_string", 1..=2);
        let withquotes = args.get(1).map(|v| v.is_truthy()).unwrap_or(false);
        let rendered = if withquotes {
            format!("{}", args[0])
        } else {
            args[0].to_display_string()
        };
        Ok(Value::string_from(rendered))
    });
}
