use lispy_core::{check_arity, LispyError, Value};

use crate::register_fn;

fn want_str<'a>(name: &str, v: &'a Value) -> Result<&'a str, LispyError> {
    v.as_str().ok_or_else(|| {
        LispyError::invalid_argument(format!("{name}: expected string, got {}", v.type_name()))
    })
}

pub fn register(env: &lispy_core::Env) {
    // `print` space-joins the unquoted rendering of each argument and
    // terminates with a newline.
    register_fn(env, "print", |args| {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                print!(" ");
            }
            print!("{}", arg.to_display_string());
        }
        println!();
        Ok(Value::Nil)
    });

    register_fn(env, "display", |args| {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                print!(" ");
            }
            print!("{}", arg.to_display_string());
        }
        Ok(Value::Nil)
    });

    register_fn(env, "newline", |args| {
        check_arity!(args, "newline", 0);
        println!();
        Ok(Value::Nil)
    });

    register_fn(env, "read-file", |args| {
        check_arity!(args, "read-file", 1);
        let path = want_str("read-file", &args[0])?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LispyError::Io(format!("read-file {path}: {e}")))?;
        Ok(Value::string_from(content))
    });

    register_fn(env, "write-file", |args| {
        check_arity!(args, "write-file", 2);
        let path = want_str("write-file", &args[0])?;
        let content = want_str("write-file", &args[1])?;
        std::fs::write(path, content)
            .map_err(|e| LispyError::Io(format!("write-file {path}: {e}")))?;
        Ok(Value::Nil)
    });

    register_fn(env, "file-exists?", |args| {
        check_arity!(args, "file-exists?", 1);
        let path = want_str("file-exists?", &args[0])?;
        Ok(Value::Bool(std::path::Path::new(path).exists()))
    });

    register_fn(env, "read-line", |args| {
        check_arity!(args, "read-line", 0);
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .map_err(|e| LispyError::Io(format!("read-line: {e}")))?;
        if input.ends_with('\n') {
            input.pop();
            if input.ends_with('\r') {
                input.pop();
            }
        }
        Ok(Value::string_from(input))
    });
}
