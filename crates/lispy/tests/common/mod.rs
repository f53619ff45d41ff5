use lispy::{Interpreter, LispyError, Value};

/// Evaluate directly.
pub fn eval(input: &str) -> Value {
    let interp = Interpreter::new();
    interp
        .eval_str(input)
        .unwrap_or_else(|e| panic!("eval failed for `{input}`: {e}"))
}

/// Evaluate after printing each parsed form and reading it back. Exercises
/// the reader round trip on every test program.
pub fn eval_reparsed(input: &str) -> Value {
    let interp = Interpreter::new();
    let exprs = lispy::parse_many(input)
        .unwrap_or_else(|e| panic!("parse failed for `{input}`: {e}"));
    let mut result = Value::Nil;
    for expr in &exprs {
        let printed = format!("{expr}");
        let reread = lispy::parse(&printed)
            .unwrap_or_else(|e| panic!("re-parse failed for `{printed}`: {e}"));
        assert_eq!(reread, *expr, "print/read round trip for `{printed}`");
        result = interp
            .eval(&reread)
            .unwrap_or_else(|e| panic!("eval failed for `{printed}`: {e}"));
    }
    result
}

/// Evaluate, expecting an error.
pub fn eval_err(input: &str) -> LispyError {
    let interp = Interpreter::new();
    match interp.eval_str(input) {
        Ok(v) => panic!("expected error for `{input}`, got {v}"),
        Err(e) => e,
    }
}

/// Generate tests that run each program twice: once directly and once
/// through a print/re-parse cycle.
///
/// Usage:
/// ```ignore
/// eval_tests! {
///     test_name: "(+ 1 2)" => Value::Number(3.0),
/// }
/// ```
#[macro_export]
macro_rules! eval_tests {
    ($($name:ident : $input:expr => $expected:expr),* $(,)?) => {
        $(
            paste::paste! {
                #[test]
                fn [<$name _direct>]() {
                    let result = common::eval($input);
                    assert_eq!(result, $expected, "direct: {}", $input);
                }

                #[test]
                fn [<$name _reparsed>]() {
                    let result = common::eval_reparsed($input);
                    assert_eq!(result, $expected, "reparsed: {}", $input);
                }
            }
        )*
    };
}

/// Generate tests asserting evaluation fails.
#[macro_export]
macro_rules! eval_error_tests {
    ($($name:ident : $input:expr),* $(,)?) => {
        $(
            paste::paste! {
                #[test]
                fn [<$name _errors>]() {
                    let _ = common::eval_err($input);
                }
            }
        )*
    };
}
