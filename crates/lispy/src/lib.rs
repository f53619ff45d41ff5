//! Lispy: an embeddable Lisp interpreter.
//!
//! This crate provides the embedding API over the reader, evaluator and
//! standard library.
//!
//! # Quick Start
//!
//! ```no_run
//! use lispy::{Interpreter, Value};
//!
//! let interp = Interpreter::new();
//! let result = interp.eval_str("(+ 1 2)").unwrap();
//! assert_eq!(result, Value::Number(3.0));
//! ```

use std::rc::Rc;

// Re-export core types.
pub use lispy_core::{
    env_count, intern, resolve, set_trace_reporter, with_resolved, Env, ErrorValue, Lambda,
    LispyError, Macro, NativeFn, Params, SpecialFn, Value,
};
pub use lispy_eval::{call_value, SPECIAL_FORM_NAMES};

/// Result of evaluating a Lispy expression.
pub type EvalResult = Result<Value>;

pub type Result<T> = std::result::Result<T, LispyError>;

/// Parse a single expression from source text.
pub fn parse(source: &str) -> Result<Value> {
    lispy_reader::read(source)
}

/// Parse a whole program.
pub fn parse_many(source: &str) -> Result<Vec<Value>> {
    lispy_reader::read_many(source)
}

/// Evaluate an expression tree against an environment.
pub fn evaluate(expr: &Value, env: &Env) -> EvalResult {
    lispy_eval::eval_value(expr, env)
}

/// A root environment populated with the standard procedure library and
/// the prelude.
pub fn make_standard_environment() -> Env {
    lispy_eval::make_standard_environment()
}

/// A bare environment, optionally chained to a parent.
pub fn make_environment(parent: Option<Rc<Env>>) -> Env {
    match parent {
        Some(parent) => Env::with_parent(parent),
        None => Env::new(),
    }
}

/// Install a host procedure: receives evaluated arguments.
pub fn register_procedure<F>(env: &Env, name: &str, f: F)
where
    F: Fn(&[Value]) -> Result<Value> + 'static,
{
    env.define_str(name, Value::native_fn(NativeFn::new(name, f)));
}

/// Install a host procedure that also observes the caller's environment.
pub fn register_special<F>(env: &Env, name: &str, f: F)
where
    F: Fn(&[Value], &Env) -> Result<Value> + 'static,
{
    env.define_str(name, Value::special_fn(SpecialFn::new(name, f)));
}

/// Toggle the evaluation trace. Semantics are unchanged either way.
pub fn set_debug(flag: bool) {
    lispy_core::set_debug(flag);
}

/// Builder for configuring and constructing an [`Interpreter`].
///
/// By default both the standard library and the prelude are enabled.
pub struct InterpreterBuilder {
    stdlib: bool,
    prelude: bool,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            stdlib: true,
            prelude: true,
        }
    }

    /// Enable or disable the standard library (default: `true`). With the
    /// library disabled only the special forms work; `list`, `tuple` and
    /// the constants are gone.
    pub fn with_stdlib(mut self, enable: bool) -> Self {
        self.stdlib = enable;
        self
    }

    /// Enable or disable the Lispy prelude (default: `true`). The prelude
    /// requires the standard library.
    pub fn with_prelude(mut self, enable: bool) -> Self {
        self.prelude = enable;
        self
    }

    pub fn build(self) -> Interpreter {
        lispy_core::set_eval_callback(lispy_eval::eval_value);
        lispy_core::set_call_callback(lispy_eval::call_value);
        let env = Env::new();
        if self.stdlib {
            lispy_stdlib::register_stdlib(&env);
            if self.prelude {
                for expr in lispy_reader::read_many(lispy_eval::PRELUDE)
                    .expect("prelude must parse")
                {
                    lispy_eval::eval_value(&expr, &env).expect("prelude must evaluate");
                }
            }
        }
        Interpreter {
            inner: lispy_eval::Interpreter {
                global_env: Rc::new(env),
            },
        }
    }
}

/// A Lispy interpreter instance holding a root environment.
///
/// Definitions (`define`) persist across calls, so you can define a
/// function in one call and use it in the next.
pub struct Interpreter {
    inner: lispy_eval::Interpreter,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    /// Create an [`InterpreterBuilder`] for fine-grained configuration.
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Evaluate a single parsed expression.
    pub fn eval(&self, expr: &Value) -> EvalResult {
        self.inner.eval(expr)
    }

    /// Parse and evaluate a string of one or more expressions; the last
    /// value is returned.
    pub fn eval_str(&self, input: &str) -> EvalResult {
        self.inner.eval_str(input)
    }

    /// Register a native procedure callable from Lispy code.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lispy::{Interpreter, LispyError, Value};
    ///
    /// let interp = Interpreter::new();
    /// interp.register_fn("square", |args: &[Value]| {
    ///     match args[0].as_number() {
    ///         Some(n) => Ok(Value::Number(n * n)),
    ///         None => Err(LispyError::invalid_argument("square: expected number")),
    ///     }
    /// });
    /// ```
    pub fn register_fn<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        register_procedure(&self.inner.global_env, name, f);
    }

    /// Register a procedure that observes the caller's environment.
    pub fn register_special_fn<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value], &Env) -> Result<Value> + 'static,
    {
        register_special(&self.inner.global_env, name, f);
    }

    /// Load and evaluate a source file into the root environment.
    pub fn load_file(&self, path: impl AsRef<std::path::Path>) -> EvalResult {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LispyError::Io(format!("load_file {}: {e}", path.display())))?;
        self.eval_str(&content)
    }

    /// The root environment.
    pub fn global_env(&self) -> &Rc<Env> {
        &self.inner.global_env
    }
}
