use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::LispyError;
use crate::value::{Env, Value};

/// Evaluate an expression in an environment.
pub type EvalCallback = fn(&Value, &Env) -> Result<Value, LispyError>;

/// Apply a callable value to evaluated arguments; the environment is the
/// caller's, threaded through for `SpecialFn` targets.
pub type CallCallback = fn(&Value, &[Value], &Env) -> Result<Value, LispyError>;

thread_local! {
    static EVAL_CALLBACK: Cell<Option<EvalCallback>> = const { Cell::new(None) };
    static CALL_CALLBACK: Cell<Option<CallCallback>> = const { Cell::new(None) };
    static DEBUG: Cell<bool> = const { Cell::new(false) };
    static TRACE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static TRACE_REPORTER: RefCell<Rc<dyn Fn(&str)>> =
        RefCell::new(Rc::new(|line: &str| eprintln!("{line}")));
}

/// Install the evaluator entry point. Called once by the eval crate so
/// that library procedures (map, eval, try helpers, ...) can re-enter
/// evaluation without a crate cycle.
pub fn set_eval_callback(f: EvalCallback) {
    EVAL_CALLBACK.with(|c| c.set(Some(f)));
}

pub fn set_call_callback(f: CallCallback) {
    CALL_CALLBACK.with(|c| c.set(Some(f)));
}

pub fn eval_via_callback(expr: &Value, env: &Env) -> Result<Value, LispyError> {
    match EVAL_CALLBACK.with(|c| c.get()) {
        Some(f) => f(expr, env),
        None => Err(LispyError::unexpected_input(
            "no evaluator installed on this thread",
        )),
    }
}

pub fn call_via_callback(func: &Value, args: &[Value], env: &Env) -> Result<Value, LispyError> {
    match CALL_CALLBACK.with(|c| c.get()) {
        Some(f) => f(func, args, env),
        None => Err(LispyError::unexpected_input(
            "no evaluator installed on this thread",
        )),
    }
}

// ── Debug trace ───────────────────────────────────────────────────

/// Toggle the evaluation trace. Switching the flag never changes
/// observable evaluation semantics.
pub fn set_debug(flag: bool) {
    DEBUG.with(|c| c.set(flag));
}

pub fn debug_enabled() -> bool {
    DEBUG.with(|c| c.get())
}

/// Replace the trace sink (default: stderr).
pub fn set_trace_reporter(f: impl Fn(&str) + 'static) {
    TRACE_REPORTER.with(|r| *r.borrow_mut() = Rc::new(f));
}

pub fn trace(line: &str) {
    let reporter = TRACE_REPORTER.with(|r| Rc::clone(&r.borrow()));
    reporter(line);
}

/// Enter one level of trace nesting, reporting the expression about to be
/// evaluated. Returns the entry depth for [`trace_exit`].
pub fn trace_enter(expr: &Value) -> usize {
    let depth = TRACE_DEPTH.with(|d| {
        let depth = d.get();
        d.set(depth + 1);
        depth
    });
    trace(&format!("{}{expr}", "  ".repeat(depth)));
    depth
}

pub fn trace_exit(depth: usize, result: &Result<Value, LispyError>) {
    match result {
        Ok(v) => trace(&format!("{}=> {v}", "  ".repeat(depth))),
        Err(e) => trace(&format!("{}=! {e}", "  ".repeat(depth))),
    }
    TRACE_DEPTH.with(|d| d.set(depth));
}
