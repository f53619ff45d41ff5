use std::cell::RefCell;
use std::rc::Rc;

use lispy_core::{
    bind_params, debug_enabled, resolve, trace_enter, trace_exit, Env, Lambda, LispyError, Macro,
    Value,
};

use crate::special_forms;

/// Trampoline for tail-call elimination: either a finished value, or the
/// next (expression, environment) pair to evaluate in the current frame.
pub enum Trampoline {
    Value(Value),
    Eval(Value, Env),
}

pub type EvalResult = Result<Value, LispyError>;

// --- Call stack (for error traces) ---

thread_local! {
    static CALL_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn push_call_frame(name: String) {
    CALL_STACK.with(|s| s.borrow_mut().push(name));
}

fn call_stack_depth() -> usize {
    CALL_STACK.with(|s| s.borrow().len())
}

fn truncate_call_stack(depth: usize) {
    CALL_STACK.with(|s| s.borrow_mut().truncate(depth));
}

/// Render the current call stack, innermost frame first. Empty stack
/// renders as `None`.
pub fn capture_stack() -> Option<String> {
    CALL_STACK.with(|s| {
        let stack = s.borrow();
        if stack.is_empty() {
            return None;
        }
        let mut out = String::new();
        for frame in stack.iter().rev() {
            out.push_str("  at ");
            out.push_str(frame);
            out.push('\n');
        }
        Some(out)
    })
}

/// RAII guard that truncates the call stack on drop.
struct CallStackGuard {
    entry_depth: usize,
}

impl Drop for CallStackGuard {
    fn drop(&mut self) {
        truncate_call_stack(self.entry_depth);
    }
}

// --- The evaluator ---

/// Evaluate an expression with trampolined tail calls. Each call runs its
/// own loop, so host procedures may re-enter the evaluator freely.
pub fn eval_value(expr: &Value, env: &Env) -> EvalResult {
    if debug_enabled() {
        let depth = trace_enter(expr);
        let result = eval_loop(expr, env);
        trace_exit(depth, &result);
        return result;
    }
    eval_loop(expr, env)
}

fn eval_loop(expr: &Value, env: &Env) -> EvalResult {
    let mut current_expr = expr.clone();
    let mut current_env = env.clone();
    let entry_depth = call_stack_depth();
    let guard = CallStackGuard { entry_depth };

    loop {
        match eval_step(&current_expr, &current_env) {
            Ok(Trampoline::Value(v)) => {
                drop(guard);
                return Ok(v);
            }
            Ok(Trampoline::Eval(next_expr, next_env)) => {
                // Tail call: collapse accumulated frames down to the most
                // recent one so tail-recursive loops keep a bounded stack.
                CALL_STACK.with(|s| {
                    let mut stack = s.borrow_mut();
                    if stack.len() > entry_depth + 1 {
                        let top = stack.pop();
                        stack.truncate(entry_depth);
                        if let Some(frame) = top {
                            stack.push(frame);
                        }
                    }
                });
                current_expr = next_expr;
                current_env = next_env;
            }
            Err(e) => {
                let e = if e.stack_trace().is_none() {
                    match capture_stack() {
                        Some(stack) => e.with_stack(stack),
                        None => e,
                    }
                } else {
                    e
                };
                drop(guard);
                return Err(e);
            }
        }
    }
}

fn eval_step(expr: &Value, env: &Env) -> Result<Trampoline, LispyError> {
    match expr {
        // Symbol lookup walks the environment chain.
        Value::Symbol(spur) => env
            .get(*spur)
            .map(Trampoline::Value)
            .ok_or_else(|| LispyError::key_not_found(resolve(*spur))),

        // Applications and special forms.
        Value::List(items) => {
            if items.is_empty() {
                // No operator to dispatch on; the empty list is itself.
                return Ok(Trampoline::Value(expr.clone()));
            }

            let head = &items[0];
            let args = &items[1..];

            if let Value::Symbol(spur) = head {
                if let Some(result) = special_forms::try_eval_special(*spur, args, env) {
                    return result;
                }
            }

            let proc = eval_value(head, env)?;

            // Macros receive the operands unevaluated; the expansion is
            // re-entered in the caller's environment.
            if let Value::Macro(mac) = &proc {
                let expanded = apply_macro(mac, args)?;
                return Ok(Trampoline::Eval(expanded, env.clone()));
            }

            let mut eval_args = Vec::with_capacity(args.len());
            for arg in args {
                eval_args.push(eval_value(arg, env)?);
            }

            let frame_name = match head {
                Value::Symbol(spur) => resolve(*spur),
                _ => proc.type_name().to_string(),
            };

            match &proc {
                Value::Lambda(lambda) => {
                    push_call_frame(frame_name);
                    Ok(apply_lambda(lambda, &eval_args))
                }
                Value::NativeFn(native) => {
                    push_call_frame(frame_name);
                    match (native.func)(&eval_args) {
                        Ok(v) => {
                            truncate_call_stack(call_stack_depth().saturating_sub(1));
                            Ok(Trampoline::Value(v))
                        }
                        // Leave the frame in place for stack capture.
                        Err(e) => Err(e),
                    }
                }
                Value::SpecialFn(special) => {
                    push_call_frame(frame_name);
                    match (special.func)(&eval_args, env) {
                        Ok(v) => {
                            truncate_call_stack(call_stack_depth().saturating_sub(1));
                            Ok(Trampoline::Value(v))
                        }
                        Err(e) => Err(e),
                    }
                }
                // Data values with members: dicts and environments take a
                // member name as the first argument.
                Value::Dict(_) | Value::Env(_) => {
                    invoke_member(&proc, &eval_args, env).map(Trampoline::Value)
                }
                other => Err(LispyError::invalid_operation(format!(
                    "not callable: {} ({})",
                    other,
                    other.type_name()
                ))),
            }
        }

        // Everything else is self-evaluating (including Nil/Undefined).
        other => Ok(Trampoline::Value(other.clone())),
    }
}

/// Apply a lambda to evaluated arguments: bind parameters in a child of
/// the captured environment and hand the body back to the trampoline.
fn apply_lambda(lambda: &Lambda, args: &[Value]) -> Trampoline {
    let new_env = bind_params(&lambda.params, args, Rc::new(lambda.env.clone()));
    Trampoline::Eval(lambda.body.clone(), new_env)
}

/// Expand a macro: bind the *unevaluated* operands in a child of the
/// macro's captured environment and evaluate the body there. The caller
/// evaluates the expansion.
pub fn apply_macro(mac: &Macro, raw_args: &[Value]) -> EvalResult {
    let expansion_env = bind_params(&mac.params, raw_args, Rc::new(mac.env.clone()));
    eval_value(&mac.body, &expansion_env)
}

/// Apply any callable value to already-evaluated arguments. Installed as
/// the core call hook so library procedures (`map`, `reduce`, member
/// invocation, `lambda:evaluator`) can share one application path.
pub fn call_value(func: &Value, args: &[Value], env: &Env) -> EvalResult {
    match func {
        Value::Lambda(lambda) => {
            let new_env = bind_params(&lambda.params, args, Rc::new(lambda.env.clone()));
            eval_value(&lambda.body, &new_env)
        }
        Value::NativeFn(native) => (native.func)(args),
        Value::SpecialFn(special) => (special.func)(args, env),
        Value::Dict(_) | Value::Env(_) => invoke_member(func, args, env),
        other => Err(LispyError::invalid_operation(format!(
            "not callable: {} ({})",
            other,
            other.type_name()
        ))),
    }
}

// --- Member invocation ---

/// Values that expose named members callable from Lispy. Implemented by
/// exactly the dict and environment shapes; applying any other data value
/// raises `InvalidOperation`.
trait MemberCallable {
    fn member(&self, name: &str) -> Option<Value>;
}

impl MemberCallable for Env {
    fn member(&self, name: &str) -> Option<Value> {
        self.get_str(name)
    }
}

impl MemberCallable for RefCell<std::collections::BTreeMap<String, Value>> {
    fn member(&self, name: &str) -> Option<Value> {
        self.borrow().get(name).cloned()
    }
}

/// Stringify a member name: symbols and strings by their text, anything
/// else by its display form.
fn member_name(v: &Value) -> String {
    match v {
        Value::Symbol(spur) => resolve(*spur),
        Value::String(s) => s.to_string(),
        other => other.to_display_string(),
    }
}

/// `(target 'member arg...)`: fetch the member named by the first
/// argument and apply it to the rest. A non-callable member with no
/// further arguments is returned as-is.
fn invoke_member(target: &Value, args: &[Value], env: &Env) -> EvalResult {
    let (name_arg, rest) = args.split_first().ok_or_else(|| {
        LispyError::invalid_argument(format!(
            "member call on {} requires a member name",
            target.type_name()
        ))
    })?;
    let name = member_name(name_arg);

    let member = match target {
        Value::Env(env) => env.member(&name),
        Value::Dict(entries) => entries.member(&name),
        _ => None,
    }
    .ok_or_else(|| LispyError::key_not_found(name.clone()))?;

    if member.is_callable() {
        call_value(&member, rest, env)
    } else if rest.is_empty() {
        Ok(member)
    } else {
        Err(LispyError::invalid_operation(format!(
            "member {name} of {} is not callable",
            target.type_name()
        )))
    }
}

// --- Interpreter ---

/// The interpreter holds the root (standard) environment.
pub struct Interpreter {
    pub global_env: Rc<Env>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let env = make_standard_environment();
        Interpreter {
            global_env: Rc::new(env),
        }
    }

    pub fn eval(&self, expr: &Value) -> EvalResult {
        eval_value(expr, &self.global_env)
    }

    pub fn eval_str(&self, input: &str) -> EvalResult {
        eval_string(input, &self.global_env)
    }
}

/// Build a root environment with the standard library registered and the
/// prelude evaluated into it. Also installs the evaluator hooks for this
/// thread.
pub fn make_standard_environment() -> Env {
    lispy_core::set_eval_callback(eval_value);
    lispy_core::set_call_callback(call_value);
    let env = Env::new();
    lispy_stdlib::register_stdlib(&env);
    for expr in lispy_reader::read_many(crate::prelude::PRELUDE)
        .expect("prelude must parse")
    {
        eval_value(&expr, &env).expect("prelude must evaluate");
    }
    env
}

/// Evaluate a string containing one or more expressions; the value of the
/// last one is returned.
pub fn eval_string(input: &str, env: &Env) -> EvalResult {
    let exprs = lispy_reader::read_many(input)?;
    let mut result = Value::Nil;
    for expr in &exprs {
        result = eval_value(expr, env)?;
    }
    Ok(result)
}
