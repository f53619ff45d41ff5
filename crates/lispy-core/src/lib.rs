pub mod error;
pub mod hooks;
pub mod value;

pub use error::{error_to_value, LispyError, Span};
pub use hooks::{
    call_via_callback, debug_enabled, eval_via_callback, set_call_callback, set_debug,
    set_eval_callback, set_trace_reporter, trace, trace_enter, trace_exit, CallCallback,
    EvalCallback,
};
pub use value::{
    bind_params, env_count, intern, interner_len, resolve, with_resolved, Env, ErrorValue, Lambda,
    Macro, NativeFn, Params, SpecialFn, Value,
};

pub use lasso::Spur;
