mod eval;
mod prelude;
mod special_forms;

pub use eval::{
    apply_macro, call_value, capture_stack, eval_string, eval_value, make_standard_environment,
    EvalResult, Interpreter, Trampoline,
};
pub use prelude::PRELUDE;
pub use special_forms::SPECIAL_FORM_NAMES;
