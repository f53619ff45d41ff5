mod common;

use lispy::Value;

fn num(n: f64) -> Value {
    Value::Number(n)
}

// ============================================================
// Arithmetic
// ============================================================

eval_tests! {
    arith_add: "(+ 1 2 3)" => num(6.0),
    arith_add_identity: "(+)" => num(0.0),
    arith_add_single: "(+ 5)" => num(5.0),
    arith_mul_identity: "(*)" => num(1.0),
    arith_sub: "(- 10 3)" => num(7.0),
    arith_sub_unary: "(- 5)" => num(-5.0),
    arith_div: "(/ 10 2)" => num(5.0),
    arith_div_reciprocal: "(/ 4)" => num(0.25),
    arith_left_fold: "(- 10 1 2 3)" => num(4.0),
    arith_nested: "(+ (* 2 3) (- 10 4))" => num(12.0),
    arith_floats: "(+ 0.5 0.25)" => num(0.75),
    arith_negative_literal: "(+ -3 -7)" => num(-10.0),
    add_law_left_fold: "(= (+ 1 2 3) (+ (+ 1 2) 3))" => Value::Bool(true),
}

eval_error_tests! {
    sub_no_args: "(-)",
    div_no_args: "(/)",
    add_non_number: "(+ 1 \"x\")",
}

// ============================================================
// Truth rule: only false is falsy
// ============================================================

eval_tests! {
    if_false: "(if false 1 2)" => num(2.0),
    if_true: "(if true 1 2)" => num(1.0),
    if_zero: "(if 0 1 2)" => num(1.0),
    if_nil: "(if nil 1 2)" => num(1.0),
    if_empty_string: "(if \"\" 1 2)" => num(1.0),
    if_empty_list: "(if '() 1 2)" => num(1.0),
    if_undefined: "(if undefined 1 2)" => num(1.0),
    if_no_alternative: "(if false 1)" => Value::Nil,
}

// ============================================================
// Core forms
// ============================================================

eval_tests! {
    define_returns_value: "(define x 42)" => num(42.0),
    define_then_use: "(begin (define x 42) x)" => num(42.0),
    define_string_name: "(begin (define \"x\" 7) x)" => num(7.0),
    defined_yes: "(begin (define x 1) (defined? x))" => Value::Bool(true),
    defined_no: "(defined? certainly-not-bound)" => Value::Bool(false),
    set_bang: "(begin (define x 1) (set! x 2) x)" => num(2.0),
    set_returns_value: "(begin (define x 1) (set! x 9))" => num(9.0),
    begin_basic: "(begin 1 2 3)" => num(3.0),
    begin_empty: "(begin)" => Value::Nil,
    quote_symbol: "(quote abc)" => Value::symbol("abc"),
    quote_sugar: "'abc" => Value::symbol("abc"),
    quote_list: "'(1 2)" => Value::list(vec![num(1.0), num(2.0)]),
    self_eval_number: "42" => num(42.0),
    self_eval_string: "\"hi\"" => Value::string("hi"),
    constants_nil: "nil" => Value::Nil,
    constants_undefined: "undefined" => Value::Undefined,
}

eval_error_tests! {
    set_unbound: "(set! nope 1)",
    unbound_symbol: "no-such-binding",
    if_zero_args: "(if)",
    if_one_arg: "(if true)",
}

// ============================================================
// Lambdas, closures, binding
// ============================================================

eval_tests! {
    lambda_basic: "((lambda (x y) (+ x y)) 3 4)" => num(7.0),
    lambda_define: "(begin (define add (lambda (x y) (+ x y))) (add 3 4))" => num(7.0),
    lexical_capture: "(begin (define mk (lambda (x) (lambda (y) (+ x y)))) ((mk 10) 5))" => num(15.0),
    missing_args_are_undefined: "((lambda (a b) (typeof b)) 1)" => Value::symbol("undefined"),
    extra_args_ignored: "((lambda (a) a) 1 2 3)" => num(1.0),
    variadic_binding: "((lambda Args Args) 1 2 3)" => Value::list(vec![num(1.0), num(2.0), num(3.0)]),
    variadic_empty: "((lambda Args Args))" => Value::list(vec![]),
    closure_counter: "(begin (define make (lambda () (begin (define n 0) (lambda () (begin (set! n (+ n 1)) n))))) (define c (make)) (c) (c) (c))" => num(3.0),
    higher_order: "(begin (define compose (lambda (f g) (lambda (x) (f (g x))))) ((compose (lambda (x) (* x 2)) (lambda (x) (+ x 1))) 5))" => num(12.0),
    shadowing: "(begin (define x 1) ((lambda (x) x) 2))" => num(2.0),
    shadowing_leaves_outer: "(begin (define x 1) ((lambda (x) x) 2) x)" => num(1.0),
}

// ============================================================
// Captured environment identity
// ============================================================

#[test]
fn lambda_captures_definition_env() {
    let interp = lispy::Interpreter::new();
    let lam = interp
        .eval_str("(lambda (x) x)")
        .unwrap()
        .as_lambda_rc()
        .expect("lambda value");
    assert!(lispy::Env::same(&lam.env, interp.global_env()));
}

#[test]
fn empty_list_evaluates_to_itself() {
    assert_eq!(common::eval("()"), Value::list(vec![]));
}

// ============================================================
// Evaluation order
// ============================================================

eval_tests! {
    left_to_right_args: "(begin (define log '()) (define note (lambda (x) (begin (set! log (cons x log)) x))) ((lambda (a b c) log) (note 1) (note 2) (note 3)))"
        => Value::list(vec![num(3.0), num(2.0), num(1.0)]),
    begin_order: "(begin (define x 1) (set! x (+ x 10)) (set! x (* x 2)) x)" => num(22.0),
}
