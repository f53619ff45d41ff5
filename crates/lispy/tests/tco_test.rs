mod common;

use lispy::Value;

fn num(n: f64) -> Value {
    Value::Number(n)
}

// ============================================================
// Tail-call elimination: these run with bounded host stack depth
// ============================================================

#[test]
fn self_tail_recursion_one_million() {
    let v = common::eval(
        "(begin \
           (define loop (lambda (n) (if (<= n 0) (quote done) (loop (- n 1))))) \
           (loop 1000000))",
    );
    assert_eq!(v, Value::symbol("done"));
}

#[test]
fn tail_recursion_through_begin() {
    let v = common::eval(
        "(begin \
           (define loop (lambda (n) (begin nil (if (<= n 0) 0 (loop (- n 1)))))) \
           (loop 200000))",
    );
    assert_eq!(v, num(0.0));
}

#[test]
fn mutual_tail_recursion() {
    let v = common::eval(
        "(begin \
           (define even2? (lambda (n) (if (= n 0) true (odd2? (- n 1))))) \
           (define odd2? (lambda (n) (if (= n 0) false (even2? (- n 1))))) \
           (even2? 100000))",
    );
    assert_eq!(v, Value::Bool(true));
}

#[test]
fn macro_expansion_is_a_tail_re_entry() {
    let v = common::eval(
        "(begin \
           (define loop-when (macro (c b) (list (quote if) c b (quote nil)))) \
           (define loop (lambda (n) (loop-when (> n 0) (loop (- n 1))))) \
           (loop 100000))",
    );
    assert_eq!(v, Value::Nil);
}

#[test]
fn try_handler_runs_in_tail_position() {
    let v = common::eval(
        "(begin \
           (define loop (lambda (n) (if (<= n 0) (quote ok) (try (error n) (lambda (e) (loop (- n 1))))))) \
           (loop 50000))",
    );
    assert_eq!(v, Value::symbol("ok"));
}

// ============================================================
// Scenario: tail-recursive factorial
// ============================================================

eval_tests! {
    factorial_accumulator: "(begin (define f (lambda (n a) (if (<= n 1) a (f (- n 1) (* n a))))) (f 10 1))" => num(3628800.0),
    countdown_small: "(begin (define f (lambda (n) (if (= n 0) (quote done) (f (- n 1))))) (f 100))" => Value::symbol("done"),
}
