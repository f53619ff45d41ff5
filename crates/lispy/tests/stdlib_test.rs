mod common;

use lispy::Value;

fn num(n: f64) -> Value {
    Value::Number(n)
}

// ============================================================
// Lists and tuples
// ============================================================

eval_tests! {
    list_build: "(list 1 2 3)" => Value::list(vec![num(1.0), num(2.0), num(3.0)]),
    list_sugar: "[1 2 3]" => Value::list(vec![num(1.0), num(2.0), num(3.0)]),
    list_sugar_evaluates: "[(+ 1 1) 3]" => Value::list(vec![num(2.0), num(3.0)]),
    tuple_build: "(tuple 1 2)" => Value::tuple(vec![num(1.0), num(2.0)]),
    tuple_sugar: "{1 2}" => Value::tuple(vec![num(1.0), num(2.0)]),
    car_law: "(car (cons 9 '(1 2)))" => num(9.0),
    cdr_law: "(cdr (cons 9 '(1 2)))" => Value::list(vec![num(1.0), num(2.0)]),
    car_alias_head: "(head '(1 2))" => num(1.0),
    cdr_alias_tail: "(tail '(1 2))" => Value::list(vec![num(2.0)]),
    car_empty_soft: "(car '())" => Value::Undefined,
    cdr_empty: "(cdr '())" => Value::list(vec![]),
    cons_onto_nil: "(cons 1 nil)" => Value::list(vec![num(1.0)]),
    concat_lists: "(concat '(1) '(2 3) '())" => Value::list(vec![num(1.0), num(2.0), num(3.0)]),
    length_list: "(length '(1 2 3))" => num(3.0),
    length_string: "(length \"abcd\")" => num(4.0),
    length_tuple: "(length {1 2})" => num(2.0),
    index_hit: "(index '(a b c) 1)" => Value::symbol("b"),
    index_miss: "(index '(a) 5)" => Value::Undefined,
    index_tuple: "(index {7 8} 0)" => num(7.0),
    last_of: "(last '(1 2 3))" => num(3.0),
    last_empty: "(last '())" => Value::Undefined,
    slice_mid: "(slice '(1 2 3 4) 1 3)" => Value::list(vec![num(2.0), num(3.0)]),
    slice_open_end: "(slice '(1 2 3 4) 2)" => Value::list(vec![num(3.0), num(4.0)]),
    slice_clamped: "(slice '(1 2) 0 99)" => Value::list(vec![num(1.0), num(2.0)]),
    map_list: "(map (lambda (x) (* x x)) '(1 2 3))" => Value::list(vec![num(1.0), num(4.0), num(9.0)]),
    map_native: "(map to_s '(1))" => Value::list(vec![Value::string("1")]),
    reduce_sum: "(reduce + 0 '(1 2 3 4))" => num(10.0),
    reduce_with_lambda: "(reduce (lambda (acc x) (cons x acc)) '() '(1 2 3))" => Value::list(vec![num(3.0), num(2.0), num(1.0)]),
    each_returns_nil: "(each to_s '(1 2))" => Value::Nil,
    each_side_effects: "(begin (define n 0) (each (lambda (x) (set! n (+ n x))) '(1 2 3)) n)" => num(6.0),
}

eval_error_tests! {
    cons_non_list: "(cons 1 2)",
    car_non_list: "(car 5)",
    map_non_list: "(map to_s 5)",
}

// ============================================================
// Comparisons
// ============================================================

eval_tests! {
    lt: "(< 1 2)" => Value::Bool(true),
    lte: "(<= 2 2)" => Value::Bool(true),
    gt: "(> 3 2)" => Value::Bool(true),
    gte_false: "(>= 1 2)" => Value::Bool(false),
    eq_numbers: "(= 42 42)" => Value::Bool(true),
    eq_symbols_by_name: "(= 'a 'a)" => Value::Bool(true),
    eq_lists_by_value: "(= '(1 2) '(1 2))" => Value::Bool(true),
    neq: "(!= 1 2)" => Value::Bool(true),
    strict_numbers: "(=== 1 1)" => Value::Bool(true),
    strict_lists_differ: "(=== '(1) '(1))" => Value::Bool(false),
    strict_same_ref: "(begin (define xs '(1)) (=== xs xs))" => Value::Bool(true),
    strict_neq: "(!== '(1) '(1))" => Value::Bool(true),
    strict_strings: "(=== \"a\" \"a\")" => Value::Bool(true),
}

// ============================================================
// Logic and predicates
// ============================================================

eval_tests! {
    not_false: "(not false)" => Value::Bool(true),
    not_zero: "(not 0)" => Value::Bool(false),
    and_all: "(and 1 2 3)" => num(3.0),
    and_stops: "(and 1 false 3)" => Value::Bool(false),
    and_empty: "(and)" => Value::Bool(true),
    or_first_truthy: "(or false nil 3)" => Value::Nil,
    or_none: "(or false false)" => Value::Bool(false),
    or_empty: "(or)" => Value::Bool(false),
    pred_list: "(list? '(1))" => Value::Bool(true),
    pred_list_not: "(list? 1)" => Value::Bool(false),
    pred_null_empty: "(null? '())" => Value::Bool(true),
    pred_null_nil: "(null? nil)" => Value::Bool(true),
    pred_null_undefined: "(null? undefined)" => Value::Bool(true),
    pred_null_not: "(null? '(1))" => Value::Bool(false),
    pred_number: "(number? 1.5)" => Value::Bool(true),
    pred_symbol: "(symbol? 'a)" => Value::Bool(true),
    pred_lambda: "(lambda? (lambda (x) x))" => Value::Bool(true),
    pred_macro: "(macro? (macro (x) x))" => Value::Bool(true),
    pred_procedure: "(procedure? car)" => Value::Bool(true),
    pred_procedure_sproc: "(procedure? env:current)" => Value::Bool(true),
    pred_procedure_not_lambda: "(procedure? (lambda (x) x))" => Value::Bool(false),
    typeof_number: "(typeof 1)" => Value::symbol("number"),
    typeof_nil: "(typeof nil)" => Value::symbol("nil"),
    typeof_undefined: "(typeof undefined)" => Value::symbol("undefined"),
    typeof_string: "(typeof \"s\")" => Value::symbol("string"),
    typeof_symbol: "(typeof 'a)" => Value::symbol("symbol"),
    typeof_list: "(typeof '())" => Value::symbol("list"),
    typeof_tuple: "(typeof {1})" => Value::symbol("tuple"),
    typeof_dict: "(typeof (dict:new))" => Value::symbol("object"),
    typeof_lambda: "(typeof (lambda (x) x))" => Value::symbol("lambda"),
    typeof_macro: "(typeof (macro (x) x))" => Value::symbol("macro"),
    typeof_proc: "(typeof car)" => Value::symbol("proc"),
    typeof_sproc: "(typeof env:current)" => Value::symbol("sproc"),
}

// ============================================================
// Conversions and printing forms
// ============================================================

eval_tests! {
    to_s_number: "(to_s 6)" => Value::string("6"),
    to_s_string_bare: "(to_s \"hi\")" => Value::string("hi"),
    to_string_default_bare: "(to_string \"hi\")" => Value::string("hi"),
    to_string_withquotes: "(to_string \"hi\" true)" => Value::string("\"hi\""),
    to_string_list: "(to_string '(1 \"a\" b) true)" => Value::string("(1 \"a\" b)"),
    to_string_tuple: "(to_string {1 2} true)" => Value::string("{1 2}"),
    to_string_nil: "(to_string nil)" => Value::string("nil"),
    to_string_undefined: "(to_string undefined)" => Value::string("undefined"),
    to_string_symbol: "(to_string 'abc)" => Value::string("abc"),
    inspect_string_quoted: "(inspect \"hi\")" => Value::string("\"hi\""),
}

// ============================================================
// Dicts
// ============================================================

eval_tests! {
    dict_new_get: "(dict:get (dict:new \"a\" 1) \"a\")" => num(1.0),
    dict_symbol_keys_coerce: "(dict:get (dict:new 'a 1) \"a\")" => num(1.0),
    dict_get_missing: "(dict:get (dict:new) \"a\")" => Value::Undefined,
    dict_set_mutates: "(begin (define d (dict:new)) (dict:set d \"a\" 1) (dict:get d \"a\"))" => num(1.0),
    dict_set_returns_value: "(dict:set (dict:new) \"a\" 9)" => num(9.0),
    dict_shared_mutation: "(begin (define d (dict:new)) (define d2 d) (dict:set d \"k\" 1) (dict:get d2 \"k\"))" => num(1.0),
    dict_key_yes: "(dict:key? (dict:new \"a\" 1) \"a\")" => Value::Bool(true),
    dict_key_no: "(dict:key? (dict:new) \"a\")" => Value::Bool(false),
    dict_keys: "(dict:keys (dict:new \"b\" 2 \"a\" 1))" => Value::list(vec![Value::string("a"), Value::string("b")]),
    dict_update_bulk: "(begin (define d (dict:new)) (dict:update d '(\"a\" \"b\") '(1 2)) (dict:get d \"b\"))" => num(2.0),
    dict_member_read: "((dict:new \"a\" 7) 'a)" => num(7.0),
    dict_member_call: "(begin (define d (dict:new \"dbl\" (lambda (n) (* n 2)))) (d 'dbl 21))" => num(42.0),
}

eval_error_tests! {
    dict_new_odd_args: "(dict:new \"a\")",
    dict_member_missing: "((dict:new) 'nope)",
    dict_member_not_callable_with_args: "((dict:new \"a\" 1) 'a 2)",
}

// ============================================================
// Kernel
// ============================================================

eval_tests! {
    kernel_debug_off_by_default: "(kernel:debug?)" => Value::Bool(false),
    kernel_debug_roundtrip: "(begin (kernel:debug true) (define on (kernel:debug?)) (kernel:debug false) on)" => Value::Bool(true),
    kernel_stats_has_envs: "(> (dict:get (kernel:stats) \"environments\") 0)" => Value::Bool(true),
}
