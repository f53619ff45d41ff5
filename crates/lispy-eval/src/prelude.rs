/// Bootstrap definitions evaluated into the root environment at startup.
/// Everything here is expressible with the core forms and the standard
/// procedures, and it doubles as an exercise of the extension surface
/// (macros building code with `list`/`quote`).
pub const PRELUDE: &str = r#"
;; (when c body) => (if c body nil)
(define when (macro (c body) (list 'if c body 'nil)))

;; (unless c body) => (if c nil body)
(define unless (macro (c body) (list 'if c 'nil body)))

;; aliases that read better in some programs
(define first car)
(define rest cdr)
(define second (lambda (xs) (car (cdr xs))))
(define identity (lambda (x) x))
(define inc (lambda (n) (+ n 1)))
(define dec (lambda (n) (- n 1)))
"#;
