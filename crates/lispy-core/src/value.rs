use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap as SpurMap;
use lasso::{Rodeo, Spur};

use crate::error::LispyError;

// ── String interning ──────────────────────────────────────────────

thread_local! {
    static INTERNER: RefCell<Rodeo> = RefCell::new(Rodeo::default());
    static ENV_COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Intern a string, returning a Spur key.
pub fn intern(s: &str) -> Spur {
    INTERNER.with(|r| r.borrow_mut().get_or_intern(s))
}

/// Resolve a Spur key back to a String.
pub fn resolve(spur: Spur) -> String {
    INTERNER.with(|r| r.borrow().resolve(&spur).to_string())
}

/// Resolve a Spur and call f with the &str, avoiding allocation.
pub fn with_resolved<F, R>(spur: Spur, f: F) -> R
where
    F: FnOnce(&str) -> R,
{
    INTERNER.with(|r| {
        let interner = r.borrow();
        f(interner.resolve(&spur))
    })
}

/// Number of distinct symbols interned so far.
pub fn interner_len() -> usize {
    INTERNER.with(|r| r.borrow().len())
}

/// Number of environments created on this thread.
pub fn env_count() -> u64 {
    ENV_COUNTER.with(|c| c.get())
}

// ── Supporting types ──────────────────────────────────────────────

/// Parameter specification of a lambda or macro: a single symbol binds
/// the whole argument list; a fixed list binds positionally.
#[derive(Debug, Clone)]
pub enum Params {
    Variadic(Spur),
    Fixed(Vec<Spur>),
}

impl Params {
    /// Parse a `lambda`/`macro` parameter form: a bare symbol or a list
    /// of symbols.
    pub fn parse(form: &Value) -> Result<Params, LispyError> {
        match form {
            Value::Symbol(spur) => Ok(Params::Variadic(*spur)),
            Value::List(items) => {
                let names: Vec<Spur> = items
                    .iter()
                    .map(|v| {
                        v.as_symbol_spur().ok_or_else(|| {
                            LispyError::invalid_argument(format!(
                                "parameter must be a symbol, got {}",
                                v.type_name()
                            ))
                        })
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Params::Fixed(names))
            }
            other => Err(LispyError::invalid_argument(format!(
                "parameters must be a symbol or a list of symbols, got {}",
                other.type_name()
            ))),
        }
    }

    /// Render back as an expression: the symbol, or the list of symbols.
    pub fn to_value(&self) -> Value {
        match self {
            Params::Variadic(spur) => Value::Symbol(*spur),
            Params::Fixed(names) => {
                Value::list(names.iter().map(|s| Value::Symbol(*s)).collect())
            }
        }
    }
}

/// A user-defined procedure: parameters, a single body expression and the
/// environment captured at the `(lambda ...)` site.
#[derive(Clone)]
pub struct Lambda {
    pub params: Params,
    pub body: Value,
    pub env: Env,
}

/// Like `Lambda`, but applied to unevaluated operands; the body's value is
/// re-evaluated in the caller's environment.
#[derive(Clone)]
pub struct Macro {
    pub params: Params,
    pub body: Value,
    pub env: Env,
}

/// A host procedure callable from Lispy: receives evaluated arguments.
pub struct NativeFn {
    pub name: String,
    pub func: Box<dyn Fn(&[Value]) -> Result<Value, LispyError>>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Result<Value, LispyError> + 'static,
    ) -> Self {
        NativeFn {
            name: name.into(),
            func: Box::new(f),
        }
    }
}

/// A host procedure that additionally observes the caller's environment
/// (the hook behind `env:current`, `eval` and friends).
pub struct SpecialFn {
    pub name: String,
    pub func: Box<dyn Fn(&[Value], &Env) -> Result<Value, LispyError>>,
}

impl SpecialFn {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&[Value], &Env) -> Result<Value, LispyError> + 'static,
    ) -> Self {
        SpecialFn {
            name: name.into(),
            func: Box::new(f),
        }
    }
}

/// The payload carried by a raised error: a taxonomy tag, a human message
/// and optional stack/code/data fields exposed through the `error:*`
/// accessors.
#[derive(Debug, Clone)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
    pub code: Option<String>,
    pub data: Option<Value>,
}

impl ErrorValue {
    pub fn custom(name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorValue {
            name: name.into(),
            message: message.into(),
            stack: None,
            code: None,
            data: None,
        }
    }
}

// ── The Value type ────────────────────────────────────────────────

/// The tagged value universe. One enum, exhaustive matches at every
/// dispatch site.
#[derive(Clone)]
pub enum Value {
    Nil,
    Undefined,
    Bool(bool),
    Number(f64),
    String(Rc<String>),
    Symbol(Spur),
    List(Rc<Vec<Value>>),
    Tuple(Rc<Vec<Value>>),
    Dict(Rc<RefCell<BTreeMap<String, Value>>>),
    Lambda(Rc<Lambda>),
    Macro(Rc<Macro>),
    NativeFn(Rc<NativeFn>),
    SpecialFn(Rc<SpecialFn>),
    Env(Env),
    Error(Rc<ErrorValue>),
}

// ── Constructors ──────────────────────────────────────────────────

impl Value {
    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn undefined() -> Value {
        Value::Undefined
    }

    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn number(n: f64) -> Value {
        Value::Number(n)
    }

    pub fn string(s: &str) -> Value {
        Value::String(Rc::new(s.to_string()))
    }

    pub fn string_from(s: String) -> Value {
        Value::String(Rc::new(s))
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(intern(s))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn dict(entries: BTreeMap<String, Value>) -> Value {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn lambda(l: Lambda) -> Value {
        Value::Lambda(Rc::new(l))
    }

    pub fn macro_val(m: Macro) -> Value {
        Value::Macro(Rc::new(m))
    }

    pub fn native_fn(f: NativeFn) -> Value {
        Value::NativeFn(Rc::new(f))
    }

    pub fn special_fn(f: SpecialFn) -> Value {
        Value::SpecialFn(Rc::new(f))
    }

    pub fn error(e: ErrorValue) -> Value {
        Value::Error(Rc::new(e))
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "object",
            Value::Lambda(_) => "lambda",
            Value::Macro(_) => "macro",
            Value::NativeFn(_) => "proc",
            Value::SpecialFn(_) => "sproc",
            Value::Env(_) => "environment",
            Value::Error(_) => "error",
        }
    }

    /// The only non-truthy value is `false`. `nil`, `0`, `""` and the
    /// empty list are all truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Lambda(_) | Value::NativeFn(_) | Value::SpecialFn(_)
        )
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol_spur(&self) -> Option<Spur> {
        match self {
            Value::Symbol(spur) => Some(*spur),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<String> {
        self.as_symbol_spur().map(resolve)
    }

    /// Interpret a symbol or string as a binding name. This is the
    /// coercion used by `define`, `env:*`, member invocation and the
    /// `error:custom` tag.
    pub fn as_name_spur(&self) -> Option<Spur> {
        match self {
            Value::Symbol(spur) => Some(*spur),
            Value::String(s) => Some(intern(s)),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_rc(&self) -> Option<Rc<Vec<Value>>> {
        match self {
            Value::List(items) => Some(Rc::clone(items)),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Rc<RefCell<BTreeMap<String, Value>>>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_lambda_rc(&self) -> Option<Rc<Lambda>> {
        match self {
            Value::Lambda(l) => Some(Rc::clone(l)),
            _ => None,
        }
    }

    pub fn as_macro_rc(&self) -> Option<Rc<Macro>> {
        match self {
            Value::Macro(m) => Some(Rc::clone(m)),
            _ => None,
        }
    }

    pub fn as_env(&self) -> Option<&Env> {
        match self {
            Value::Env(env) => Some(env),
            _ => None,
        }
    }

    pub fn as_error_rc(&self) -> Option<Rc<ErrorValue>> {
        match self {
            Value::Error(e) => Some(Rc::clone(e)),
            _ => None,
        }
    }

    /// Identity-style comparison backing `===`: value comparison for
    /// scalars, symbols and strings; pointer identity for everything
    /// that lives on the heap.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Macro(a), Value::Macro(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFn(a), Value::NativeFn(b)) => Rc::ptr_eq(a, b),
            (Value::SpecialFn(a), Value::SpecialFn(b)) => Rc::ptr_eq(a, b),
            (Value::Env(a), Value::Env(b)) => Env::same(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The unquoted rendering used by `to_s`, `to_string` and `print`:
    /// a top-level string prints its raw content, everything else prints
    /// its reader-syntax form.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => format!("{other}"),
        }
    }
}

// ── PartialEq (value equality, backing `=`) ───────────────────────

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            // Two symbols are equal iff their names match.
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Macro(a), Value::Macro(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFn(a), Value::NativeFn(b)) => Rc::ptr_eq(a, b),
            (Value::SpecialFn(a), Value::SpecialFn(b)) => Rc::ptr_eq(a, b),
            (Value::Env(a), Value::Env(b)) => Env::same(a, b),
            (Value::Error(a), Value::Error(b)) => {
                a.name == b.name && a.message == b.message
            }
            _ => false,
        }
    }
}

// ── Display ───────────────────────────────────────────────────────

/// Render a double the way the reader would accept it back: whole values
/// print without a fractional part.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

/// Write a string literal the reader will take back verbatim.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            '\0' => write!(f, "\\0")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value], open: char, close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => write_quoted(f, s),
            Value::Symbol(spur) => with_resolved(*spur, |name| write!(f, "{name}")),
            Value::List(items) => write_seq(f, items, '(', ')'),
            Value::Tuple(items) => write_seq(f, items, '{', '}'),
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write_quoted(f, k)?;
                    write!(f, " {v}")?;
                }
                write!(f, "}}")
            }
            Value::Lambda(_) => write!(f, "<lambda>"),
            Value::Macro(_) => write!(f, "<macro>"),
            Value::NativeFn(n) => write!(f, "<proc {}>", n.name),
            Value::SpecialFn(n) => write!(f, "<sproc {}>", n.name),
            Value::Env(env) => write!(f, "<environment ({} members)>", env.len()),
            Value::Error(e) => write!(f, "<error {}: {}>", e.name, e.message),
        }
    }
}

// ── Debug ─────────────────────────────────────────────────────────

// Manual impl: closures reference their captured environment, which may in
// turn hold the closure, so Debug must not recurse through Lambda/Env.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Undefined => write!(f, "Undefined"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({:?})", &**s),
            Value::Symbol(spur) => with_resolved(*spur, |name| write!(f, "Symbol({name})")),
            Value::List(items) => write!(f, "List({items:?})"),
            Value::Tuple(items) => write!(f, "Tuple({items:?})"),
            Value::Dict(entries) => write!(f, "Dict({} entries)", entries.borrow().len()),
            Value::Lambda(_) => write!(f, "Lambda(<closure>)"),
            Value::Macro(_) => write!(f, "Macro(<closure>)"),
            Value::NativeFn(n) => write!(f, "NativeFn({})", n.name),
            Value::SpecialFn(n) => write!(f, "SpecialFn({})", n.name),
            Value::Env(env) => write!(f, "Env({} members)", env.len()),
            Value::Error(e) => write!(f, "Error({}: {})", e.name, e.message),
        }
    }
}

// ── Env ───────────────────────────────────────────────────────────

/// A lexical environment: a mutable member map plus an optional parent.
/// Clones share the member map, so a cloned `Env` is the *same*
/// environment for identity purposes.
#[derive(Clone)]
pub struct Env {
    pub members: Rc<RefCell<SpurMap<Spur, Value>>>,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        ENV_COUNTER.with(|c| c.set(c.get() + 1));
        Env {
            members: Rc::new(RefCell::new(SpurMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Env>) -> Self {
        ENV_COUNTER.with(|c| c.set(c.get() + 1));
        Env {
            members: Rc::new(RefCell::new(SpurMap::new())),
            parent: Some(parent),
        }
    }

    /// Two `Env` handles denote the same environment iff they share the
    /// member map.
    pub fn same(a: &Env, b: &Env) -> bool {
        Rc::ptr_eq(&a.members, &b.members)
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// True iff the name is visible from this environment (walks parents).
    pub fn present(&self, name: Spur) -> bool {
        if self.members.borrow().contains_key(&name) {
            true
        } else if let Some(parent) = &self.parent {
            parent.present(name)
        } else {
            false
        }
    }

    pub fn get(&self, name: Spur) -> Option<Value> {
        if let Some(val) = self.members.borrow().get(&name) {
            Some(val.clone())
        } else if let Some(parent) = &self.parent {
            parent.get(name)
        } else {
            None
        }
    }

    pub fn get_str(&self, name: &str) -> Option<Value> {
        self.get(intern(name))
    }

    /// Bind a name in *this* environment, shadowing any parent binding.
    pub fn define(&self, name: Spur, val: Value) {
        self.members.borrow_mut().insert(name, val);
    }

    pub fn define_str(&self, name: &str, val: Value) {
        self.define(intern(name), val);
    }

    /// Assign to the nearest enclosing binding of `name` (for `set!`).
    /// Returns false if no binding exists anywhere on the chain; never
    /// creates a binding.
    pub fn set_existing(&self, name: Spur, val: Value) -> bool {
        let mut members = self.members.borrow_mut();
        if let Some(entry) = members.get_mut(&name) {
            *entry = val;
            true
        } else {
            drop(members);
            if let Some(parent) = &self.parent {
                parent.set_existing(name, val)
            } else {
                false
            }
        }
    }

    /// Bulk local define: bind names to values pairwise in this
    /// environment. Missing values become `Undefined`.
    pub fn update(&self, names: &[Spur], values: &[Value]) {
        let mut members = self.members.borrow_mut();
        for (i, name) in names.iter().enumerate() {
            let val = values.get(i).cloned().unwrap_or(Value::Undefined);
            members.insert(*name, val);
        }
    }

    /// All visible names, innermost scope first. Shadowed names appear
    /// once per scope that binds them.
    pub fn keys(&self) -> Vec<Spur> {
        let mut out: Vec<Spur> = self.members.borrow().keys().copied().collect();
        out.sort_by(|a, b| with_resolved(*a, |an| with_resolved(*b, |bn| an.cmp(bn))));
        if let Some(parent) = &self.parent {
            out.extend(parent.keys());
        }
        out
    }

    pub fn parent(&self) -> Option<Rc<Env>> {
        self.parent.clone()
    }

    /// The root of the chain (the standard environment, normally).
    pub fn top_level(&self) -> Env {
        let mut current = self.clone();
        while let Some(parent) = current.parent.clone() {
            current = (*parent).clone();
        }
        current
    }

    /// Debug rendering of the whole chain, innermost scope first.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let mut names: Vec<String> = env
                .members
                .borrow()
                .keys()
                .map(|spur| resolve(*spur))
                .collect();
            names.sort();
            out.push_str(&format!(
                "#{depth} ({} members): {}\n",
                names.len(),
                names.join(" ")
            ));
            current = env.parent.as_ref().map(|p| (**p).clone());
            depth += 1;
        }
        out
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Env({} members, {})",
            self.len(),
            if self.parent.is_some() {
                "chained"
            } else {
                "root"
            }
        )
    }
}

/// Bind parameters to arguments in a fresh child of `parent`: a variadic
/// symbol takes the whole list; fixed parameters bind pairwise, missing
/// positions become `Undefined` and extra arguments are ignored.
pub fn bind_params(params: &Params, args: &[Value], parent: Rc<Env>) -> Env {
    let env = Env::with_parent(parent);
    match params {
        Params::Variadic(name) => {
            env.define(*name, Value::list(args.to_vec()));
        }
        Params::Fixed(names) => {
            for (i, name) in names.iter().enumerate() {
                env.define(*name, args.get(i).cloned().unwrap_or(Value::Undefined));
            }
        }
    }
    env
}

// ── Tests ─────────────────────────────────────────────────────────
