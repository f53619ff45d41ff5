use lispy_core::{LispyError, Span, Value};

use crate::lexer::{tokenize, SpannedToken, Token};

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .or_else(|| self.tokens.last().map(|t| t.span))
            .unwrap_or_else(|| Span::point(0, 0))
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn parse_expr(&mut self) -> Result<Value, LispyError> {
        let span = self.span();
        match self.peek() {
            None => Err(LispyError::parser("unexpected end of input", span)),
            Some(Token::LParen) => self.parse_seq(Token::RParen, ")", None),
            Some(Token::LBracket) => self.parse_seq(Token::RBracket, "]", Some("list")),
            Some(Token::LBrace) => self.parse_seq(Token::RBrace, "}", Some("tuple")),
            Some(Token::Quote) => {
                self.advance();
                let inner = self.parse_expr().map_err(|_| {
                    LispyError::parser("quote (') requires an expression after it", span)
                })?;
                Ok(Value::list(vec![Value::symbol("quote"), inner]))
            }
            Some(_) => self.parse_atom(),
        }
    }

    /// Parse the inside of a `( … )`, `[ … ]` or `{ … }` form. The square
    /// and curly variants are sugar: they read as a list headed by the
    /// `list` / `tuple` symbol, which the standard library turns into the
    /// runtime value.
    fn parse_seq(
        &mut self,
        close: Token,
        close_text: &str,
        sugar_head: Option<&str>,
    ) -> Result<Value, LispyError> {
        let open_span = self.span();
        self.advance(); // opening punctuation
        let mut items = Vec::new();
        if let Some(head) = sugar_head {
            items.push(Value::symbol(head));
        }
        loop {
            match self.peek() {
                None => {
                    return Err(LispyError::parser(
                        format!("missing matching `{close_text}`"),
                        open_span,
                    ));
                }
                Some(tok) if *tok == close => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                Some(_) => items.push(self.parse_expr()?),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Value, LispyError> {
        let span = self.span();
        match self.advance() {
            Some(SpannedToken {
                token: Token::Str(s),
                ..
            }) => Ok(Value::string(s)),
            Some(SpannedToken {
                token: Token::Atom(atom),
                ..
            }) => read_atom(atom, span),
            Some(t) => {
                let name = match &t.token {
                    Token::RParen => "unexpected closing `)`",
                    Token::RBracket => "unexpected closing `]`",
                    Token::RBrace => "unexpected closing `}`",
                    _ => "unexpected token",
                };
                Err(LispyError::parser(name, span))
            }
            None => Err(LispyError::parser("unexpected end of input", span)),
        }
    }
}

/// Classify an atom token: a token that begins with a digit, or with `-`
/// followed by a digit, is a base-10 double; everything else is a symbol.
fn read_atom(atom: &str, span: Span) -> Result<Value, LispyError> {
    let mut chars = atom.chars();
    let first = chars.next();
    let numeric = match first {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => matches!(chars.next(), Some(c) if c.is_ascii_digit()),
        _ => false,
    };
    if numeric {
        atom.parse::<f64>()
            .map(Value::Number)
            .map_err(|_| LispyError::parser(format!("invalid number: {atom}"), span))
    } else {
        Ok(Value::symbol(atom))
    }
}

/// Read a single expression. Trailing input is an error.
pub fn read(source: &str) -> Result<Value, LispyError> {
    let mut parser = Parser::new(tokenize(source)?);
    let expr = parser.parse_expr()?;
    if !parser.at_end() {
        return Err(LispyError::parser(
            "unexpected input after expression",
            parser.span(),
        ));
    }
    Ok(expr)
}

/// Read a whole program as a sequence of expressions. A program with no
/// forms at all (only whitespace and comments) is a parse error.
pub fn read_many(source: &str) -> Result<Vec<Value>, LispyError> {
    let mut parser = Parser::new(tokenize(source)?);
    let mut exprs = Vec::new();
    while !parser.at_end() {
        exprs.push(parser.parse_expr()?);
    }
    if exprs.is_empty() {
        return Err(LispyError::parser("empty program", Span::point(1, 1)));
    }
    Ok(exprs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Value {
        Value::symbol(s)
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_read_application() {
        let expr = read("(+ 1 2)").unwrap();
        assert_eq!(expr, Value::list(vec![sym("+"), num(1.0), num(2.0)]));
    }

    #[test]
    fn test_read_nested() {
        let expr = read("(a (b c))").unwrap();
        assert_eq!(
            expr,
            Value::list(vec![sym("a"), Value::list(vec![sym("b"), sym("c")])])
        );
    }

    #[test]
    fn test_bracket_sugar() {
        let expr = read("[1 2]").unwrap();
        assert_eq!(expr, Value::list(vec![sym("list"), num(1.0), num(2.0)]));
    }

    #[test]
    fn test_brace_sugar() {
        let expr = read("{1 2}").unwrap();
        assert_eq!(expr, Value::list(vec![sym("tuple"), num(1.0), num(2.0)]));
    }

    #[test]
    fn test_quote_atom_and_form() {
        assert_eq!(
            read("'name").unwrap(),
            Value::list(vec![sym("quote"), sym("name")])
        );
        assert_eq!(
            read("'(1 2)").unwrap(),
            Value::list(vec![sym("quote"), Value::list(vec![num(1.0), num(2.0)])])
        );
        assert_eq!(
            read("' x").unwrap(),
            Value::list(vec![sym("quote"), sym("x")])
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(read("42").unwrap(), num(42.0));
        assert_eq!(read("-3.5").unwrap(), num(-3.5));
        assert_eq!(read("1.25").unwrap(), num(1.25));
        // a bare minus is a symbol, not a number
        assert_eq!(read("-").unwrap(), sym("-"));
    }

    #[test]
    fn test_invalid_number_is_error() {
        assert!(matches!(read("12abc"), Err(LispyError::Parser { .. })));
    }

    #[test]
    fn test_booleans_are_symbols() {
        // true/false/nil/undefined are resolved through the environment,
        // not read as literals
        assert_eq!(read("true").unwrap(), sym("true"));
        assert_eq!(read("nil").unwrap(), sym("nil"));
    }

    #[test]
    fn test_string() {
        assert_eq!(read(r#""hi there""#).unwrap(), Value::string("hi there"));
    }

    #[test]
    fn test_missing_closer() {
        assert!(matches!(read("(1 2"), Err(LispyError::Parser { .. })));
        assert!(matches!(read("[1 2"), Err(LispyError::Parser { .. })));
        assert!(matches!(read("{1 2"), Err(LispyError::Parser { .. })));
    }

    #[test]
    fn test_stray_closer() {
        assert!(matches!(read(")"), Err(LispyError::Parser { .. })));
    }

    #[test]
    fn test_empty_program() {
        assert!(matches!(
            read_many(";; nothing here\n   "),
            Err(LispyError::Parser { .. })
        ));
    }

    #[test]
    fn test_read_many() {
        let exprs = read_many("1 2 (3)").unwrap();
        assert_eq!(exprs.len(), 3);
        assert_eq!(exprs[2], Value::list(vec![num(3.0)]));
    }

    #[test]
    fn test_display_round_trip() {
        for src in ["(a 1 \"s\")", "(quote (1 2 3))", "(define f (lambda (x) (+ x 1)))"] {
            let expr = read(src).unwrap();
            let printed = format!("{expr}");
            assert_eq!(read(&printed).unwrap(), expr, "round trip for {src}");
        }
    }
}
