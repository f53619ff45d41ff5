use lispy_core::{LispyError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Quote,
    /// A string literal with escapes already decoded.
    Str(String),
    /// Any other token; the reader classifies it as a number or symbol.
    Atom(String),
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

fn is_separator(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '{' | '}')
}

pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LispyError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    while i < chars.len() {
        let ch = chars[i];
        let span = Span::point(line, col);

        match ch {
            // Whitespace
            ' ' | '\t' | '\r' => {
                col += 1;
                i += 1;
            }
            '\n' => {
                line += 1;
                col = 1;
                i += 1;
            }

            // Comments: `;;` to end of line. A single `;` is an ordinary
            // token character.
            ';' if i + 1 < chars.len() && chars[i + 1] == ';' => {
                while i < chars.len() && chars[i] != '\n' && chars[i] != '\r' {
                    i += 1;
                }
            }

            // Punctuation
            '(' | ')' | '[' | ']' | '{' | '}' => {
                let token = match ch {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '{' => Token::LBrace,
                    _ => Token::RBrace,
                };
                col += 1;
                i += 1;
                tokens.push(SpannedToken { token, span });
            }

            // Quote prefix (or standalone quote)
            '\'' => {
                col += 1;
                i += 1;
                tokens.push(SpannedToken {
                    token: Token::Quote,
                    span,
                });
            }

            // Strings
            '"' => {
                let mut s = String::new();
                i += 1;
                col += 1;
                loop {
                    if i >= chars.len() {
                        return Err(LispyError::parser("unterminated string", span));
                    }
                    match chars[i] {
                        '"' => {
                            i += 1;
                            col += 1;
                            break;
                        }
                        '\\' => {
                            if i + 1 >= chars.len() {
                                return Err(LispyError::parser("unterminated string", span));
                            }
                            s.push(decode_escape(chars[i + 1]));
                            i += 2;
                            col += 2;
                        }
                        '\n' => {
                            s.push('\n');
                            i += 1;
                            line += 1;
                            col = 1;
                        }
                        c => {
                            s.push(c);
                            i += 1;
                            col += 1;
                        }
                    }
                }
                tokens.push(SpannedToken {
                    token: Token::Str(s),
                    span,
                });
            }

            // Everything else runs until whitespace or a separator.
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && !is_separator(chars[i]) {
                    i += 1;
                    col += 1;
                }
                let atom: String = chars[start..i].iter().collect();
                tokens.push(SpannedToken {
                    token: Token::Atom(atom),
                    span,
                });
            }
        }
    }

    Ok(tokens)
}

/// Decode a single backslash escape. Unknown escapes yield the escaped
/// character itself.
fn decode_escape(ch: char) -> char {
    match ch {
        't' => '\t',
        'v' => '\u{0B}',
        '0' => '\0',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'n' => '\n',
        'r' => '\r',
        '\'' => '\'',
        '"' => '"',
        '\\' => '\\',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_punctuation_and_atoms() {
        assert_eq!(
            toks("(+ 1 2)"),
            vec![
                Token::LParen,
                Token::Atom("+".into()),
                Token::Atom("1".into()),
                Token::Atom("2".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_brackets_and_braces() {
        assert_eq!(
            toks("[1] {2}"),
            vec![
                Token::LBracket,
                Token::Atom("1".into()),
                Token::RBracket,
                Token::LBrace,
                Token::Atom("2".into()),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            toks("1 ;; ignored (all of it\n2"),
            vec![Token::Atom("1".into()), Token::Atom("2".into())]
        );
    }

    #[test]
    fn test_single_semicolon_is_token_material() {
        assert_eq!(toks("a;b"), vec![Token::Atom("a;b".into())]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            toks(r#""a\tb\n\"q\"\\ \z""#),
            vec![Token::Str("a\tb\n\"q\"\\ z".into())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            tokenize("\"abc"),
            Err(LispyError::Parser { .. })
        ));
    }

    #[test]
    fn test_quote_prefix() {
        assert_eq!(
            toks("'foo '(1)"),
            vec![
                Token::Quote,
                Token::Atom("foo".into()),
                Token::Quote,
                Token::LParen,
                Token::Atom("1".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize("a\n  b").unwrap();
        assert_eq!(tokens[0].span, Span::point(1, 1));
        assert_eq!(tokens[1].span, Span::point(2, 3));
    }
}
