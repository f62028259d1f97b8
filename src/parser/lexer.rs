//! Lexers for heirloom templates using logos
//!
//! Templates are lexed in two stages. [`Token`] splits the raw template
//! into literal text, interpolations and directives; the source of each
//! interpolation or directive argument list is kept as an [`Embedded`]
//! slice and later lexed with [`ExprToken`].

use logos::{Lexer, Logos};

use crate::error::ParseError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Directives that take a parenthesised argument list
const ARGUMENT_DIRECTIVES: &[&str] = &["extends", "section", "yield", "include"];

/// Every directive name the grammar understands. Anything else after `@`
/// is literal text.
pub const DIRECTIVES: &[&str] = &[
    "extends",
    "section",
    "endsection",
    "append",
    "show",
    "yield",
    "include",
];

pub fn is_directive(name: &str) -> bool {
    DIRECTIVES.contains(&name)
}

/// Errors raised while splitting a template into tokens
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    #[default]
    Unrecognized,
    Unterminated {
        open: &'static str,
        close: &'static str,
    },
}

/// Expression source embedded in the template, with its absolute offset
#[derive(Debug, Clone, PartialEq)]
pub struct Embedded {
    pub text: String,
    pub offset: usize,
}

impl Embedded {
    pub fn span(&self) -> Span {
        self.offset..self.offset + self.text.len()
    }
}

/// `@name` optionally followed by `( ... )`
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub args: Option<Embedded>,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
pub enum Token {
    // Comments are dropped by `lex`
    #[token("{{--", comment)]
    Comment,

    #[token("{{", |lex| embedded(lex, "{{", "}}"))]
    Echo(Embedded),

    #[token("{!!", |lex| embedded(lex, "{!!", "!!}"))]
    RawEcho(Embedded),

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*", directive)]
    Directive(Directive),

    // `@@` escapes a literal at-sign; lone `{` and `@` are plain text
    #[token("@@", |_| "@".to_string())]
    #[token("{", |lex| lex.slice().to_string())]
    #[token("@", |lex| lex.slice().to_string())]
    #[regex(r"[^@{]+", |lex| lex.slice().to_string())]
    Text(String),
}

fn comment(lex: &mut Lexer<Token>) -> Result<(), LexError> {
    match lex.remainder().find("--}}") {
        Some(end) => {
            lex.bump(end + 4);
            Ok(())
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexError::Unterminated {
                open: "{{--",
                close: "--}}",
            })
        }
    }
}

fn embedded(
    lex: &mut Lexer<Token>,
    open: &'static str,
    close: &'static str,
) -> Result<Embedded, LexError> {
    let offset = lex.span().end;
    match lex.remainder().find(close) {
        Some(end) => {
            let text = lex.remainder()[..end].to_string();
            lex.bump(end + close.len());
            Ok(Embedded { text, offset })
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexError::Unterminated { open, close })
        }
    }
}

fn directive(lex: &mut Lexer<Token>) -> Result<Directive, LexError> {
    let name = lex.slice()[1..].to_string();
    if !ARGUMENT_DIRECTIVES.contains(&name.as_str()) {
        return Ok(Directive { name, args: None });
    }

    let rest = lex.remainder();
    let trimmed = rest.trim_start_matches([' ', '\t']);
    if !trimmed.starts_with('(') {
        return Ok(Directive { name, args: None });
    }

    let skipped = rest.len() - trimmed.len();
    let Some(close) = closing_paren(trimmed) else {
        lex.bump(rest.len());
        return Err(LexError::Unterminated {
            open: "(",
            close: ")",
        });
    };

    let args = Embedded {
        text: trimmed[1..close].to_string(),
        offset: lex.span().end + skipped + 1,
    };
    lex.bump(skipped + close + 1);
    Ok(Directive {
        name,
        args: Some(args),
    })
}

/// Byte index of the parenthesis closing the one at index 0, skipping
/// over quoted strings
fn closing_paren(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in src.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Lex a template into tokens with spans, dropping comments
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Vec<ParseError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(Token::Comment) => {}
            Ok(token) => tokens.push((token, span)),
            Err(err) => errors.push(ParseError::from_lex(&err, span)),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// Tokens of the expression language used inside `{{ }}` and directive
/// arguments
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum ExprToken {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
    Str(String),

    #[token("??")]
    Coalesce,
    #[token("|")]
    Pipe,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("-")]
    Minus,
}

/// Strip the quotes of a string literal and resolve backslash escapes
fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Lex an embedded expression; spans are absolute template offsets
pub fn lex_expression(src: &Embedded) -> Result<Vec<(ExprToken, Span)>, Vec<ParseError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in ExprToken::lexer(&src.text).spanned() {
        let span = span.start + src.offset..span.end + src.offset;
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => errors.push(ParseError::Syntax {
                span,
                message: "unrecognised character in expression".to_string(),
                expected: Vec::new(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    fn expr_tokens(input: &str) -> Vec<ExprToken> {
        let src = Embedded {
            text: input.to_string(),
            offset: 0,
        };
        lex_expression(&src)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            tokens("Hello, world"),
            vec![Token::Text("Hello, world".to_string())]
        );
    }

    #[test]
    fn test_echo_keeps_inner_source_and_offset() {
        let lexed = lex("ab{{ name }}").expect("Should lex");
        assert_eq!(lexed.len(), 2);
        match &lexed[1] {
            (Token::Echo(src), span) => {
                assert_eq!(src.text, " name ");
                assert_eq!(src.offset, 4);
                assert_eq!(span, &(2..12));
            }
            other => panic!("Expected echo, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_echo() {
        match &tokens("{!! body !!}")[0] {
            Token::RawEcho(src) => assert_eq!(src.text, " body "),
            other => panic!("Expected raw echo, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_dropped() {
        assert_eq!(
            tokens("a{{-- {{ hidden }} --}}b"),
            vec![Token::Text("a".to_string()), Token::Text("b".to_string())]
        );
    }

    #[test]
    fn test_directive_with_arguments() {
        match &tokens(r#"@section("title", "Home")"#)[0] {
            Token::Directive(d) => {
                assert_eq!(d.name, "section");
                let args = d.args.as_ref().expect("Should have arguments");
                assert_eq!(args.text, r#""title", "Home""#);
                assert_eq!(args.offset, 9);
            }
            other => panic!("Expected directive, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesis_inside_string_argument() {
        match &tokens(r#"@yield("a", "(x")rest"#)[..] {
            [Token::Directive(d), Token::Text(rest)] => {
                assert_eq!(d.args.as_ref().unwrap().text, r#""a", "(x""#);
                assert_eq!(rest, "rest");
            }
            other => panic!("Unexpected tokens {:?}", other),
        }
    }

    #[test]
    fn test_closing_directive_does_not_consume_parenthesis() {
        let toks = tokens("@endsection (note)");
        assert_eq!(
            toks,
            vec![
                Token::Directive(Directive {
                    name: "endsection".to_string(),
                    args: None
                }),
                Token::Text(" (note)".to_string()),
            ]
        );
    }

    #[test]
    fn test_escaped_at_and_lone_braces() {
        assert_eq!(
            tokens("@@ { x"),
            vec![
                Token::Text("@".to_string()),
                Token::Text(" ".to_string()),
                Token::Text("{".to_string()),
                Token::Text(" x".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_echo_is_error() {
        let errors = lex("before {{ name").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("{{"));
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        assert!(lex("{{-- never closed").is_err());
    }

    #[test]
    fn test_unbalanced_directive_arguments_is_error() {
        assert!(lex(r#"@yield("title""#).is_err());
    }

    #[test]
    fn test_expression_tokens() {
        assert_eq!(
            expr_tokens(r#"user.name | upper ?? 'anon' , 3 2.5 true"#),
            vec![
                ExprToken::Ident("user".to_string()),
                ExprToken::Dot,
                ExprToken::Ident("name".to_string()),
                ExprToken::Pipe,
                ExprToken::Ident("upper".to_string()),
                ExprToken::Coalesce,
                ExprToken::Str("anon".to_string()),
                ExprToken::Comma,
                ExprToken::Integer(3),
                ExprToken::Float(2.5),
                ExprToken::True,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            expr_tokens(r#""say \"hi\"\n""#),
            vec![ExprToken::Str("say \"hi\"\n".to_string())]
        );
    }

    #[test]
    fn test_expression_spans_are_absolute() {
        let src = Embedded {
            text: " x".to_string(),
            offset: 10,
        };
        let lexed = lex_expression(&src).expect("Should lex");
        assert_eq!(lexed[0].1, 11..12);
    }
}
