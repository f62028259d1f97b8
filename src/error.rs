//! Error types for template parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::error::{Rich, RichPattern, RichReason};
use thiserror::Error;

use crate::parser::lexer::{ExprToken, LexError, Token};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Byte range the error points at
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. } => span,
        }
    }

    /// Build an error from a failed lexer match
    pub(crate) fn from_lex(err: &LexError, span: Span) -> Self {
        match err {
            LexError::Unterminated { open, close } => ParseError::Syntax {
                span,
                message: format!("unterminated `{}`", open),
                expected: vec![format!("`{}`", close)],
            },
            LexError::Unrecognized => ParseError::Syntax {
                span,
                message: "unrecognised input".to_string(),
                expected: Vec::new(),
            },
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                // ariadne addresses source by char, spans are bytes
                let span = char_offset(source, span.start)..char_offset(source, span.end);

                // Writing into a Vec cannot fail
                let _ = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Number of chars before byte offset `byte`
fn char_offset(source: &str, byte: usize) -> usize {
    source.char_indices().take_while(|(idx, _)| *idx < byte).count()
}

/// Shared conversion for both token languages
fn from_rich<T>(err: &Rich<'_, T>, describe: fn(&T) -> String) -> ParseError {
    let message = match err.reason() {
        RichReason::Custom(msg) => msg.to_string(),
        _ => {
            let found_str = match err.found() {
                Some(tok) => describe(tok),
                None => "end of input".to_string(),
            };
            format!("Unexpected {}", found_str)
        }
    };

    let expected: Vec<String> = err
        .expected()
        .filter_map(|e| match e {
            RichPattern::Token(tok) => Some(describe(&**tok)),
            RichPattern::Label(label) => Some(label.to_string()),
            RichPattern::EndOfInput => Some("end of input".to_string()),
            _ => None,
        })
        .collect();

    ParseError::Syntax {
        span: err.span().into_range(),
        message,
        expected,
    }
}

impl<'a> From<Rich<'a, Token>> for ParseError {
    fn from(err: Rich<'a, Token>) -> Self {
        from_rich(&err, format_token)
    }
}

impl<'a> From<Rich<'a, ExprToken>> for ParseError {
    fn from(err: Rich<'a, ExprToken>) -> Self {
        from_rich(&err, format_expr_token)
    }
}

/// Format a template token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Text(_) => "text".to_string(),
        Token::Echo(_) => "'{{ ... }}'".to_string(),
        Token::RawEcho(_) => "'{!! ... !!}'".to_string(),
        Token::Directive(d) => format!("directive '@{}'", d.name),
        Token::Comment => "comment".to_string(),
    }
}

/// Format an expression token for human-readable error messages
fn format_expr_token(tok: &ExprToken) -> String {
    match tok {
        ExprToken::Ident(s) => format!("identifier '{}'", s),
        ExprToken::Str(s) => format!("string \"{}\"", s),
        ExprToken::Integer(n) => format!("number {}", n),
        ExprToken::Float(n) => format!("number {}", n),
        ExprToken::True => "'true'".to_string(),
        ExprToken::False => "'false'".to_string(),
        ExprToken::Null => "'null'".to_string(),
        ExprToken::Coalesce => "'??'".to_string(),
        ExprToken::Pipe => "'|'".to_string(),
        ExprToken::Dot => "'.'".to_string(),
        ExprToken::Comma => "','".to_string(),
        ExprToken::Minus => "'-'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_includes_message_and_filename() {
        let err = ParseError::Syntax {
            span: 6..8,
            message: "unterminated `{{`".to_string(),
            expected: vec!["`}}`".to_string()],
        };
        let report = err.format("Hello {{ name", "greeting.html");
        assert!(report.contains("greeting.html"));
        assert!(report.contains("unterminated"));
        assert!(report.contains("Expected: `}}`"));
    }

    #[test]
    fn test_format_after_multibyte_text() {
        let source = "héllo wörld {{ x";
        let errors = crate::parser::parse(source).unwrap_err();
        let report = errors[0].format(source, "page.html");
        assert!(report.contains("wörld"), "missing snippet:\n{}", report);
        assert!(report.matches("unterminated").count() >= 2, "missing label:\n{}", report);
    }

    #[test]
    fn test_char_offset() {
        assert_eq!(char_offset("aé{{", 0), 0);
        assert_eq!(char_offset("aé{{", 3), 2);
        assert_eq!(char_offset("aé{{", 5), 4);
    }

    #[test]
    fn test_from_lex_unterminated() {
        let err = ParseError::from_lex(
            &LexError::Unterminated {
                open: "{!!",
                close: "!!}",
            },
            0..3,
        );
        assert_eq!(err.span(), &(0..3));
        assert!(err.to_string().contains("unterminated `{!!`"));
    }
}
