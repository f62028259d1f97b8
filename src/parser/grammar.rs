//! Parser implementation using chumsky

use chumsky::input::{Emitter, Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Embedded, ExprToken, Token};

/// Parse template source into an AST
pub fn parse(input: &str) -> Result<Document, Vec<ParseError>> {
    let len = input.len();

    let token_iter = lexer::lex(input)?
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map(|nodes| Document { nodes })
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Parse a comma-separated list of expressions (directive arguments)
pub fn parse_arguments(src: &Embedded) -> Result<Vec<Spanned<Expr>>, Vec<ParseError>> {
    let end = src.offset + src.text.len();

    let token_iter = lexer::lex_expression(src)?
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter).map((end..end).into(), |(t, s): (_, _)| (t, s));

    argument_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Parse exactly one expression (interpolation body)
pub fn parse_expression(src: &Embedded) -> Result<Spanned<Expr>, Vec<ParseError>> {
    let mut exprs = parse_arguments(src)?;
    if exprs.len() == 1 {
        Ok(exprs.remove(0))
    } else {
        Err(vec![ParseError::Syntax {
            span: src.span(),
            message: format!("expected a single expression, found {}", exprs.len()),
            expected: vec!["expression".to_string()],
        }])
    }
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Report nested expression errors against the template parser
fn lift<'a>(errors: Vec<ParseError>, emitter: &mut Emitter<Rich<'a, Token>>) {
    for error in errors {
        let ParseError::Syntax { span, message, .. } = error;
        emitter.emit(Rich::custom(span.into(), message));
    }
}

/// Report a failed check, leaving an empty text node in its place
fn checked<'a>(result: Result<Node, Rich<'a, Token>>, emitter: &mut Emitter<Rich<'a, Token>>) -> Node {
    result.unwrap_or_else(|err| {
        emitter.emit(err);
        Node::Text(String::new())
    })
}

fn argument_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<Expr>>, extra::Err<Rich<'a, ExprToken>>> + Clone
where
    I: ValueInput<'a, Token = ExprToken, Span = SimpleSpan>,
{
    let ident = select! {
        ExprToken::Ident(s) => s,
    };

    let literal = choice((
        select! {
            ExprToken::Str(s) => Literal::String(s),
            ExprToken::Integer(n) => Literal::Integer(n),
            ExprToken::Float(n) => Literal::Float(n),
            ExprToken::True => Literal::Bool(true),
            ExprToken::False => Literal::Bool(false),
            ExprToken::Null => Literal::Null,
        },
        just(ExprToken::Minus).ignore_then(select! {
            ExprToken::Integer(n) => Literal::Integer(-n),
            ExprToken::Float(n) => Literal::Float(-n),
        }),
    ))
    .map(Expr::Literal);

    // Path segments after the first may be array indices: items.0
    let segment = choice((
        ident.clone(),
        select! { ExprToken::Integer(n) => n.to_string() },
    ));

    let path = ident
        .clone()
        .then(
            just(ExprToken::Dot)
                .ignore_then(segment)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(head, rest)| Expr::Path(std::iter::once(head).chain(rest).collect()));

    let atom = choice((literal, path)).map_with(|expr, e| Spanned::new(expr, span_range(&e.span())));

    let filter = ident
        .try_map(|name, span| {
            Filter::from_name(&name)
                .ok_or_else(|| Rich::custom(span, format!("unknown filter '{}'", name)))
        })
        .map_with(|f, e| Spanned::new(f, span_range(&e.span())));

    let filtered = atom
        .then(
            just(ExprToken::Pipe)
                .ignore_then(filter)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(expr, filters)| {
            filters.into_iter().fold(expr, |expr, filter| {
                let span = expr.span.start..filter.span.end;
                Spanned::new(
                    Expr::Filter {
                        expr: Box::new(expr),
                        filter,
                    },
                    span,
                )
            })
        });

    let expr = filtered
        .clone()
        .then(
            just(ExprToken::Coalesce)
                .ignore_then(filtered)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(first, rest)| {
            rest.into_iter().fold(first, |value, fallback| {
                let span = value.span.start..fallback.span.end;
                Spanned::new(
                    Expr::Coalesce {
                        value: Box::new(value),
                        fallback: Box::new(fallback),
                    },
                    span,
                )
            })
        });

    expr.separated_by(just(ExprToken::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

/// A known directive with its parsed arguments; `None` once an error has
/// been reported for it
fn directive<'a, I>(
    name: &'static str,
) -> impl Parser<'a, I, Option<Vec<Spanned<Expr>>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! {
        Token::Directive(d) if d.name == name => d,
    }
    .validate(move |d, e, emitter| match d.args {
        Some(src) => match parse_arguments(&src) {
            Ok(args) => Some(args),
            Err(errors) => {
                lift(errors, emitter);
                None
            }
        },
        None => {
            emitter.emit(Rich::custom(
                e.span(),
                format!("@{} requires arguments", name),
            ));
            None
        }
    })
}

/// Section, yield and include names must be string literals
fn literal_name<'a>(arg: Spanned<Expr>, directive: &str) -> Result<Spanned<String>, Rich<'a, Token>> {
    match arg.node {
        Expr::Literal(Literal::String(name)) if !name.is_empty() => Ok(Spanned::new(name, arg.span)),
        _ => Err(Rich::custom(
            arg.span.into(),
            format!("@{} expects a non-empty string literal name", directive),
        )),
    }
}

fn single_name<'a>(
    args: Vec<Spanned<Expr>>,
    directive: &str,
    span: SimpleSpan,
) -> Result<Spanned<String>, Rich<'a, Token>> {
    let [name] = <[Spanned<Expr>; 1]>::try_from(args).map_err(|_| arity(directive, "1", span))?;
    literal_name(name, directive)
}

fn inline_section_node<'a>(args: Vec<Spanned<Expr>>, span: SimpleSpan) -> Result<Node, Rich<'a, Token>> {
    let [name, value] =
        <[Spanned<Expr>; 2]>::try_from(args).map_err(|_| arity("section", "1 or 2", span))?;
    Ok(Node::InlineSection {
        name: literal_name(name, "section")?,
        value,
    })
}

fn yield_node<'a>(args: Vec<Spanned<Expr>>, span: SimpleSpan) -> Result<Node, Rich<'a, Token>> {
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(name), default, None) => Ok(Node::Yield {
            name: literal_name(name, "yield")?,
            default,
        }),
        _ => Err(arity("yield", "1 or 2", span)),
    }
}

fn arity<'a>(directive: &str, expected: &str, span: SimpleSpan) -> Rich<'a, Token> {
    Rich::custom(
        span,
        format!("@{} takes {} argument(s)", directive, expected),
    )
}

fn template_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<Node>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Unknown `@words` are kept as literal text
    let text = select! {
        Token::Text(s) => s,
        Token::Directive(d) if !lexer::is_directive(&d.name) => format!("@{}", d.name),
    }
    .map(Node::Text);

    let echo = select! {
        Token::Echo(src) => (src, true),
        Token::RawEcho(src) => (src, false),
    }
    .validate(|(src, escape), _, emitter| match parse_expression(&src) {
        Ok(expr) => Node::Echo(Echo { expr, escape }),
        Err(errors) => {
            lift(errors, emitter);
            Node::Text(String::new())
        }
    });

    let extends = directive("extends").validate(|args, e, emitter| match args {
        Some(args) => checked(single_name(args, "extends", e.span()).map(Node::Extends), emitter),
        None => Node::Text(String::new()),
    });

    let include = directive("include").validate(|args, e, emitter| match args {
        Some(args) => checked(single_name(args, "include", e.span()).map(Node::Include), emitter),
        None => Node::Text(String::new()),
    });

    let yield_block = directive("yield").validate(|args, e, emitter| match args {
        Some(args) => checked(yield_node(args, e.span()), emitter),
        None => Node::Text(String::new()),
    });

    // Every @section except the single-argument block form
    let inline_section = directive("section")
        .try_map(|args, span| match args {
            Some(args) if args.len() == 1 => Err(arity("section", "2", span)),
            args => Ok(args),
        })
        .validate(|args, e, emitter| match args {
            Some(args) => checked(inline_section_node(args, e.span()), emitter),
            None => Node::Text(String::new()),
        });

    // @section("name") opening a body
    let section_open = directive("section").validate(|args, e, emitter| {
        let placeholder = Spanned::new(String::new(), span_range(&e.span()));
        match args {
            Some(args) => single_name(args, "section", e.span()).unwrap_or_else(|err| {
                emitter.emit(err);
                placeholder
            }),
            None => placeholder,
        }
    });

    let section_end = select! {
        Token::Directive(d) if d.name == "endsection" => SectionEnd::Overwrite,
        Token::Directive(d) if d.name == "append" => SectionEnd::Append,
        Token::Directive(d) if d.name == "show" => SectionEnd::Show,
    };

    let node = recursive(|node| {
        let section = section_open
            .then(node.repeated().collect::<Vec<_>>())
            .then(section_end)
            .map(|((name, body), end)| {
                Node::Section(Section {
                    name,
                    body: coalesce_text(body),
                    end,
                })
            });

        // Order matters: the inline form of @section must be tried before
        // the block form, both start with the same directive token
        choice((
            text,
            echo,
            extends,
            include,
            yield_block,
            inline_section,
            section,
        ))
        .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
        .boxed()
    });

    node.repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(coalesce_text)
}

/// Merge runs of adjacent text nodes into one
fn coalesce_text(nodes: Vec<Spanned<Node>>) -> Vec<Spanned<Node>> {
    let mut merged: Vec<Spanned<Node>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(last), Node::Text(next)) = (merged.last_mut(), &node.node) {
            if let Node::Text(prev) = &mut last.node {
                prev.push_str(next);
                last.span.end = node.span.end;
                continue;
            }
        }
        merged.push(node);
    }
    merged
}
