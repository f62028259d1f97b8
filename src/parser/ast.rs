//! Abstract Syntax Tree types for heirloom templates

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A parsed template body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub nodes: Vec<Spanned<Node>>,
}

impl Document {
    /// Ancestors named by `@extends` anywhere in this document, in source order
    pub fn extends(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_extends(&self.nodes, &mut names);
        names
    }

    /// Names of every section this document defines, in source order
    pub fn sections(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_sections(&self.nodes, &mut names);
        names
    }
}

fn collect_extends<'a>(nodes: &'a [Spanned<Node>], out: &mut Vec<&'a str>) {
    for node in nodes {
        match &node.node {
            Node::Extends(name) => out.push(name.node.as_str()),
            Node::Section(section) => collect_extends(&section.body, out),
            _ => {}
        }
    }
}

fn collect_sections<'a>(nodes: &'a [Spanned<Node>], out: &mut Vec<&'a str>) {
    for node in nodes {
        match &node.node {
            Node::Section(section) => {
                out.push(section.name.node.as_str());
                collect_sections(&section.body, out);
            }
            Node::InlineSection { name, .. } => out.push(name.node.as_str()),
            _ => {}
        }
    }
}

/// One element of a template body
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, emitted as-is
    Text(String),
    /// `{{ expr }}` or `{!! expr !!}`
    Echo(Echo),
    /// `@extends("name")`
    Extends(Spanned<String>),
    /// `@section("name") ... @endsection | @append | @show`
    Section(Section),
    /// `@section("name", expr)`
    InlineSection {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    /// `@yield("name")` or `@yield("name", default)`
    Yield {
        name: Spanned<String>,
        default: Option<Spanned<Expr>>,
    },
    /// `@include("name")`
    Include(Spanned<String>),
}

/// Interpolated expression
#[derive(Debug, Clone, PartialEq)]
pub struct Echo {
    pub expr: Spanned<Expr>,
    /// HTML-escape the value (`{{ }}`) or write it raw (`{!! !!}`)
    pub escape: bool,
}

/// How a section body is committed when its closing directive is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEnd {
    /// `@endsection`: replace any previous content
    Overwrite,
    /// `@append`: concatenate onto previous content
    Append,
    /// `@show`: replace, then write the block at the point of definition
    Show,
}

/// A block definition with a body
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: Spanned<String>,
    pub body: Vec<Spanned<Node>>,
    pub end: SectionEnd,
}

/// Literal values usable in expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Built-in value filters (`expr | name`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Upper,
    Lower,
    Trim,
    Json,
    Length,
}

impl Filter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "upper" => Some(Filter::Upper),
            "lower" => Some(Filter::Lower),
            "trim" => Some(Filter::Trim),
            "json" => Some(Filter::Json),
            "length" => Some(Filter::Length),
            _ => None,
        }
    }
}

/// Expression inside `{{ }}` or directive arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// Dotted variable path: `user.name`, `items.0`
    Path(Vec<String>),
    /// `expr | filter`
    Filter {
        expr: Box<Spanned<Expr>>,
        filter: Spanned<Filter>,
    },
    /// `value ?? fallback`
    Coalesce {
        value: Box<Spanned<Expr>>,
        fallback: Box<Spanned<Expr>>,
    },
}

impl Expr {
    /// Human-readable name of the variable this expression reads, if any
    pub fn variable_name(&self) -> Option<String> {
        match self {
            Expr::Path(segments) => Some(segments.join(".")),
            Expr::Filter { expr, .. } => expr.node.variable_name(),
            Expr::Coalesce { fallback, .. } => fallback.node.variable_name(),
            Expr::Literal(_) => None,
        }
    }
}
