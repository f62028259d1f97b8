//! Parser for view templates
//!
//! Source is lexed in two stages: the markup lexer splits text from
//! `{{ }}`/`{!! !!}` interpolations and `@directives`, and the expression
//! lexer tokenizes what sits inside them. The grammar turns both token
//! streams into a [`Document`].

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, parse_arguments, parse_expression};
