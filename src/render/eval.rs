//! Interpretation of template nodes against the per-render state

use log::trace;
use serde_json::Value;

use super::blocks::Commit;
use super::chain::RenderState;
use super::context::{display, Scope};
use super::error::RenderError;
use crate::config::EngineConfig;
use crate::parser::ast::{Expr, Filter, Literal, Node, SectionEnd, Spanned};
use crate::template::{TemplateLoader, TemplateRegistry};

/// Evaluates the nodes of one template (or one included template)
pub(crate) struct Evaluator<'a, L> {
    registry: &'a TemplateRegistry<L>,
    config: &'a EngineConfig,
    scope: Scope<'a>,
    /// Name of the template being evaluated, for error messages
    template: &'a str,
    include_depth: usize,
}

impl<'a, L: TemplateLoader> Evaluator<'a, L> {
    pub(crate) fn new(
        registry: &'a TemplateRegistry<L>,
        config: &'a EngineConfig,
        scope: Scope<'a>,
        template: &'a str,
    ) -> Self {
        Self {
            registry,
            config,
            scope,
            template,
            include_depth: 0,
        }
    }

    pub(crate) fn eval_nodes(
        &self,
        nodes: &[Spanned<Node>],
        state: &mut RenderState,
    ) -> Result<(), RenderError> {
        for node in nodes {
            self.eval_node(&node.node, state)?;
        }
        Ok(())
    }

    fn eval_node(&self, node: &Node, state: &mut RenderState) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => state.captures.write(text),

            Node::Echo(echo) => {
                let text = display(&self.value_of(&echo.expr)?);
                if echo.escape {
                    state.captures.write(&html_escape(&text));
                } else {
                    state.captures.write(&text);
                }
            }

            Node::Extends(name) => {
                trace!("'{}' extends '{}'", self.template, name.node);
                state.queue.push_back(name.node.clone());
            }

            Node::Section(section) => {
                state
                    .blocks
                    .begin_block(section.name.node.as_str(), &mut state.captures);
                self.eval_nodes(&section.body, state)?;

                let commit = match section.end {
                    SectionEnd::Append => Commit::Append,
                    SectionEnd::Overwrite | SectionEnd::Show => Commit::Overwrite,
                };
                let name = state.blocks.end_block(commit, &mut state.captures)?;

                if section.end == SectionEnd::Show {
                    let shown = state.blocks.block(&name, "").to_string();
                    state.captures.write(&shown);
                }
            }

            Node::InlineSection { name, value } => {
                let text = html_escape(&display(&self.value_of(value)?));
                state
                    .blocks
                    .begin_block(name.node.as_str(), &mut state.captures);
                state.captures.write(&text);
                state.blocks.end_block(Commit::Overwrite, &mut state.captures)?;
            }

            Node::Yield { name, default } => {
                let text = match (state.blocks.get(&name.node), default) {
                    (Some(content), _) => content.to_string(),
                    (None, Some(expr)) => html_escape(&display(&self.value_of(expr)?)),
                    (None, None) => String::new(),
                };
                state.captures.write(&text);
            }

            Node::Include(name) => self.include(&name.node, state)?,
        }
        Ok(())
    }

    /// Evaluate another template in place, sharing scope and render state
    fn include(&self, name: &str, state: &mut RenderState) -> Result<(), RenderError> {
        if self.include_depth >= self.config.max_include_depth {
            return Err(RenderError::IncludeTooDeep {
                limit: self.config.max_include_depth,
                template: name.to_string(),
            });
        }

        trace!("'{}' includes '{}'", self.template, name);
        let template = self.registry.get(name)?;
        let nested = Evaluator {
            registry: self.registry,
            config: self.config,
            scope: self.scope,
            template: &template.name,
            include_depth: self.include_depth + 1,
        };
        nested.eval_nodes(&template.document.nodes, state)
    }

    /// Value of an expression; undefined variables are null unless strict
    fn value_of(&self, expr: &Spanned<Expr>) -> Result<Value, RenderError> {
        match self.lookup(expr)? {
            Some(value) => Ok(value),
            None if self.config.strict_variables => Err(RenderError::UndefinedVariable {
                name: expr
                    .node
                    .variable_name()
                    .unwrap_or_else(|| "<expression>".to_string()),
                template: self.template.to_string(),
            }),
            None => Ok(self.undefined_value(expr)),
        }
    }

    /// Lenient value of an expression that reads an undefined variable:
    /// filters still apply, to null
    fn undefined_value(&self, expr: &Spanned<Expr>) -> Value {
        match &expr.node {
            Expr::Filter { expr, filter } => apply_filter(filter.node, self.undefined_value(expr)),
            Expr::Coalesce { fallback, .. } => self.undefined_value(fallback),
            Expr::Literal(_) | Expr::Path(_) => Value::Null,
        }
    }

    /// `None` means the expression reads a variable that is not defined
    fn lookup(&self, expr: &Spanned<Expr>) -> Result<Option<Value>, RenderError> {
        match &expr.node {
            Expr::Literal(literal) => Ok(Some(literal_value(literal))),
            Expr::Path(path) => Ok(self.scope.lookup(path).cloned()),
            Expr::Filter { expr, filter } => Ok(self
                .lookup(expr)?
                .map(|value| apply_filter(filter.node, value))),
            Expr::Coalesce { value, fallback } => match self.lookup(value)? {
                Some(found) if !found.is_null() => Ok(Some(found)),
                _ => self.lookup(fallback),
            },
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Integer(n) => Value::from(*n),
        Literal::Float(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

fn apply_filter(filter: Filter, value: Value) -> Value {
    match filter {
        Filter::Upper => Value::String(display(&value).to_uppercase()),
        Filter::Lower => Value::String(display(&value).to_lowercase()),
        Filter::Trim => Value::String(display(&value).trim().to_string()),
        Filter::Json => Value::String(value.to_string()),
        Filter::Length => {
            let len = match &value {
                Value::Null => 0,
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                other => display(other).chars().count(),
            };
            Value::from(len)
        }
    }
}

/// Escape special HTML characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
