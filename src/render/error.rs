//! Error types for template rendering

use std::path::PathBuf;

use thiserror::Error;

use crate::error::ParseError;

/// Block stack integrity violations. These always point at a malformed
/// template or a misuse of the block API and are never auto-repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// `end_block` with nothing open
    #[error("no open block to end")]
    EmptyStack,

    /// Blocks still open when the chain finished
    #[error("blocks left open at end of render: {}", .names.join(", "))]
    Unclosed { names: Vec<String> },

    /// A capture was closed while a later one was still open
    #[error("capture {handle} closed while {open} capture(s) are open")]
    CaptureMismatch { handle: usize, open: usize },
}

/// Errors that can occur while resolving and rendering a template chain
#[derive(Debug, Error)]
pub enum RenderError {
    /// Logical name cannot map to a path under the views root
    #[error("invalid template name '{name}': {reason}")]
    InvalidTemplateName { name: String, reason: String },

    /// No template exists for the resolved location
    #[error("template not found: {name} (looked for {location})")]
    TemplateNotFound { name: String, location: String },

    /// Template exists but could not be read
    #[error("error reading template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template source failed to parse
    #[error("template '{name}' has syntax errors: {}", format_parse_errors(.errors))]
    Parse {
        name: String,
        text: String,
        errors: Vec<ParseError>,
    },

    /// Too many `@extends` hops; usually a cycle
    #[error("inheritance chain exceeded {limit} templates: {}", .chain.join(" -> "))]
    ChainTooDeep { limit: usize, chain: Vec<String> },

    /// Too much `@include` nesting
    #[error("include depth exceeded {limit} while including '{template}'")]
    IncludeTooDeep { limit: usize, template: String },

    /// Variable lookup failed with strict variables enabled
    #[error("undefined variable '{name}' in template '{template}'")]
    UndefinedVariable { name: String, template: String },

    /// Block stack integrity violation
    #[error("block stack integrity violation: {0}")]
    Block(#[from] BlockError),

    /// Render data is not a string-keyed mapping
    #[error("invalid render context: {0}")]
    InvalidContext(String),

    /// Writing the rendered text to its destination failed
    #[error("failed to write rendered output: {0}")]
    Output(#[source] std::io::Error),
}

impl RenderError {
    /// Create a template not found error
    pub fn not_found(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::TemplateNotFound {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Create an invalid template name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplateName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Source-annotated diagnostics for parse errors, one report per error
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            RenderError::Parse { name, text, errors } => Some(
                errors
                    .iter()
                    .map(|e| e.format(text, name))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
