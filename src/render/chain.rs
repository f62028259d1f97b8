//! Inheritance chain resolution
//!
//! A render starts from one template and walks its `@extends` ancestors
//! front to back. Every template's literal output is captured into the
//! implicit `content` block and committed with overwrite, so the content
//! that survives is that of the root-most ancestor. Descendants contribute
//! only through the named blocks the ancestors read back.

use std::collections::VecDeque;

use log::debug;

use super::blocks::{BlockStack, Commit};
use super::capture::CaptureStack;
use super::context::Scope;
use super::error::RenderError;
use super::eval::Evaluator;
use crate::config::EngineConfig;
use crate::template::{TemplateLoader, TemplateRegistry};

/// Name of the block every template's literal output is captured into
pub const CONTENT_BLOCK: &str = "content";

/// Mutable state owned by one render call
#[derive(Debug, Default)]
pub(crate) struct RenderState {
    /// Templates still to evaluate, front first
    pub queue: VecDeque<String>,
    pub blocks: BlockStack,
    pub captures: CaptureStack,
}

impl RenderState {
    fn new(root: &str) -> Self {
        let mut state = Self::default();
        state.queue.push_back(root.to_string());
        state
    }
}

/// Evaluate `root` and its ancestors, returning the final `content` block
pub(crate) fn resolve_chain<L: TemplateLoader>(
    root: &str,
    scope: Scope<'_>,
    registry: &TemplateRegistry<L>,
    config: &EngineConfig,
) -> Result<String, RenderError> {
    let mut state = RenderState::new(root);
    let mut chain: Vec<String> = Vec::new();

    while let Some(name) = state.queue.pop_front() {
        chain.push(name.clone());
        if chain.len() > config.max_chain_depth {
            return Err(RenderError::ChainTooDeep {
                limit: config.max_chain_depth,
                chain,
            });
        }
        debug!("evaluating '{}' (hop {})", name, chain.len());

        let template = registry.get(&name)?;
        state.blocks.begin_block(CONTENT_BLOCK, &mut state.captures);
        Evaluator::new(registry, config, scope, &template.name)
            .eval_nodes(&template.document.nodes, &mut state)?;
        state.blocks.end_block(Commit::Overwrite, &mut state.captures)?;
    }

    state.blocks.ensure_closed()?;
    debug!("chain resolved: {}", chain.join(" -> "));
    Ok(state.blocks.block(CONTENT_BLOCK, "").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Context;
    use crate::template::InMemoryLoader;
    use pretty_assertions::assert_eq;

    fn resolve(loader: InMemoryLoader, root: &str, config: EngineConfig) -> Result<String, RenderError> {
        let registry = TemplateRegistry::new(loader, true);
        let ctx = Context::new().with("who", "World");
        resolve_chain(root, ctx.bind(), &registry, &config)
    }

    #[test]
    fn test_single_template() {
        let loader = InMemoryLoader::new().with("page", "Hello {{ who }}");
        assert_eq!(
            resolve(loader, "page", EngineConfig::default()).unwrap(),
            "Hello World"
        );
    }

    #[test]
    fn test_root_most_content_wins() {
        let loader = InMemoryLoader::new()
            .with("child", r#"@extends("parent")child text"#)
            .with("parent", "parent text");
        assert_eq!(
            resolve(loader, "child", EngineConfig::default()).unwrap(),
            "parent text"
        );
    }

    #[test]
    fn test_yield_content_reads_previous_template_output() {
        let loader = InMemoryLoader::new()
            .with("a", r#"@extends("b")A"#)
            .with("b", r#"@extends("c")[@yield("content")]"#)
            .with("c", r#"<@yield("content")>"#);
        assert_eq!(
            resolve(loader, "a", EngineConfig::default()).unwrap(),
            "<[A]>"
        );
    }

    #[test]
    fn test_chain_depth_is_counted_per_hop() {
        let loader = InMemoryLoader::new()
            .with("a", r#"@extends("b")"#)
            .with("b", r#"@extends("c")"#)
            .with("c", "done");
        let exact = EngineConfig::default().with_max_chain_depth(3);
        assert_eq!(resolve(loader.clone(), "a", exact).unwrap(), "done");

        let short = EngineConfig::default().with_max_chain_depth(2);
        match resolve(loader, "a", short) {
            Err(RenderError::ChainTooDeep { limit, chain }) => {
                assert_eq!(limit, 2);
                assert_eq!(chain, vec!["a", "b", "c"]);
            }
            other => panic!("Expected chain too deep, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_ancestor_propagates() {
        let loader = InMemoryLoader::new().with("page", r#"@extends("gone")x"#);
        assert!(matches!(
            resolve(loader, "page", EngineConfig::default()),
            Err(RenderError::TemplateNotFound { name, .. }) if name == "gone"
        ));
    }
}
