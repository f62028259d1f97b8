//! Public render entry points

use std::io::Write;
use std::sync::Arc;

use log::debug;

use super::chain::resolve_chain;
use super::context::Context;
use super::error::RenderError;
use crate::config::EngineConfig;
use crate::template::{FileLoader, Template, TemplateLoader, TemplateRegistry};

/// Renders named templates through their inheritance chains
///
/// The engine holds only the loader, the configuration and the parse
/// cache. Every call to [`Engine::fetch`] builds its own block map, queue
/// and capture stack, so calls never observe each other's blocks.
#[derive(Debug)]
pub struct Engine<L = FileLoader> {
    registry: TemplateRegistry<L>,
    config: EngineConfig,
}

impl Engine<FileLoader> {
    /// Engine reading templates from `config.views_root`
    pub fn new(config: EngineConfig) -> Self {
        let loader = FileLoader::from_config(&config);
        Self::with_loader(loader, config)
    }
}

impl<L: TemplateLoader> Engine<L> {
    pub fn with_loader(loader: L, config: EngineConfig) -> Self {
        Self {
            registry: TemplateRegistry::new(loader, config.cache),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry<L> {
        &self.registry
    }

    /// Render `name` with `data` and return the text
    pub fn fetch(&self, name: &str, data: &Context) -> Result<String, RenderError> {
        debug!("fetch '{}' with {} variable(s)", name, data.len());
        resolve_chain(name, data.bind(), &self.registry, &self.config)
    }

    /// Render `name`; returns the text when `return_only`, otherwise writes
    /// it to stdout and returns `None`
    pub fn render(
        &self,
        name: &str,
        data: &Context,
        return_only: bool,
    ) -> Result<Option<String>, RenderError> {
        if return_only {
            return self.fetch(name, data).map(Some);
        }
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.render_to(name, data, &mut out)?;
        Ok(None)
    }

    /// Render `name` into any writer
    pub fn render_to<W: Write>(
        &self,
        name: &str,
        data: &Context,
        out: &mut W,
    ) -> Result<(), RenderError> {
        let text = self.fetch(name, data)?;
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(RenderError::Output)
    }

    /// Load and parse `name` without rendering it
    pub fn check(&self, name: &str) -> Result<Arc<Template>, RenderError> {
        self.registry.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::InMemoryLoader;
    use pretty_assertions::assert_eq;

    fn engine(loader: InMemoryLoader) -> Engine<InMemoryLoader> {
        Engine::with_loader(loader, EngineConfig::default())
    }

    #[test]
    fn test_page_and_layout() {
        let engine = engine(
            InMemoryLoader::new()
                .with("page", r#"@extends("layout")@section("body")Hello@endsection"#)
                .with("layout", r#"<H>@yield("body")<F>"#),
        );
        assert_eq!(engine.fetch("page", &Context::new()).unwrap(), "<H>Hello<F>");
    }

    #[test]
    fn test_render_return_only() {
        let engine = engine(InMemoryLoader::new().with("page", "Hi {{ name }}"));
        let ctx = Context::new().with("name", "Ada");
        assert_eq!(
            engine.render("page", &ctx, true).unwrap(),
            Some("Hi Ada".to_string())
        );
    }

    #[test]
    fn test_render_to_writer() {
        let engine = engine(InMemoryLoader::new().with("page", "body"));
        let mut out = Vec::new();
        engine.render_to("page", &Context::new(), &mut out).unwrap();
        assert_eq!(out, b"body");
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let engine = engine(InMemoryLoader::new().with("page", r#"@extends("gone")x"#));
        let mut out = Vec::new();
        assert!(engine.render_to("page", &Context::new(), &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_check_parses_without_rendering() {
        let engine = engine(
            InMemoryLoader::new()
                .with("ok", r#"@extends("missing")"#)
                .with("bad", "{{ x"),
        );
        let template = engine.check("ok").unwrap();
        assert_eq!(template.document.extends(), vec!["missing"]);
        assert!(matches!(engine.check("bad"), Err(RenderError::Parse { .. })));
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        let engine = engine(InMemoryLoader::new().with("page", "n={{ n }}"));
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|n| {
                    let engine = &engine;
                    s.spawn(move || engine.fetch("page", &Context::new().with("n", n)).unwrap())
                })
                .collect();
            for (n, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.join().unwrap(), format!("n={}", n));
            }
        });
    }
}
