//! Template registry: loads, parses and caches templates by logical name

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, trace};

use super::loader::TemplateLoader;
use crate::parser::{parse, Document};
use crate::render::RenderError;

/// A parsed template ready for evaluation
#[derive(Debug, Clone)]
pub struct Template {
    /// Logical template name
    pub name: String,
    /// Source file, for file-backed templates
    pub path: Option<PathBuf>,
    /// Original source text, kept for diagnostics
    pub text: String,
    pub document: Document,
}

/// Registry for loading and caching compiled templates
#[derive(Debug)]
pub struct TemplateRegistry<L> {
    loader: L,
    cache_enabled: bool,
    templates: RwLock<HashMap<String, Arc<Template>>>,
}

impl<L: TemplateLoader> TemplateRegistry<L> {
    /// Create a registry over `loader`; `cache` keeps parsed templates
    pub fn new(loader: L, cache: bool) -> Self {
        Self {
            loader,
            cache_enabled: cache,
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Get a template by name, loading and parsing it on a cache miss
    pub fn get(&self, name: &str) -> Result<Arc<Template>, RenderError> {
        if self.cache_enabled {
            let templates = self.templates.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(template) = templates.get(name) {
                trace!("template cache hit for '{}'", name);
                return Ok(Arc::clone(template));
            }
        }

        let template = Arc::new(self.compile(name)?);
        if self.cache_enabled {
            self.templates
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(name.to_string(), Arc::clone(&template));
        }
        Ok(template)
    }

    /// Load and parse a template, bypassing the cache
    pub fn compile(&self, name: &str) -> Result<Template, RenderError> {
        let source = self.loader.load(name)?;
        debug!("parsing template '{}' ({} bytes)", name, source.text.len());
        match parse(&source.text) {
            Ok(document) => Ok(Template {
                name: source.name,
                path: source.path,
                text: source.text,
                document,
            }),
            Err(errors) => Err(RenderError::Parse {
                name: name.to_string(),
                text: source.text,
                errors,
            }),
        }
    }

    /// Check if a template is currently cached
    pub fn contains(&self, name: &str) -> bool {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names of all cached templates
    pub fn names(&self) -> Vec<String> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Drop every cached template, e.g. after sources changed on disk
    pub fn clear(&self) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
