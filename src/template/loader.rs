//! Mapping logical template names to template source

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::EngineConfig;
use crate::render::RenderError;

/// Raw template body with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSource {
    /// Logical name the template was requested under
    pub name: String,
    /// File the body was read from, for file-backed loaders
    pub path: Option<PathBuf>,
    pub text: String,
}

/// A source of template bodies addressed by logical name
pub trait TemplateLoader {
    /// Load the body of the template called `name`
    fn load(&self, name: &str) -> Result<TemplateSource, RenderError>;
}

impl<T: TemplateLoader + ?Sized> TemplateLoader for Box<T> {
    fn load(&self, name: &str) -> Result<TemplateSource, RenderError> {
        (**self).load(name)
    }
}

/// Loads `a.b.c` from `<root>/a/b/c.<extension>`
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    extension: String,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.views_root, &config.extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Translate a logical name into a path without touching the file system
    pub fn path_for(&self, name: &str) -> Result<PathBuf, RenderError> {
        let segments = validate_name(name)?;
        let (last, dirs) = segments
            .split_last()
            .ok_or_else(|| RenderError::invalid_name(name, "name is empty"))?;

        let mut path = self.root.clone();
        for dir in dirs {
            path.push(dir);
        }
        if self.extension.is_empty() {
            path.push(last);
        } else {
            path.push(format!("{}.{}", last, self.extension));
        }
        Ok(path)
    }

    /// Resolve a logical name to an existing template file
    pub fn resolve(&self, name: &str) -> Result<PathBuf, RenderError> {
        let path = self.path_for(name)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(RenderError::not_found(name, path.display().to_string()))
        }
    }
}

impl TemplateLoader for FileLoader {
    fn load(&self, name: &str) -> Result<TemplateSource, RenderError> {
        let path = self.resolve(name)?;
        debug!("loading template '{}' from {}", name, path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(TemplateSource {
            name: name.to_string(),
            path: Some(path),
            text,
        })
    }
}

/// Split a dot-delimited name into path segments, refusing anything that
/// could address a file outside the views root
fn validate_name(name: &str) -> Result<Vec<&str>, RenderError> {
    if name.is_empty() {
        return Err(RenderError::invalid_name(name, "name is empty"));
    }
    let segments: Vec<&str> = name.split('.').collect();
    for segment in &segments {
        if segment.is_empty() {
            return Err(RenderError::invalid_name(name, "empty path segment"));
        }
        if segment.contains(['/', '\\']) || segment.contains(':') {
            return Err(RenderError::invalid_name(
                name,
                "segments may not contain path separators",
            ));
        }
    }
    Ok(segments)
}

/// A simple in-memory template loader
#[derive(Debug, Default, Clone)]
pub struct InMemoryLoader {
    templates: HashMap<String, String>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    /// Add a template, builder style
    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.add(name, source);
        self
    }
}

impl TemplateLoader for InMemoryLoader {
    fn load(&self, name: &str) -> Result<TemplateSource, RenderError> {
        let text = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::not_found(name, "<memory>"))?;
        Ok(TemplateSource {
            name: name.to_string(),
            path: None,
            text: text.clone(),
        })
    }
}
