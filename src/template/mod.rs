//! Template loading and caching
//!
//! Templates are addressed by dot-delimited logical names. A
//! [`TemplateLoader`] turns a name into source text (from disk via
//! [`FileLoader`], or from memory via [`InMemoryLoader`]) and the
//! [`TemplateRegistry`] parses it once and hands out shared [`Template`]s.
//!
//! # Example
//!
//! ```text
//! views/
//!   layouts/main.html     <- "layouts.main"
//!   pages/home.html       <- "pages.home"
//! ```

mod loader;
mod registry;

pub use loader::{FileLoader, InMemoryLoader, TemplateLoader, TemplateSource};
pub use registry::{Template, TemplateRegistry};
