//! Heirloom - block and inheritance view templates
//!
//! Templates declare an ancestor with `@extends` and fill the named blocks
//! the ancestor reads with `@yield`. Rendering walks the chain from the
//! requested template up to the root-most layout and returns one document.
//!
//! # Example
//!
//! ```rust
//! use heirloom::{Context, Engine, EngineConfig, InMemoryLoader};
//!
//! let loader = InMemoryLoader::new()
//!     .with("layout", r#"<h1>{{ title }}</h1>@yield("body")"#)
//!     .with("page", r#"@extends("layout")@section("body")<p>Hi</p>@endsection"#);
//! let engine = Engine::with_loader(loader, EngineConfig::default());
//!
//! let html = engine
//!     .fetch("page", &Context::new().with("title", "Home"))
//!     .unwrap();
//! assert_eq!(html, "<h1>Home</h1><p>Hi</p>");
//! ```

pub mod config;
pub mod error;
pub mod mail;
pub mod parser;
pub mod render;
pub mod template;

pub use config::{ConfigError, EngineConfig};
pub use error::ParseError;
pub use mail::MailBody;
pub use parser::{parse, Document};
pub use render::{BlockError, Context, Engine, RenderError};
pub use template::{FileLoader, InMemoryLoader, Template, TemplateLoader, TemplateRegistry};

/// Name an anonymous template is registered under by [`render_str`]
const INLINE_TEMPLATE: &str = "<inline>";

/// Render template source that is not stored anywhere
///
/// The source cannot `@extends` or `@include` other templates, since there
/// is nothing to load them from.
///
/// # Example
///
/// ```rust
/// use heirloom::{render_str, Context};
///
/// let ctx = Context::new().with("name", "<Ada>");
/// assert_eq!(render_str("Hi {{ name }}", &ctx).unwrap(), "Hi &lt;Ada&gt;");
/// ```
pub fn render_str(source: &str, data: &Context) -> Result<String, RenderError> {
    let loader = InMemoryLoader::new().with(INLINE_TEMPLATE, source);
    let engine = Engine::with_loader(loader, EngineConfig::default().with_cache(false));
    engine.fetch(INLINE_TEMPLATE, data)
}
