//! Rendering of template inheritance chains
//!
//! Rendering a template runs its `@extends` chain front to back:
//!
//! 1. Each template's literal output is captured into the `content` block
//! 2. `@section` bodies are captured into named blocks
//! 3. Ancestors read blocks back with `@yield`
//!
//! All mutable state (queue, block map, capture stack) is created per call
//! to [`Engine::fetch`] and dropped when the call returns, success or not.

mod blocks;
mod capture;
mod chain;
mod context;
mod engine;
mod error;
mod eval;

pub use blocks::{BlockStack, Commit};
pub use capture::{CaptureHandle, CaptureStack};
pub use chain::CONTENT_BLOCK;
pub use context::{display, Context, Scope};
pub use engine::Engine;
pub use error::{BlockError, RenderError};
