//! Mail body composition
//!
//! A mail body is either rendered from a view or, when the message has no
//! view, the message data itself as pretty-printed JSON.

use log::debug;

use crate::render::{Context, Engine, RenderError};
use crate::template::TemplateLoader;

/// Composes message bodies through an [`Engine`]
#[derive(Debug)]
pub struct MailBody<'a, L> {
    engine: &'a Engine<L>,
}

impl<'a, L: TemplateLoader> MailBody<'a, L> {
    pub fn new(engine: &'a Engine<L>) -> Self {
        Self { engine }
    }

    /// Body text for a message with an optional view
    pub fn compose(&self, view: Option<&str>, data: &Context) -> Result<String, RenderError> {
        match view {
            Some(name) => self.engine.fetch(name, data),
            None => {
                debug!("no mail view, encoding {} variable(s) as JSON", data.len());
                serde_json::to_string_pretty(&data.to_value())
                    .map_err(|e| RenderError::InvalidContext(e.to_string()))
            }
        }
    }
}
