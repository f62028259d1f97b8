//! Named block captures and the committed block map

use std::collections::HashMap;

use log::trace;

use super::capture::{CaptureHandle, CaptureStack};
use super::error::BlockError;

/// How `end_block` stores captured text under a name that may already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Replace any existing content
    Overwrite,
    /// Concatenate after existing content
    Append,
}

/// Open block names (LIFO) and the blocks committed so far in one render
#[derive(Debug, Default)]
pub struct BlockStack {
    open: Vec<(String, CaptureHandle)>,
    committed: HashMap<String, String>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `name` and start capturing its content
    pub fn begin_block(&mut self, name: impl Into<String>, captures: &mut CaptureStack) {
        let name = name.into();
        trace!("begin block '{}' (depth {})", name, self.open.len() + 1);
        let handle = captures.open();
        self.open.push((name, handle));
    }

    /// Pop the innermost block, close its capture and commit the text
    ///
    /// Returns the name of the block that was closed.
    pub fn end_block(
        &mut self,
        commit: Commit,
        captures: &mut CaptureStack,
    ) -> Result<String, BlockError> {
        let (name, handle) = self.open.pop().ok_or(BlockError::EmptyStack)?;
        let text = captures.close(handle)?;
        trace!("end block '{}' ({:?}, {} bytes)", name, commit, text.len());

        if commit == Commit::Append {
            if let Some(existing) = self.committed.get_mut(&name) {
                existing.push_str(&text);
                return Ok(name);
            }
        }
        self.committed.insert(name.clone(), text);
        Ok(name)
    }

    /// Committed content for `name`, or `default` when nothing was committed
    pub fn block<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Committed content for `name`, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.committed.get(name).map(|s| s.as_str())
    }

    /// Names of the blocks currently open, outermost first
    pub fn open_names(&self) -> Vec<&str> {
        self.open.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Fail if any block was opened and never ended
    pub fn ensure_closed(&self) -> Result<(), BlockError> {
        if self.open.is_empty() {
            Ok(())
        } else {
            Err(BlockError::Unclosed {
                names: self.open.iter().map(|(name, _)| name.clone()).collect(),
            })
        }
    }
}
