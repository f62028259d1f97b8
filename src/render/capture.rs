//! Scoped output capture
//!
//! Generated text normally goes to the primary buffer. Opening a capture
//! diverts it into a fresh buffer until that capture is closed; captures
//! nest as a stack, and closing one restores whatever destination was
//! active before it was opened.

use super::error::BlockError;

/// Token returned by [`CaptureStack::open`], required to close it again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHandle(usize);

#[derive(Debug, Default)]
pub struct CaptureStack {
    primary: String,
    frames: Vec<String>,
}

impl CaptureStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start diverting output into a new buffer
    pub fn open(&mut self) -> CaptureHandle {
        self.frames.push(String::new());
        CaptureHandle(self.frames.len() - 1)
    }

    /// Stop the diversion opened by `handle` and return its text
    ///
    /// Only the innermost capture may be closed.
    pub fn close(&mut self, handle: CaptureHandle) -> Result<String, BlockError> {
        if self.frames.len() != handle.0 + 1 {
            return Err(BlockError::CaptureMismatch {
                handle: handle.0,
                open: self.frames.len(),
            });
        }
        self.frames.pop().ok_or(BlockError::CaptureMismatch {
            handle: handle.0,
            open: 0,
        })
    }

    /// Append text to the active destination
    pub fn write(&mut self, text: &str) {
        match self.frames.last_mut() {
            Some(frame) => frame.push_str(text),
            None => self.primary.push_str(text),
        }
    }

    /// Number of captures currently open
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Take everything written while no capture was open
    pub fn take_primary(&mut self) -> String {
        std::mem::take(&mut self.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncaptured_text_goes_to_primary() {
        let mut captures = CaptureStack::new();
        captures.write("hello");
        assert_eq!(captures.take_primary(), "hello");
        assert_eq!(captures.take_primary(), "");
    }

    #[test]
    fn test_capture_diverts_output() {
        let mut captures = CaptureStack::new();
        captures.write("a");
        let handle = captures.open();
        captures.write("b");
        assert_eq!(captures.close(handle).unwrap(), "b");
        captures.write("c");
        assert_eq!(captures.take_primary(), "ac");
    }

    #[test]
    fn test_nested_captures_restore_previous_destination() {
        let mut captures = CaptureStack::new();
        let outer = captures.open();
        captures.write("1");
        let inner = captures.open();
        captures.write("2");
        assert_eq!(captures.depth(), 2);
        assert_eq!(captures.close(inner).unwrap(), "2");
        captures.write("3");
        assert_eq!(captures.close(outer).unwrap(), "13");
        assert_eq!(captures.depth(), 0);
    }

    #[test]
    fn test_closing_out_of_order_is_error() {
        let mut captures = CaptureStack::new();
        let outer = captures.open();
        let _inner = captures.open();
        assert_eq!(
            captures.close(outer),
            Err(BlockError::CaptureMismatch { handle: 0, open: 2 })
        );
    }

    #[test]
    fn test_closing_twice_is_error() {
        let mut captures = CaptureStack::new();
        let handle = captures.open();
        captures.close(handle).unwrap();
        assert!(captures.close(handle).is_err());
    }
}
