//! Line framing for the controller link.
//!
//! Outbound frames are a state label followed by `\n`. Inbound bytes are
//! split on `\n` by [`LineBuffer`] and turned into printable text by
//! [`decode`], which never fails: invalid byte sequences become U+FFFD.

use std::borrow::Cow;

use crate::sequencer::StateLabel;

/// Line terminator used in both directions.
pub const TERMINATOR: u8 = b'\n';

/// Marker substituted for byte sequences that are not valid text.
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Encode a state label as a single outbound frame.
pub fn encode(label: &StateLabel) -> Vec<u8> {
    let text = label.as_str();
    let mut frame = Vec::with_capacity(text.len() + 1);
    frame.extend_from_slice(text.as_bytes());
    frame.push(TERMINATOR);
    frame
}

/// Decode raw reply bytes into text (lossy).
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Returns true if decoding `text` had to substitute any bytes.
pub fn is_degraded(text: &str) -> bool {
    text.contains(REPLACEMENT)
}

/// Buffers inbound bytes and hands out complete lines.
///
/// Lines are returned without their terminator. A `\r` right before the
/// terminator is kept; callers trim when printing.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    /// Append a chunk read from the transport.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Remove and return the next complete line, if any.
    pub fn pop_line(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|&b| b == TERMINATOR)?;
        let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    /// Remove and return whatever is buffered, terminated or not.
    pub fn take_partial(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
