use std::fmt;

use thiserror::Error;

/// Labels broadcast when no sequence is configured, in cycle order.
pub const DEFAULT_STATES: [&str; 5] = ["OFF", "READY", "DRIVING", "EMERGENCY", "FINISHED"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("State label must not be empty")]
    Empty,

    #[error("State label '{0}' must be ASCII without line terminators")]
    InvalidCharacter(String),

    #[error("State sequence must contain at least one label")]
    EmptySequence,
}

/// One operating-mode identifier sent to the controller.
///
/// Always non-empty ASCII with no `\r` or `\n`, so it can be framed as a
/// single line without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateLabel(String);

impl StateLabel {
    pub fn new(text: impl Into<String>) -> Result<Self, LabelError> {
        let text = text.into();
        if text.is_empty() {
            return Err(LabelError::Empty);
        }
        if !text.is_ascii() || text.bytes().any(|b| b == b'\n' || b == b'\r') {
            return Err(LabelError::InvalidCharacter(text.escape_debug().to_string()));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The built-in OFF → FINISHED cycle.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_STATES
            .iter()
            .map(|s| Self(s.to_string()))
            .collect()
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed circular traversal over the configured labels.
///
/// There are no guards or terminal states: every label, EMERGENCY and
/// FINISHED included, is visited and left the same way.
#[derive(Debug, Clone)]
pub struct Sequencer {
    states: Vec<StateLabel>,
    position: usize,
}

impl Sequencer {
    pub fn new(states: Vec<StateLabel>) -> Result<Self, LabelError> {
        if states.is_empty() {
            return Err(LabelError::EmptySequence);
        }
        Ok(Self {
            states,
            position: 0,
        })
    }

    pub fn current(&self) -> &StateLabel {
        // position < len is upheld by `new` and `advance`
        &self.states[self.position]
    }

    pub fn advance(&mut self) {
        self.position = (self.position + 1) % self.states.len();
    }

    pub fn position(&self) -> usize {
        self.position
    }

}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            states: StateLabel::defaults(),
            position: 0,
        }
    }
}
