//! Runtime error reports

use serde::Serialize;

/// Message shown to users for errors outside the chat widget
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// A runtime failure worth recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    /// Where it happened (`"global"`, `"promise"`, `"chat"`, ...)
    pub context: String,
    pub stack: Option<String>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: context.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }

    /// The chat widget reports its own failures inline
    pub fn shows_toast(&self) -> bool {
        !self.context.to_ascii_lowercase().contains("chat")
    }
}
