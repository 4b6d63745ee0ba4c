//! Error types for action primitives

use dom_adapter::AdapterError;
use thiserror::Error;

/// Everything that can stop a single action from completing.
///
/// Messages are what ends up in the batch report, so they stay short and
/// name the operation that failed.
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// The action record itself is unusable (missing type or selector)
    #[error("malformed action: {0}")]
    Malformed(String),

    /// The selector matched nothing
    #[error("element not found: {0}")]
    AnchorNotFound(String),

    /// No text-entry target could be resolved from the anchor
    #[error("not a text input: {0}")]
    NotATextInput(String),

    /// No radio/checkbox control could be resolved from the anchor
    #[error("no {role} control found: {selector}")]
    ControlNotFound { role: String, selector: String },

    /// Dropdown had no option with the requested value or text
    #[error("option not found: {0}")]
    OptionNotFound(String),

    /// Anchor is neither a native select nor an ARIA listbox/option
    #[error("not a dropdown: {0}")]
    NotADropdown(String),

    /// The state change was applied but never observed
    #[error("failed to update {role} state")]
    VerificationFailed { role: String },

    /// DOM port failure
    #[error("dom error: {0}")]
    Dom(#[from] AdapterError),
}

impl ActionError {
    /// Contract violations by the producer of the action list, as opposed to
    /// anything the page did.
    pub fn is_structural(&self) -> bool {
        matches!(self, ActionError::Malformed(_))
    }

    /// Short machine-friendly label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ActionError::Malformed(_) => "malformed",
            ActionError::AnchorNotFound(_) => "anchor_not_found",
            ActionError::NotATextInput(_) => "not_a_text_input",
            ActionError::ControlNotFound { .. } => "control_not_found",
            ActionError::OptionNotFound(_) => "option_not_found",
            ActionError::NotADropdown(_) => "not_a_dropdown",
            ActionError::VerificationFailed { .. } => "verification_failed",
            ActionError::Dom(_) => "dom",
        }
    }
}
