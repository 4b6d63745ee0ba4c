use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// High-level error categories surfaced by a DOM port.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterErrorKind {
    #[error("node no longer attached")]
    NodeNotFound,
    #[error("invalid selector")]
    InvalidSelector,
    #[error("script evaluation failed")]
    Script,
    #[error("operation not supported")]
    Unsupported,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn node_not_found(node: impl fmt::Display) -> Self {
        Self::new(AdapterErrorKind::NodeNotFound).with_hint(format!("node {}", node))
    }

    pub fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::InvalidSelector)
            .with_hint(format!("'{}': {}", selector, reason.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_hint() {
        let err = AdapterError::invalid_selector("div[", "unterminated attribute");
        assert_eq!(
            err.to_string(),
            "invalid selector: 'div[': unterminated attribute"
        );
        assert_eq!(
            AdapterError::new(AdapterErrorKind::Unsupported).to_string(),
            "operation not supported"
        );
    }
}
