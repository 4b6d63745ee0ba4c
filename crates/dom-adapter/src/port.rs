//! The DOM boundary the action engine manipulates.
//!
//! Every method maps to one observable DOM capability: lookup, inspection,
//! mutation, interaction or rich-editor host access. Implementations must keep
//! event semantics faithful to the platform, because hosting pages detect
//! changes through dispatched events rather than property writes.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Opaque handle to an element of the current document.
///
/// Handles are only meaningful for the port that issued them and must not be
/// carried across actions; the page may have re-rendered in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Synthetic events the engine dispatches. Everything but focus and blur bubbles.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Input,
    Change,
    Click,
    MouseDown,
    MouseUp,
    KeyDown { key: String },
    KeyUp { key: String },
    Focus,
    Blur,
}

impl EventKind {
    /// DOM event type name.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Click => "click",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseUp => "mouseup",
            EventKind::KeyDown { .. } => "keydown",
            EventKind::KeyUp { .. } => "keyup",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            EventKind::KeyDown { key } | EventKind::KeyUp { key } => Some(key.as_str()),
            _ => None,
        }
    }

    pub fn bubbles(&self) -> bool {
        !matches!(self, EventKind::Focus | EventKind::Blur)
    }

    pub fn key_down(key: impl Into<String>) -> Self {
        EventKind::KeyDown { key: key.into() }
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        EventKind::KeyUp { key: key.into() }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "{}[{}]", self.name(), key),
            None => f.write_str(self.name()),
        }
    }
}

/// One `<option>` of a native `<select>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub index: usize,
    pub value: String,
    pub text: String,
    pub selected: bool,
}

/// Places where a rich-text editor instance can hang off its host element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorAttachment {
    /// `element.env.editor`
    EnvEditor,
    /// `element.editor`
    EditorProperty,
    /// Any own property exposing a `setValue` function and a `session`.
    OwnPropertyScan,
}

impl EditorAttachment {
    pub fn label(&self) -> &'static str {
        match self {
            EditorAttachment::EnvEditor => "env.editor",
            EditorAttachment::EditorProperty => "editor",
            EditorAttachment::OwnPropertyScan => "own-property-scan",
        }
    }
}

/// Live editor instance located through an [`EditorAttachment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorHandle(pub u64);

#[async_trait]
pub trait DomPort: Send + Sync {
    /// First element in document order matching `selector`.
    async fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, AdapterError>;

    /// All elements in document order matching `selector`.
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, AdapterError>;

    /// Descendants of `root` (excluding `root`) matching `selector`, in document order.
    async fn query_within(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, AdapterError>;

    async fn parent(&self, node: NodeId) -> Result<Option<NodeId>, AdapterError>;

    /// `node` itself or its nearest ancestor matching `selector`.
    async fn closest(&self, node: NodeId, selector: &str)
        -> Result<Option<NodeId>, AdapterError>;

    /// Lower-case tag name.
    async fn tag_name(&self, node: NodeId) -> Result<String, AdapterError>;

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, AdapterError>;

    async fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), AdapterError>;

    /// The `checked` property. `None` when the element has no such property.
    async fn checked(&self, node: NodeId) -> Result<Option<bool>, AdapterError>;

    /// Writes the `checked` property without dispatching events.
    async fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), AdapterError>;

    /// The `value` property. `None` when the element has no such property.
    async fn value(&self, node: NodeId) -> Result<Option<String>, AdapterError>;

    /// Writes the `value` property without dispatching events.
    async fn set_value(&self, node: NodeId, value: &str) -> Result<(), AdapterError>;

    /// The element's own `isContentEditable` flag.
    async fn is_content_editable(&self, node: NodeId) -> Result<bool, AdapterError>;

    async fn is_visible(&self, node: NodeId) -> Result<bool, AdapterError>;

    async fn text_content(&self, node: NodeId) -> Result<String, AdapterError>;

    async fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), AdapterError>;

    /// Options of a native `<select>`, empty for anything else.
    async fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, AdapterError>;

    /// Sets `selectedIndex` without dispatching events.
    async fn select_option(&self, node: NodeId, index: usize) -> Result<(), AdapterError>;

    /// Selects everything inside `node` and deletes it through the editing model.
    async fn select_all_and_delete(&self, node: NodeId) -> Result<(), AdapterError>;

    /// Inserts text at the current caret through the platform editing command.
    /// Returns whether the platform accepted the command.
    async fn insert_text(&self, text: &str) -> Result<bool, AdapterError>;

    async fn focus(&self, node: NodeId) -> Result<(), AdapterError>;

    async fn blur(&self, node: NodeId) -> Result<(), AdapterError>;

    async fn scroll_into_view(&self, node: NodeId) -> Result<(), AdapterError>;

    /// Native `click()`: fires `click` and runs the element's default action.
    async fn click(&self, node: NodeId) -> Result<(), AdapterError>;

    async fn dispatch_event(&self, node: NodeId, event: EventKind) -> Result<(), AdapterError>;

    async fn locate_editor(
        &self,
        node: NodeId,
        attachment: EditorAttachment,
    ) -> Result<Option<EditorHandle>, AdapterError>;

    /// Calls the editor's own "set value, cursor to start" API.
    async fn editor_set_value(&self, editor: EditorHandle, text: &str)
        -> Result<(), AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_follow_dom() {
        assert_eq!(EventKind::MouseDown.name(), "mousedown");
        assert_eq!(EventKind::key_down(" ").to_string(), "keydown[ ]");
        assert!(EventKind::Change.bubbles());
        assert!(!EventKind::Blur.bubbles());
    }
}
