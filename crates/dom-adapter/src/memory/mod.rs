//! Deterministic in-process [`DomPort`] used by tests and the offline demo.
//!
//! Page behaviour (framework re-renders, ARIA widgets, editors) is scripted
//! with Rust closures registered on the [`Document`]. Every write is recorded
//! in the journal together with its [`Origin`], so callers can tell the
//! engine's own mutations from the page's reactions.

mod document;
mod selector;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

pub use document::{DomEvent, Document, EditorInstance, JournalEntry, Listener, Origin};

use crate::error::AdapterError;
use crate::port::{DomPort, EditorAttachment, EditorHandle, EventKind, NodeId, SelectOption};

#[derive(Clone, Debug, Default)]
pub struct MemoryDom {
    doc: Arc<Mutex<Document>>,
}

impl MemoryDom {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Arc::new(Mutex::new(doc)),
        }
    }

    /// Runs `f` with exclusive access to the document.
    pub fn with<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.doc.lock())
    }

    /// Snapshot of the journal.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.doc.lock().journal().to_vec()
    }

    /// Attribute writes the port performed, in order.
    pub fn port_attribute_writes(&self) -> Vec<(NodeId, String, String)> {
        self.doc
            .lock()
            .journal()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Attribute {
                    node,
                    name,
                    value,
                    origin: Origin::Port,
                } => Some((*node, name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DomPort for MemoryDom {
    async fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, AdapterError> {
        Ok(self.doc.lock().query_all(selector)?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, AdapterError> {
        self.doc.lock().query_all(selector)
    }

    async fn query_within(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, AdapterError> {
        self.doc.lock().query_within(root, selector)
    }

    async fn parent(&self, node: NodeId) -> Result<Option<NodeId>, AdapterError> {
        self.doc.lock().parent_of_node(node)
    }

    async fn closest(
        &self,
        node: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, AdapterError> {
        self.doc.lock().closest(node, selector)
    }

    async fn tag_name(&self, node: NodeId) -> Result<String, AdapterError> {
        self.doc.lock().tag_name(node)
    }

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, AdapterError> {
        let doc = self.doc.lock();
        doc.element_handle(node)?;
        Ok(doc.attribute(node, name))
    }

    async fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), AdapterError> {
        self.doc
            .lock()
            .write_attribute(node, name, value, Origin::Port)
    }

    async fn checked(&self, node: NodeId) -> Result<Option<bool>, AdapterError> {
        self.doc.lock().checked_property(node)
    }

    async fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), AdapterError> {
        self.doc.lock().write_checked(node, checked, Origin::Port)
    }

    async fn value(&self, node: NodeId) -> Result<Option<String>, AdapterError> {
        self.doc.lock().value_of(node)
    }

    async fn set_value(&self, node: NodeId, value: &str) -> Result<(), AdapterError> {
        self.doc.lock().write_value(node, value, Origin::Port)
    }

    async fn is_content_editable(&self, node: NodeId) -> Result<bool, AdapterError> {
        self.doc.lock().is_content_editable(node)
    }

    async fn is_visible(&self, node: NodeId) -> Result<bool, AdapterError> {
        self.doc.lock().is_visible(node)
    }

    async fn text_content(&self, node: NodeId) -> Result<String, AdapterError> {
        self.doc.lock().text_of(node)
    }

    async fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), AdapterError> {
        self.doc.lock().write_text(node, text)
    }

    async fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, AdapterError> {
        self.doc.lock().select_options(node)
    }

    async fn select_option(&self, node: NodeId, index: usize) -> Result<(), AdapterError> {
        self.doc.lock().select_index(node, index)
    }

    async fn select_all_and_delete(&self, node: NodeId) -> Result<(), AdapterError> {
        self.doc.lock().select_all_and_delete(node)
    }

    async fn insert_text(&self, text: &str) -> Result<bool, AdapterError> {
        self.doc.lock().insert_text(text)
    }

    async fn focus(&self, node: NodeId) -> Result<(), AdapterError> {
        self.doc.lock().focus(node)
    }

    async fn blur(&self, node: NodeId) -> Result<(), AdapterError> {
        self.doc.lock().blur(node)
    }

    async fn scroll_into_view(&self, node: NodeId) -> Result<(), AdapterError> {
        self.doc.lock().scroll_into_view(node)
    }

    async fn click(&self, node: NodeId) -> Result<(), AdapterError> {
        self.doc.lock().click(node)
    }

    async fn dispatch_event(&self, node: NodeId, event: EventKind) -> Result<(), AdapterError> {
        self.doc.lock().fire(node, event)
    }

    async fn locate_editor(
        &self,
        node: NodeId,
        attachment: EditorAttachment,
    ) -> Result<Option<EditorHandle>, AdapterError> {
        self.doc.lock().locate_editor(node, attachment)
    }

    async fn editor_set_value(
        &self,
        editor: EditorHandle,
        text: &str,
    ) -> Result<(), AdapterError> {
        self.doc.lock().editor_set_value(editor, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn port_writes_are_tagged() {
        let mut doc = Document::new();
        let field = doc.append(doc.body(), "input", &[("id", "name")]);
        let dom = MemoryDom::new(doc);

        let found = dom.query_selector("#name").await.unwrap();
        assert_eq!(found, Some(field));
        dom.set_value(field, "Ada").await.unwrap();
        dom.set_attribute(field, "aria-invalid", "false").await.unwrap();

        assert_eq!(dom.value(field).await.unwrap().as_deref(), Some("Ada"));
        assert_eq!(
            dom.port_attribute_writes(),
            vec![(field, "aria-invalid".to_string(), "false".to_string())]
        );
    }

    #[tokio::test]
    async fn insert_text_needs_an_editable_focus() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.append(body, "button", &[]);
        let editable = doc.append(body, "div", &[("contenteditable", "true")]);
        let dom = MemoryDom::new(doc);

        assert!(!dom.insert_text("x").await.unwrap());
        dom.focus(button).await.unwrap();
        assert!(!dom.insert_text("x").await.unwrap());
        dom.focus(editable).await.unwrap();
        assert!(dom.insert_text("hello").await.unwrap());
        assert_eq!(dom.text_content(editable).await.unwrap(), "hello");
        assert_eq!(
            dom.with(|doc| doc.events_on(editable)),
            vec![EventKind::Focus, EventKind::Input]
        );
    }

    #[tokio::test]
    async fn invalid_selector_is_reported() {
        let dom = MemoryDom::default();
        let err = dom.query_selector("input[").await.unwrap_err();
        assert_eq!(err.kind, crate::error::AdapterErrorKind::InvalidSelector);
    }
}
