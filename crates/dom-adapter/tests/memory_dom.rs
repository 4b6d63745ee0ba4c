//! Behavioural checks for the in-memory document through the public port.

use std::sync::Arc;

use dom_adapter::{Document, DomPort, EditorAttachment, EventKind, MemoryDom};
use parking_lot::Mutex;

#[tokio::test]
async fn selector_lookup_follows_document_order() {
    let mut doc = Document::new();
    let body = doc.body();
    let form = doc.append(body, "form", &[("id", "signup")]);
    let first = doc.append(form, "input", &[("name", "email"), ("type", "email")]);
    let group = doc.append(form, "div", &[("class", "form-group required")]);
    let second = doc.append(group, "textarea", &[("name", "bio")]);
    let dom = MemoryDom::new(doc);

    assert_eq!(
        dom.query_selector_all("#signup input, #signup textarea")
            .await
            .unwrap(),
        vec![first, second]
    );
    assert_eq!(
        dom.query_within(form, "textarea").await.unwrap(),
        vec![second]
    );
    assert_eq!(
        dom.closest(second, ".form-group").await.unwrap(),
        Some(group)
    );
    assert!(dom.query_within(form, "form").await.unwrap().is_empty());
}

#[tokio::test]
async fn checkbox_click_runs_default_action_then_listeners_see_state() {
    let mut doc = Document::new();
    let body = doc.body();
    let boxed = doc.append(body, "input", &[("type", "checkbox"), ("id", "agree")]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    doc.on(body, "change", move |doc, event| {
        sink.lock().push(doc.checked(event.target));
    });
    let dom = MemoryDom::new(doc);

    dom.click(boxed).await.unwrap();
    assert_eq!(dom.checked(boxed).await.unwrap(), Some(true));
    assert_eq!(*seen.lock(), vec![true]);
}

#[tokio::test]
async fn hidden_inputs_and_hidden_ancestors_are_invisible() {
    let mut doc = Document::new();
    let body = doc.body();
    let hidden = doc.append(body, "input", &[("type", "hidden")]);
    let wrapper = doc.append(body, "div", &[("style", "display: none")]);
    let nested = doc.append(wrapper, "input", &[]);
    let shown = doc.append(body, "input", &[]);
    let dom = MemoryDom::new(doc);

    assert!(!dom.is_visible(hidden).await.unwrap());
    assert!(!dom.is_visible(nested).await.unwrap());
    assert!(dom.is_visible(shown).await.unwrap());
}

#[tokio::test]
async fn editors_are_found_only_at_their_attachment() {
    let mut doc = Document::new();
    let host = doc.append(doc.body(), "div", &[("class", "ace_editor")]);
    let handle = doc.attach_editor(host, EditorAttachment::EditorProperty);
    let dom = MemoryDom::new(doc);

    assert_eq!(
        dom.locate_editor(host, EditorAttachment::EnvEditor).await.unwrap(),
        None
    );
    assert_eq!(
        dom.locate_editor(host, EditorAttachment::EditorProperty)
            .await
            .unwrap(),
        Some(handle)
    );
    dom.editor_set_value(handle, "fn main() {}").await.unwrap();
    dom.with(|doc| {
        let editor = doc.editor(handle).unwrap();
        assert_eq!(editor.value, "fn main() {}");
        assert!(editor.cursor_at_start);
    });
}

#[tokio::test]
async fn key_events_bubble_to_widget_handlers() {
    let mut doc = Document::new();
    let body = doc.body();
    let group = doc.append(body, "div", &[("role", "radiogroup")]);
    let radio = doc.append(group, "div", &[("role", "radio"), ("aria-checked", "false")]);
    doc.on(group, "keydown", |doc, event| {
        if event.kind.key() == Some(" ") {
            doc.set_attribute(event.target, "aria-checked", "true");
        }
    });
    let dom = MemoryDom::new(doc);

    dom.dispatch_event(radio, EventKind::key_down(" ")).await.unwrap();
    assert_eq!(
        dom.attribute(radio, "aria-checked").await.unwrap().as_deref(),
        Some("true")
    );
    assert!(dom.port_attribute_writes().is_empty());
}
