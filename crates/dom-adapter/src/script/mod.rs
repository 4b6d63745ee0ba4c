//! [`DomPort`] over a JavaScript evaluation channel.
//!
//! Each port call becomes one self-contained expression. Element handles live
//! in a page-side registry (`window.__formpilot`) keyed by integer, so nothing
//! is written into the page markup to find an element again.

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::error::{AdapterError, AdapterErrorKind};
use crate::port::{DomPort, EditorAttachment, EditorHandle, EventKind, NodeId, SelectOption};

/// Something that can evaluate a JavaScript expression in the page and hand
/// back its JSON value (`undefined` maps to `null`).
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    async fn evaluate(&self, expression: String) -> Result<Value, AdapterError>;
}

const PRELUDE: &str = r#"
const fp = window.__formpilot || (window.__formpilot = { next: 1, ids: new WeakMap(), nodes: new Map(), editors: new Map() });
const reg = (el) => {
  if (!el) return null;
  let id = fp.ids.get(el);
  if (id === undefined) { id = fp.next++; fp.ids.set(el, id); fp.nodes.set(id, new WeakRef(el)); }
  return id;
};
const node = (id) => {
  const ref = fp.nodes.get(id);
  const el = ref && ref.deref();
  if (!el || !el.isConnected) {
    fp.nodes.delete(id);
    const e = new Error('node ' + id); e.name = 'StaleNode'; throw e;
  }
  return el;
};
const textControl = (el) => el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement;
const hasValue = (el) => textControl(el) || el instanceof HTMLSelectElement || el instanceof HTMLOptionElement;
"#;

fn js(value: impl Into<Value>) -> String {
    value.into().to_string()
}

pub struct ScriptDom<E> {
    engine: E,
}

impl<E: ScriptEngine> ScriptDom<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    async fn run(&self, body: String) -> Result<Value, AdapterError> {
        let expression = format!(
            "(() => {{ {PRELUDE} try {{ return {{ ok: (() => {{ {body} }})() }}; }} \
             catch (err) {{ return {{ err: String((err && err.name) || 'Error'), \
             message: String((err && err.message) || err) }}; }} }})()"
        );
        trace!(script = %body, "evaluating dom script");
        let reply = self.engine.evaluate(expression).await?;
        decode_reply(reply)
    }

    async fn run_unit(&self, body: String) -> Result<(), AdapterError> {
        self.run(body).await.map(|_| ())
    }
}

fn decode_reply(reply: Value) -> Result<Value, AdapterError> {
    if let Some(name) = reply.get("err").and_then(Value::as_str) {
        let message = reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let kind = match name {
            "StaleNode" => AdapterErrorKind::NodeNotFound,
            "SyntaxError" => AdapterErrorKind::InvalidSelector,
            _ => AdapterErrorKind::Script,
        };
        return Err(AdapterError::new(kind).with_hint(message));
    }
    match reply {
        Value::Object(mut map) => Ok(map.remove("ok").unwrap_or(Value::Null)),
        other => Err(AdapterError::new(AdapterErrorKind::Script)
            .with_hint(format!("unexpected script reply: {}", other))),
    }
}

fn as_node(value: &Value) -> Option<NodeId> {
    value.as_u64().map(NodeId)
}

fn as_nodes(value: Value) -> Result<Vec<NodeId>, AdapterError> {
    match value {
        Value::Array(items) => Ok(items.iter().filter_map(as_node).collect()),
        other => Err(unexpected("node list", &other)),
    }
}

fn as_bool(value: Value) -> Result<bool, AdapterError> {
    value.as_bool().ok_or_else(|| unexpected("boolean", &value))
}

fn as_string(value: Value) -> Result<String, AdapterError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(unexpected("string", &other)),
    }
}

fn as_opt_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn unexpected(expected: &str, got: &Value) -> AdapterError {
    AdapterError::new(AdapterErrorKind::Script)
        .with_hint(format!("expected {} from script, got {}", expected, got))
}

fn event_constructor(event: &EventKind) -> String {
    let name = js(event.name());
    match event {
        EventKind::KeyDown { key } | EventKind::KeyUp { key } => {
            let code = if key == " " { "Space".to_string() } else { key.clone() };
            format!(
                "new KeyboardEvent({name}, {{ key: {}, code: {}, bubbles: true, cancelable: true }})",
                js(key.as_str()),
                js(code)
            )
        }
        EventKind::MouseDown | EventKind::MouseUp | EventKind::Click => {
            format!("new MouseEvent({name}, {{ bubbles: true, cancelable: true, view: window }})")
        }
        EventKind::Focus | EventKind::Blur => format!("new FocusEvent({name})"),
        EventKind::Input | EventKind::Change => {
            format!("new Event({name}, {{ bubbles: true }})")
        }
    }
}

#[async_trait]
impl<E: ScriptEngine> DomPort for ScriptDom<E> {
    async fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, AdapterError> {
        let value = self
            .run(format!("return reg(document.querySelector({}));", js(selector)))
            .await?;
        Ok(as_node(&value))
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, AdapterError> {
        let value = self
            .run(format!(
                "return Array.from(document.querySelectorAll({}), reg);",
                js(selector)
            ))
            .await?;
        as_nodes(value)
    }

    async fn query_within(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, AdapterError> {
        let value = self
            .run(format!(
                "return Array.from(node({}).querySelectorAll({}), reg);",
                root.0,
                js(selector)
            ))
            .await?;
        as_nodes(value)
    }

    async fn parent(&self, node: NodeId) -> Result<Option<NodeId>, AdapterError> {
        let value = self
            .run(format!("return reg(node({}).parentElement);", node.0))
            .await?;
        Ok(as_node(&value))
    }

    async fn closest(
        &self,
        node: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, AdapterError> {
        let value = self
            .run(format!(
                "return reg(node({}).closest({}));",
                node.0,
                js(selector)
            ))
            .await?;
        Ok(as_node(&value))
    }

    async fn tag_name(&self, node: NodeId) -> Result<String, AdapterError> {
        let value = self
            .run(format!("return node({}).tagName.toLowerCase();", node.0))
            .await?;
        as_string(value)
    }

    async fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, AdapterError> {
        let value = self
            .run(format!(
                "return node({}).getAttribute({});",
                node.0,
                js(name)
            ))
            .await?;
        Ok(as_opt_string(value))
    }

    async fn set_attribute(
        &self,
        node: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "node({}).setAttribute({}, {}); return null;",
            node.0,
            js(name),
            js(value)
        ))
        .await
    }

    async fn checked(&self, node: NodeId) -> Result<Option<bool>, AdapterError> {
        let value = self
            .run(format!(
                "const el = node({}); return el instanceof HTMLInputElement ? el.checked : null;",
                node.0
            ))
            .await?;
        Ok(value.as_bool())
    }

    async fn set_checked(&self, node: NodeId, checked: bool) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "node({}).checked = {}; return null;",
            node.0, checked
        ))
        .await
    }

    async fn value(&self, node: NodeId) -> Result<Option<String>, AdapterError> {
        let value = self
            .run(format!(
                "const el = node({}); return hasValue(el) ? String(el.value) : null;",
                node.0
            ))
            .await?;
        Ok(as_opt_string(value))
    }

    async fn set_value(&self, node: NodeId, value: &str) -> Result<(), AdapterError> {
        // Go through the prototype setter so framework-wrapped value trackers see the write.
        self.run_unit(format!(
            "const el = node({}); \
             const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value'); \
             if (desc && desc.set) {{ desc.set.call(el, {v}); }} else {{ el.value = {v}; }} \
             return null;",
            node.0,
            v = js(value)
        ))
        .await
    }

    async fn is_content_editable(&self, node: NodeId) -> Result<bool, AdapterError> {
        let value = self
            .run(format!("return node({}).isContentEditable === true;", node.0))
            .await?;
        as_bool(value)
    }

    async fn is_visible(&self, node: NodeId) -> Result<bool, AdapterError> {
        let value = self
            .run(format!(
                "const el = node({}); \
                 if (el instanceof HTMLInputElement && el.type === 'hidden') return false; \
                 const style = getComputedStyle(el); \
                 if (style.display === 'none' || style.visibility === 'hidden') return false; \
                 return el.getClientRects().length > 0;",
                node.0
            ))
            .await?;
        as_bool(value)
    }

    async fn text_content(&self, node: NodeId) -> Result<String, AdapterError> {
        let value = self
            .run(format!("return node({}).textContent || '';", node.0))
            .await?;
        as_string(value)
    }

    async fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "node({}).textContent = {}; return null;",
            node.0,
            js(text)
        ))
        .await
    }

    async fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, AdapterError> {
        let value = self
            .run(format!(
                "const el = node({}); \
                 if (!(el instanceof HTMLSelectElement)) return []; \
                 return Array.from(el.options, (opt, index) => ({{ \
                   index, value: opt.value, text: opt.text, selected: opt.selected }}));",
                node.0
            ))
            .await?;
        serde_json::from_value(value).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Script)
                .with_hint(format!("malformed option list: {}", err))
        })
    }

    async fn select_option(&self, node: NodeId, index: usize) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "const el = node({}); \
             if (!(el instanceof HTMLSelectElement) || {i} >= el.options.length) \
               throw new Error('no option {i}'); \
             el.selectedIndex = {i}; return null;",
            node.0,
            i = index
        ))
        .await
    }

    async fn select_all_and_delete(&self, node: NodeId) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "const el = node({}); \
             if (textControl(el)) {{ el.select(); }} else {{ \
               const range = document.createRange(); range.selectNodeContents(el); \
               const sel = window.getSelection(); sel.removeAllRanges(); sel.addRange(range); }} \
             document.execCommand('delete'); return null;",
            node.0
        ))
        .await
    }

    async fn insert_text(&self, text: &str) -> Result<bool, AdapterError> {
        let value = self
            .run(format!(
                "return document.execCommand('insertText', false, {}) === true;",
                js(text)
            ))
            .await?;
        as_bool(value)
    }

    async fn focus(&self, node: NodeId) -> Result<(), AdapterError> {
        self.run_unit(format!("node({}).focus(); return null;", node.0))
            .await
    }

    async fn blur(&self, node: NodeId) -> Result<(), AdapterError> {
        self.run_unit(format!("node({}).blur(); return null;", node.0))
            .await
    }

    async fn scroll_into_view(&self, node: NodeId) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "node({}).scrollIntoView({{ block: 'center', inline: 'nearest' }}); return null;",
            node.0
        ))
        .await
    }

    async fn click(&self, node: NodeId) -> Result<(), AdapterError> {
        self.run_unit(format!("node({}).click(); return null;", node.0))
            .await
    }

    async fn dispatch_event(&self, node: NodeId, event: EventKind) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "node({}).dispatchEvent({}); return null;",
            node.0,
            event_constructor(&event)
        ))
        .await
    }

    async fn locate_editor(
        &self,
        node: NodeId,
        attachment: EditorAttachment,
    ) -> Result<Option<EditorHandle>, AdapterError> {
        let probe = match attachment {
            EditorAttachment::EnvEditor => "const ed = el.env && el.env.editor;",
            EditorAttachment::EditorProperty => "const ed = el.editor;",
            EditorAttachment::OwnPropertyScan => {
                "const ed = Object.keys(el).map((k) => el[k]).find((v) => \
                   v && typeof v === 'object' && typeof v.setValue === 'function' && v.session);"
            }
        };
        let value = self
            .run(format!(
                "const el = node({}); {probe} \
                 if (!ed || typeof ed.setValue !== 'function') return null; \
                 const id = fp.next++; fp.editors.set(id, ed); return id;",
                node.0
            ))
            .await?;
        Ok(value.as_u64().map(EditorHandle))
    }

    async fn editor_set_value(
        &self,
        editor: EditorHandle,
        text: &str,
    ) -> Result<(), AdapterError> {
        self.run_unit(format!(
            "const ed = fp.editors.get({}); \
             if (!ed) {{ const e = new Error('editor gone'); e.name = 'StaleNode'; throw e; }} \
             fp.editors.delete({}); ed.setValue({}, -1); return null;",
            editor.0,
            editor.0,
            js(text)
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Scripted {
        replies: Mutex<Vec<Value>>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptEngine for Scripted {
        async fn evaluate(&self, expression: String) -> Result<Value, AdapterError> {
            self.seen.lock().push(expression);
            Ok(self.replies.lock().pop().unwrap_or(Value::Null))
        }
    }

    fn dom_replying(reply: Value) -> ScriptDom<Scripted> {
        let engine = Scripted::default();
        engine.replies.lock().push(reply);
        ScriptDom::new(engine)
    }

    #[tokio::test]
    async fn selectors_are_embedded_as_json_literals() {
        let dom = dom_replying(json!({ "ok": 7 }));
        let found = dom.query_selector("input[name=\"q\"]").await.unwrap();
        assert_eq!(found, Some(NodeId(7)));
        let seen = dom.engine().seen.lock();
        assert!(seen[0].contains(r#"document.querySelector("input[name=\"q\"]")"#));
    }

    #[tokio::test]
    async fn missing_ok_means_null() {
        let dom = dom_replying(json!({}));
        assert_eq!(dom.attribute(NodeId(1), "role").await.unwrap(), None);
    }

    #[tokio::test]
    async fn page_errors_map_to_kinds() {
        let dom = dom_replying(json!({ "err": "StaleNode", "message": "node 3" }));
        let err = dom.tag_name(NodeId(3)).await.unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::NodeNotFound);

        let dom = dom_replying(json!({ "err": "SyntaxError", "message": "bad" }));
        let err = dom.query_selector_all("[").await.unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::InvalidSelector);
    }

    #[tokio::test]
    async fn options_decode() {
        let dom = dom_replying(json!({ "ok": [
            { "index": 0, "value": "r", "text": "Red", "selected": true }
        ]}));
        let options = dom.select_options(NodeId(2)).await.unwrap();
        assert_eq!(options[0].text, "Red");
        assert!(options[0].selected);
    }

    #[test]
    fn registry_holds_elements_weakly() {
        assert!(PRELUDE.contains("fp.nodes.set(id, new WeakRef(el))"));
        assert!(PRELUDE.contains("fp.nodes.delete(id)"));
    }

    #[tokio::test]
    async fn editor_handle_is_released_after_set_value() {
        let dom = dom_replying(json!({ "ok": null }));
        dom.editor_set_value(EditorHandle(4), "x = 1").await.unwrap();
        let seen = dom.engine().seen.lock();
        assert!(seen[0].contains("fp.editors.delete(4); ed.setValue(\"x = 1\", -1)"));
    }

    #[test]
    fn space_key_uses_space_code() {
        let ctor = event_constructor(&EventKind::key_down(" "));
        assert!(ctor.starts_with("new KeyboardEvent(\"keydown\""));
        assert!(ctor.contains("code: \"Space\""));
    }
}
