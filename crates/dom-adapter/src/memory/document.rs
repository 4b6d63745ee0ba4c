//! Arena-backed document used by [`super::MemoryDom`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::selector::{SelectorList, SelectorTree};
use crate::error::{AdapterError, AdapterErrorKind};
use crate::port::{EditorAttachment, EditorHandle, EventKind, NodeId, SelectOption};

/// Listener bodies run with exclusive access to the document, like page script.
pub type Listener = Arc<dyn Fn(&mut Document, &DomEvent) + Send + Sync>;

const MAX_DISPATCH_DEPTH: usize = 32;

/// Event delivered to listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: NodeId,
    pub current_target: NodeId,
}

/// Who performed a recorded write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// The DOM port, i.e. the automation engine.
    Port,
    /// Listeners and default actions, i.e. the page itself.
    Page,
}

/// Observable history of the document, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalEntry {
    Event {
        target: NodeId,
        kind: EventKind,
    },
    Attribute {
        node: NodeId,
        name: String,
        value: String,
        origin: Origin,
    },
    Value {
        node: NodeId,
        value: String,
        origin: Origin,
    },
    Checked {
        node: NodeId,
        checked: bool,
        origin: Origin,
    },
    Scroll {
        node: NodeId,
    },
}

#[derive(Clone, Debug)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<usize>,
    children: Vec<usize>,
    attached: bool,
    text: String,
    value: String,
    checked: bool,
    selected_index: Option<usize>,
    editors: Vec<(EditorAttachment, usize)>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
            attached: true,
            text: String::new(),
            value: String::new(),
            checked: false,
            selected_index: None,
            editors: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn input_type(&self) -> String {
        self.attr("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    fn has_value_property(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select" | "option")
    }
}

/// Fake editor instance reachable through an attachment point.
#[derive(Clone, Debug, Default)]
pub struct EditorInstance {
    pub value: String,
    pub cursor_at_start: bool,
    pub set_value_calls: usize,
    /// When set, `setValue` throws.
    pub broken: bool,
}

/// In-memory HTML document with scripted listeners.
pub struct Document {
    nodes: Vec<Element>,
    root: usize,
    body: usize,
    active: Option<usize>,
    listeners: HashMap<(usize, &'static str), Vec<Listener>>,
    journal: Vec<JournalEntry>,
    editors: Vec<EditorInstance>,
    depth: usize,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("active", &self.active)
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorTree for Document {
    fn tag_of(&self, node: usize) -> &str {
        &self.nodes[node].tag
    }

    fn attr_of(&self, node: usize, name: &str) -> Option<&str> {
        self.nodes[node].attr(name)
    }

    fn parent_of(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }
}

impl Document {
    /// Empty `<html><body></body></html>` document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Element::new("html")],
            root: 0,
            body: 0,
            active: None,
            listeners: HashMap::new(),
            journal: Vec::new(),
            editors: Vec::new(),
            depth: 0,
        };
        doc.body = doc.append(NodeId(0), "body", &[]).0 as usize;
        doc
    }

    pub fn body(&self) -> NodeId {
        NodeId(self.body as u64)
    }

    // ---- building -------------------------------------------------------

    /// Appends a new element under `parent` and returns its handle.
    ///
    /// Builder calls are not journaled. `value`, `checked` and `selected`
    /// attributes seed the matching properties the way HTML parsing does.
    pub fn append(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let idx = self.nodes.len();
        let mut element = Element::new(tag);
        element.parent = Some(parent.0 as usize);
        element.attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        if let Some(value) = element.attr("value").map(str::to_string) {
            element.value = value;
        }
        element.checked = element.attr("checked").is_some();
        self.nodes.push(element);
        self.nodes[parent.0 as usize].children.push(idx);

        if tag.eq_ignore_ascii_case("option") {
            if let Some(select) = self.enclosing_select(idx) {
                if self.nodes[idx].attr("selected").is_some()
                    || self.nodes[select].selected_index.is_none()
                {
                    let position = self.option_indices(select).len() - 1;
                    self.nodes[select].selected_index = Some(position);
                }
            }
        }
        NodeId(idx as u64)
    }

    /// Sets the text of a freshly built element (also seeds `<textarea>` values).
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let element = &mut self.nodes[node.0 as usize];
        element.text = text.to_string();
        if element.tag == "textarea" {
            element.value = text.to_string();
        }
    }

    /// Registers a listener for `event` (DOM event type name) on `node`.
    pub fn on<F>(&mut self, node: NodeId, event: &'static str, listener: F)
    where
        F: Fn(&mut Document, &DomEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry((node.0 as usize, event))
            .or_default()
            .push(Arc::new(listener));
    }

    /// Hangs a fake editor instance off `node` at the given attachment point.
    pub fn attach_editor(&mut self, node: NodeId, attachment: EditorAttachment) -> EditorHandle {
        let idx = self.editors.len();
        self.editors.push(EditorInstance::default());
        self.nodes[node.0 as usize].editors.push((attachment, idx));
        EditorHandle(idx as u64)
    }

    pub fn editor(&self, handle: EditorHandle) -> Option<&EditorInstance> {
        self.editors.get(handle.0 as usize)
    }

    pub fn editor_mut(&mut self, handle: EditorHandle) -> Option<&mut EditorInstance> {
        self.editors.get_mut(handle.0 as usize)
    }

    // ---- page-script surface ---------------------------------------------

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.attr(name).map(str::to_string)
    }

    /// Attribute write performed by page script.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let _ = self.write_attribute(node, name, value, Origin::Page);
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.element(node).map(|e| e.checked).unwrap_or(false)
    }

    /// `checked` write performed by page script.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        let _ = self.write_checked(node, checked, Origin::Page);
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        self.value_of(node).ok().flatten()
    }

    pub fn text(&self, node: NodeId) -> String {
        self.text_of(node).unwrap_or_default()
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active.map(|idx| NodeId(idx as u64))
    }

    /// Focus change performed by page script (no events).
    pub fn set_active(&mut self, node: Option<NodeId>) {
        self.active = node.map(|n| n.0 as usize);
    }

    pub fn selected_index(&self, node: NodeId) -> Option<usize> {
        self.element(node).ok()?.selected_index
    }

    /// Dispatches an event on behalf of page script.
    pub fn dispatch(&mut self, node: NodeId, kind: EventKind) {
        let _ = self.fire(node, kind);
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Events observed on `node` (as target), in order.
    pub fn events_on(&self, node: NodeId) -> Vec<EventKind> {
        self.journal
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Event { target, kind } if *target == node => Some(kind.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    // ---- port surface ----------------------------------------------------

    pub(crate) fn element_handle(&self, node: NodeId) -> Result<usize, AdapterError> {
        let idx = node.0 as usize;
        match self.nodes.get(idx) {
            Some(element) if element.attached => Ok(idx),
            _ => Err(AdapterError::node_not_found(node)),
        }
    }

    fn element(&self, node: NodeId) -> Result<&Element, AdapterError> {
        let idx = self.element_handle(node)?;
        Ok(&self.nodes[idx])
    }

    pub(crate) fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, AdapterError> {
        let list = SelectorList::parse(selector)?;
        let mut out = Vec::new();
        self.collect_matches(self.root, &list, true, &mut out);
        Ok(out)
    }

    pub(crate) fn query_within(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, AdapterError> {
        let root = self.element_handle(root)?;
        let list = SelectorList::parse(selector)?;
        let mut out = Vec::new();
        self.collect_matches(root, &list, false, &mut out);
        Ok(out)
    }

    fn collect_matches(
        &self,
        node: usize,
        list: &SelectorList,
        include_self: bool,
        out: &mut Vec<NodeId>,
    ) {
        if include_self && list.matches(self, node) {
            out.push(NodeId(node as u64));
        }
        for &child in &self.nodes[node].children {
            self.collect_matches(child, list, true, out);
        }
    }

    pub(crate) fn parent_of_node(&self, node: NodeId) -> Result<Option<NodeId>, AdapterError> {
        Ok(self
            .element(node)?
            .parent
            .map(|idx| NodeId(idx as u64)))
    }

    pub(crate) fn closest(
        &self,
        node: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, AdapterError> {
        let mut cursor = Some(self.element_handle(node)?);
        let list = SelectorList::parse(selector)?;
        while let Some(idx) = cursor {
            if list.matches(self, idx) {
                return Ok(Some(NodeId(idx as u64)));
            }
            cursor = self.nodes[idx].parent;
        }
        Ok(None)
    }

    pub(crate) fn tag_name(&self, node: NodeId) -> Result<String, AdapterError> {
        Ok(self.element(node)?.tag.clone())
    }

    pub(crate) fn write_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &str,
        origin: Origin,
    ) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        let name = name.to_ascii_lowercase();
        let element = &mut self.nodes[idx];
        match element.attributes.iter().position(|(k, _)| *k == name) {
            Some(pos) => element.attributes[pos].1 = value.to_string(),
            None => element.attributes.push((name.clone(), value.to_string())),
        }
        self.journal.push(JournalEntry::Attribute {
            node,
            name,
            value: value.to_string(),
            origin,
        });
        Ok(())
    }

    pub(crate) fn checked_property(&self, node: NodeId) -> Result<Option<bool>, AdapterError> {
        let element = self.element(node)?;
        Ok((element.tag == "input").then_some(element.checked))
    }

    pub(crate) fn write_checked(
        &mut self,
        node: NodeId,
        checked: bool,
        origin: Origin,
    ) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        self.nodes[idx].checked = checked;
        self.journal.push(JournalEntry::Checked {
            node,
            checked,
            origin,
        });
        Ok(())
    }

    pub(crate) fn value_of(&self, node: NodeId) -> Result<Option<String>, AdapterError> {
        let idx = self.element_handle(node)?;
        let element = &self.nodes[idx];
        if !element.has_value_property() {
            return Ok(None);
        }
        match element.tag.as_str() {
            "select" => Ok(Some(
                element
                    .selected_index
                    .and_then(|pos| self.option_indices(idx).get(pos).copied())
                    .map(|opt| self.option_value(opt))
                    .unwrap_or_default(),
            )),
            "option" => Ok(Some(self.option_value(idx))),
            _ => Ok(Some(element.value.clone())),
        }
    }

    pub(crate) fn write_value(
        &mut self,
        node: NodeId,
        value: &str,
        origin: Origin,
    ) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        if self.nodes[idx].tag == "select" {
            let matching = self
                .option_indices(idx)
                .iter()
                .position(|&opt| self.option_value(opt) == value);
            self.nodes[idx].selected_index = matching;
        } else if self.nodes[idx].has_value_property() {
            self.nodes[idx].value = value.to_string();
        } else {
            return Err(AdapterError::new(AdapterErrorKind::Unsupported)
                .with_hint(format!("<{}> has no value property", self.nodes[idx].tag)));
        }
        self.journal.push(JournalEntry::Value {
            node,
            value: value.to_string(),
            origin,
        });
        Ok(())
    }

    pub(crate) fn is_content_editable(&self, node: NodeId) -> Result<bool, AdapterError> {
        let mut cursor = Some(self.element_handle(node)?);
        while let Some(idx) = cursor {
            if let Some(flag) = self.nodes[idx].attr("contenteditable") {
                let flag = flag.trim().to_ascii_lowercase();
                return Ok(matches!(flag.as_str(), "" | "true" | "plaintext-only"));
            }
            cursor = self.nodes[idx].parent;
        }
        Ok(false)
    }

    pub(crate) fn is_visible(&self, node: NodeId) -> Result<bool, AdapterError> {
        let start = self.element_handle(node)?;
        let element = &self.nodes[start];
        if element.tag == "input" && element.input_type() == "hidden" {
            return Ok(false);
        }
        let mut cursor = Some(start);
        while let Some(idx) = cursor {
            let element = &self.nodes[idx];
            if element.attr("hidden").is_some() {
                return Ok(false);
            }
            if let Some(style) = element.attr("style") {
                let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
                let compact = compact.to_ascii_lowercase();
                if compact.contains("display:none") || compact.contains("visibility:hidden") {
                    return Ok(false);
                }
            }
            cursor = element.parent;
        }
        Ok(true)
    }

    pub(crate) fn text_of(&self, node: NodeId) -> Result<String, AdapterError> {
        let idx = self.element_handle(node)?;
        let mut out = String::new();
        self.collect_text(idx, &mut out);
        Ok(out)
    }

    fn collect_text(&self, idx: usize, out: &mut String) {
        out.push_str(&self.nodes[idx].text);
        for &child in &self.nodes[idx].children {
            self.collect_text(child, out);
        }
    }

    pub(crate) fn write_text(&mut self, node: NodeId, text: &str) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        let children = std::mem::take(&mut self.nodes[idx].children);
        for child in children {
            self.detach(child);
        }
        self.nodes[idx].text = text.to_string();
        Ok(())
    }

    fn detach(&mut self, idx: usize) {
        self.nodes[idx].attached = false;
        let children = self.nodes[idx].children.clone();
        for child in children {
            self.detach(child);
        }
        if self.active == Some(idx) {
            self.active = None;
        }
    }

    fn enclosing_select(&self, option: usize) -> Option<usize> {
        let mut cursor = self.nodes[option].parent;
        while let Some(idx) = cursor {
            if self.nodes[idx].tag == "select" {
                return Some(idx);
            }
            cursor = self.nodes[idx].parent;
        }
        None
    }

    fn option_indices(&self, select: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_options(select, &mut out);
        out
    }

    fn collect_options(&self, idx: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[idx].children {
            if self.nodes[child].tag == "option" {
                out.push(child);
            } else {
                self.collect_options(child, out);
            }
        }
    }

    fn option_value(&self, option: usize) -> String {
        match self.nodes[option].attr("value") {
            Some(value) => value.to_string(),
            None => {
                let mut text = String::new();
                self.collect_text(option, &mut text);
                text.trim().to_string()
            }
        }
    }

    pub(crate) fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, AdapterError> {
        let idx = self.element_handle(node)?;
        if self.nodes[idx].tag != "select" {
            return Ok(Vec::new());
        }
        let selected = self.nodes[idx].selected_index;
        Ok(self
            .option_indices(idx)
            .into_iter()
            .enumerate()
            .map(|(pos, opt)| {
                let mut text = String::new();
                self.collect_text(opt, &mut text);
                SelectOption {
                    index: pos,
                    value: self.option_value(opt),
                    text,
                    selected: selected == Some(pos),
                }
            })
            .collect())
    }

    pub(crate) fn select_index(&mut self, node: NodeId, index: usize) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        let options = self.option_indices(idx);
        if self.nodes[idx].tag != "select" || index >= options.len() {
            return Err(AdapterError::new(AdapterErrorKind::Unsupported)
                .with_hint(format!("no option {} on {}", index, node)));
        }
        self.nodes[idx].selected_index = Some(index);
        let value = self.option_value(options[index]);
        self.journal.push(JournalEntry::Value {
            node,
            value,
            origin: Origin::Port,
        });
        Ok(())
    }

    fn is_text_control(&self, idx: usize) -> bool {
        let element = &self.nodes[idx];
        element.tag == "textarea" || element.tag == "input"
    }

    pub(crate) fn select_all_and_delete(&mut self, node: NodeId) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        if self.is_text_control(idx) {
            if !self.nodes[idx].value.is_empty() {
                self.write_value(node, "", Origin::Page)?;
                self.fire(node, EventKind::Input)?;
            }
        } else if self.is_content_editable(node)? {
            if !self.text_of(node)?.is_empty() {
                self.write_text(node, "")?;
                self.fire(node, EventKind::Input)?;
            }
        }
        Ok(())
    }

    pub(crate) fn insert_text(&mut self, text: &str) -> Result<bool, AdapterError> {
        let Some(active) = self.active else {
            return Ok(false);
        };
        let node = NodeId(active as u64);
        if self.is_text_control(active) {
            let next = format!("{}{}", self.nodes[active].value, text);
            self.write_value(node, &next, Origin::Page)?;
        } else if self.is_content_editable(node)? {
            let next = format!("{}{}", self.text_of(node)?, text);
            self.write_text(node, &next)?;
        } else {
            return Ok(false);
        }
        self.fire(node, EventKind::Input)?;
        Ok(true)
    }

    pub(crate) fn focus(&mut self, node: NodeId) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        if self.active == Some(idx) {
            return Ok(());
        }
        if let Some(previous) = self.active {
            self.fire(NodeId(previous as u64), EventKind::Blur)?;
        }
        self.active = Some(idx);
        self.fire(node, EventKind::Focus)
    }

    pub(crate) fn blur(&mut self, node: NodeId) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        if self.active != Some(idx) {
            return Ok(());
        }
        self.active = None;
        self.fire(node, EventKind::Blur)
    }

    pub(crate) fn scroll_into_view(&mut self, node: NodeId) -> Result<(), AdapterError> {
        self.element_handle(node)?;
        self.journal.push(JournalEntry::Scroll { node });
        Ok(())
    }

    /// Native `click()`: dispatches `click`, then runs the default action.
    pub(crate) fn click(&mut self, node: NodeId) -> Result<(), AdapterError> {
        let idx = self.element_handle(node)?;
        self.fire(node, EventKind::Click)?;

        let element = &self.nodes[idx];
        if element.tag != "input" || element.attr("disabled").is_some() {
            return Ok(());
        }
        match element.input_type().as_str() {
            "checkbox" => {
                let next = !element.checked;
                self.write_checked(node, next, Origin::Page)?;
                self.fire(node, EventKind::Input)?;
                self.fire(node, EventKind::Change)?;
            }
            "radio" if !element.checked => {
                let group = element.attr("name").map(str::to_string);
                if let Some(group) = group {
                    let peers = self.query_all(&format!(
                        "input[name=\"{}\"]",
                        group.replace('"', "\\\"")
                    ))?;
                    for peer in peers {
                        if peer != node && self.checked(peer) {
                            self.write_checked(peer, false, Origin::Page)?;
                        }
                    }
                }
                self.write_checked(node, true, Origin::Page)?;
                self.fire(node, EventKind::Input)?;
                self.fire(node, EventKind::Change)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Journals the event on its target and runs listeners along the bubbling path.
    pub(crate) fn fire(&mut self, node: NodeId, kind: EventKind) -> Result<(), AdapterError> {
        let target = self.element_handle(node)?;
        self.journal.push(JournalEntry::Event {
            target: node,
            kind: kind.clone(),
        });
        if self.depth >= MAX_DISPATCH_DEPTH {
            trace!(%node, event = %kind, "dispatch depth exceeded; listeners skipped");
            return Ok(());
        }

        let mut path = vec![target];
        if kind.bubbles() {
            let mut cursor = self.nodes[target].parent;
            while let Some(idx) = cursor {
                path.push(idx);
                cursor = self.nodes[idx].parent;
            }
        }

        self.depth += 1;
        for current in path {
            let listeners = self
                .listeners
                .get(&(current, kind.name()))
                .cloned()
                .unwrap_or_default();
            let event = DomEvent {
                kind: kind.clone(),
                target: node,
                current_target: NodeId(current as u64),
            };
            for listener in listeners {
                listener(self, &event);
            }
        }
        self.depth -= 1;
        Ok(())
    }

    pub(crate) fn locate_editor(
        &self,
        node: NodeId,
        attachment: EditorAttachment,
    ) -> Result<Option<EditorHandle>, AdapterError> {
        Ok(self
            .element(node)?
            .editors
            .iter()
            .find(|(kind, _)| *kind == attachment)
            .map(|(_, idx)| EditorHandle(*idx as u64)))
    }

    pub(crate) fn editor_set_value(
        &mut self,
        handle: EditorHandle,
        text: &str,
    ) -> Result<(), AdapterError> {
        let editor = self.editors.get_mut(handle.0 as usize).ok_or_else(|| {
            AdapterError::new(AdapterErrorKind::NodeNotFound)
                .with_hint(format!("editor {}", handle.0))
        })?;
        if editor.broken {
            return Err(AdapterError::new(AdapterErrorKind::Script)
                .with_hint("editor.setValue threw"));
        }
        editor.value = text.to_string();
        editor.cursor_at_start = true;
        editor.set_value_calls += 1;
        Ok(())
    }
}
