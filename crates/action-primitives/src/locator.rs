//! Control resolver: from an anchor element to the node that actually takes
//! the interaction, plus the mode to drive it with.
//!
//! Selectors coming from the analysis backend point at labels, list items and
//! wrappers as often as at the literal control, so every resolution looks at
//! the anchor itself first and its subtree second.

use async_recursion::async_recursion;
use async_trait::async_trait;
use dom_adapter::{DomPort, NodeId};
use tracing::debug;

use crate::classify::{
    find_known_rich_editor, has_aria_role, is_aria_editable, is_hidden_native_input,
    is_native_input_of_kind, is_standard_text_entry,
};
use crate::errors::ActionError;
use crate::types::{InteractionMode, ResolvedControl, ToggleRole};

/// Anything that can hold text, in the order a descendant search prefers.
pub const TEXT_ENTRY_QUERY: &str = r#"input, textarea, [contenteditable="true"], [role="textbox"]"#;

/// Suffix of the visible twin some form builders render next to a hidden input.
pub const VISIBLE_TWIN_SUFFIX: &str = "_visible";

/// Wrapper classes used by common form builders around one question.
pub const FORM_WIDGET_CONTAINERS: &str = ".form-group, .form-field, .field-wrapper, .Qr7Oae, \
     .freebirdFormviewerComponentsQuestionBaseRoot";

const MAX_TEXT_RESOLUTION_DEPTH: u8 = 4;

/// What a dropdown action should drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownTarget {
    /// Native `<select>`
    Native(NodeId),
    /// ARIA listbox or combobox that must be opened first
    Listbox(NodeId),
    /// A single ARIA option; selection is left to the enclosing widget
    Option(NodeId),
}

/// Resolution seam used by the executor.
#[async_trait]
pub trait ControlResolver: Send + Sync {
    /// First element matching `selector`.
    async fn resolve_anchor(
        &self,
        dom: &dyn DomPort,
        selector: &str,
    ) -> Result<NodeId, ActionError>;

    async fn resolve_text_target(
        &self,
        dom: &dyn DomPort,
        anchor: NodeId,
    ) -> Result<Option<ResolvedControl>, ActionError>;

    async fn resolve_toggle_control(
        &self,
        dom: &dyn DomPort,
        anchor: NodeId,
        role: ToggleRole,
    ) -> Result<Option<ResolvedControl>, ActionError>;

    async fn resolve_dropdown(
        &self,
        dom: &dyn DomPort,
        anchor: NodeId,
    ) -> Result<Option<DropdownTarget>, ActionError>;
}

/// Resolver that works purely from markup structure and ARIA attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralResolver;

#[async_trait]
impl ControlResolver for StructuralResolver {
    async fn resolve_anchor(
        &self,
        dom: &dyn DomPort,
        selector: &str,
    ) -> Result<NodeId, ActionError> {
        dom.query_selector(selector)
            .await?
            .ok_or_else(|| ActionError::AnchorNotFound(selector.to_string()))
    }

    async fn resolve_text_target(
        &self,
        dom: &dyn DomPort,
        anchor: NodeId,
    ) -> Result<Option<ResolvedControl>, ActionError> {
        resolve_text_from(dom, anchor, 0).await
    }

    async fn resolve_toggle_control(
        &self,
        dom: &dyn DomPort,
        anchor: NodeId,
        role: ToggleRole,
    ) -> Result<Option<ResolvedControl>, ActionError> {
        let kind = role.as_str();

        if is_native_input_of_kind(dom, anchor, kind).await? {
            return Ok(Some(ResolvedControl::new(anchor, InteractionMode::NativeInput)));
        }
        if has_aria_role(dom, anchor, kind).await? {
            return Ok(Some(ResolvedControl::new(anchor, InteractionMode::AriaWidget)));
        }

        for node in dom.query_within(anchor, "input").await? {
            if is_native_input_of_kind(dom, node, kind).await? {
                debug!(%anchor, %node, role = kind, "toggle resolved to descendant input");
                return Ok(Some(ResolvedControl::new(node, InteractionMode::NativeInput)));
            }
        }
        for node in dom.query_within(anchor, "[role]").await? {
            if has_aria_role(dom, node, kind).await? {
                debug!(%anchor, %node, role = kind, "toggle resolved to descendant widget");
                return Ok(Some(ResolvedControl::new(node, InteractionMode::AriaWidget)));
            }
        }
        Ok(None)
    }

    async fn resolve_dropdown(
        &self,
        dom: &dyn DomPort,
        anchor: NodeId,
    ) -> Result<Option<DropdownTarget>, ActionError> {
        if dom.tag_name(anchor).await? == "select" {
            return Ok(Some(DropdownTarget::Native(anchor)));
        }
        if has_aria_role(dom, anchor, "option").await? {
            return Ok(Some(DropdownTarget::Option(anchor)));
        }
        if has_aria_role(dom, anchor, "listbox").await?
            || has_aria_role(dom, anchor, "combobox").await?
        {
            return Ok(Some(DropdownTarget::Listbox(anchor)));
        }
        Ok(dom
            .query_within(anchor, "select")
            .await?
            .into_iter()
            .next()
            .map(DropdownTarget::Native))
    }
}

#[async_recursion]
async fn resolve_text_from(
    dom: &dyn DomPort,
    node: NodeId,
    depth: u8,
) -> Result<Option<ResolvedControl>, ActionError> {
    if depth > MAX_TEXT_RESOLUTION_DEPTH {
        debug!(%node, "text resolution depth exhausted");
        return Ok(None);
    }

    // 1. specialised widgets first
    if let Some(host) = find_known_rich_editor(dom, node).await? {
        debug!(%node, %host, "rich editor host found");
        return Ok(Some(ResolvedControl::new(host, InteractionMode::RichEditor)));
    }

    // 2. plain native field
    if is_standard_text_entry(dom, node).await? {
        return Ok(Some(ResolvedControl::new(node, InteractionMode::NativeInput)));
    }

    // 3. contenteditable / role=textbox
    if is_aria_editable(dom, node).await? {
        return Ok(Some(ResolvedControl::new(node, InteractionMode::ContentEditable)));
    }

    // 4. hidden input backed by a visible twin
    if is_hidden_native_input(dom, node).await? {
        return match visible_counterpart(dom, node).await? {
            Some(visible) => {
                debug!(%node, %visible, "hidden input mapped to visible entry");
                resolve_text_from(dom, visible, depth + 1).await
            }
            None => Ok(None),
        };
    }

    // 5. first text-capable descendant
    if let Some(inner) = dom.query_within(node, TEXT_ENTRY_QUERY).await?.into_iter().next() {
        debug!(%node, %inner, "descending into text-capable child");
        return resolve_text_from(dom, inner, depth + 1).await;
    }

    Ok(None)
}

async fn visible_counterpart(
    dom: &dyn DomPort,
    hidden: NodeId,
) -> Result<Option<NodeId>, ActionError> {
    let name = dom.attribute(hidden, "name").await?.unwrap_or_default();
    if !name.is_empty() {
        if let Some(parent) = dom.parent(hidden).await? {
            let twin = format!(
                "[name=\"{}{}\"]",
                name.replace('\\', "\\\\").replace('"', "\\\""),
                VISIBLE_TWIN_SUFFIX
            );
            for candidate in dom.query_within(parent, &twin).await? {
                if dom.is_visible(candidate).await? {
                    return Ok(Some(candidate));
                }
            }
        }
    }

    let Some(container) = dom.closest(hidden, FORM_WIDGET_CONTAINERS).await? else {
        return Ok(None);
    };
    for candidate in dom.query_within(container, TEXT_ENTRY_QUERY).await? {
        if candidate == hidden || !dom.is_visible(candidate).await? {
            continue;
        }
        if is_standard_text_entry(dom, candidate).await? || is_aria_editable(dom, candidate).await?
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_adapter::{Document, MemoryDom};

    async fn text_target(dom: &MemoryDom, anchor: NodeId) -> Option<ResolvedControl> {
        StructuralResolver
            .resolve_text_target(dom, anchor)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn rich_editor_outranks_native_capture_element() {
        let mut doc = Document::new();
        let body = doc.body();
        let host = doc.append(body, "div", &[("class", "ace_editor")]);
        let capture = doc.append(host, "textarea", &[("class", "ace_text-input")]);
        let dom = MemoryDom::new(doc);

        let resolved = text_target(&dom, capture).await.unwrap();
        assert_eq!(resolved, ResolvedControl::new(host, InteractionMode::RichEditor));
    }

    #[tokio::test]
    async fn wrapper_descends_to_first_field() {
        let mut doc = Document::new();
        let body = doc.body();
        let label = doc.append(body, "label", &[]);
        let field = doc.append(label, "input", &[("type", "email")]);
        let dom = MemoryDom::new(doc);

        let resolved = text_target(&dom, label).await.unwrap();
        assert_eq!(resolved, ResolvedControl::new(field, InteractionMode::NativeInput));
    }

    #[tokio::test]
    async fn role_textbox_is_content_editable_mode() {
        let mut doc = Document::new();
        let body = doc.body();
        let textbox = doc.append(body, "div", &[("role", "textbox")]);
        let dom = MemoryDom::new(doc);

        let resolved = text_target(&dom, textbox).await.unwrap();
        assert_eq!(resolved.mode, InteractionMode::ContentEditable);
    }

    #[tokio::test]
    async fn hidden_input_uses_visible_twin() {
        let mut doc = Document::new();
        let body = doc.body();
        let row = doc.append(body, "div", &[]);
        let hidden = doc.append(row, "input", &[("type", "hidden"), ("name", "city")]);
        let twin = doc.append(row, "input", &[("name", "city_visible")]);
        let dom = MemoryDom::new(doc);

        let resolved = text_target(&dom, hidden).await.unwrap();
        assert_eq!(resolved, ResolvedControl::new(twin, InteractionMode::NativeInput));
    }

    #[tokio::test]
    async fn hidden_input_falls_back_to_question_container() {
        let mut doc = Document::new();
        let body = doc.body();
        let question = doc.append(body, "div", &[("class", "Qr7Oae")]);
        let hidden = doc.append(question, "input", &[("type", "hidden"), ("name", "entry.1")]);
        let collapsed = doc.append(question, "input", &[("style", "display:none")]);
        let shown = doc.append(question, "textarea", &[]);
        let dom = MemoryDom::new(doc);

        let resolved = text_target(&dom, hidden).await.unwrap();
        assert_ne!(resolved.node, collapsed);
        assert_eq!(resolved, ResolvedControl::new(shown, InteractionMode::NativeInput));
    }

    #[tokio::test]
    async fn unresolvable_text_target_is_none() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.append(body, "button", &[]);
        let lonely = doc.append(body, "input", &[("type", "hidden"), ("name", "csrf")]);
        let dom = MemoryDom::new(doc);

        assert!(text_target(&dom, button).await.is_none());
        assert!(text_target(&dom, lonely).await.is_none());
    }

    #[tokio::test]
    async fn toggle_prefers_self_then_native_descendant() {
        let mut doc = Document::new();
        let body = doc.body();
        let item = doc.append(body, "li", &[]);
        let aria = doc.append(item, "div", &[("role", "Checkbox")]);
        let native = doc.append(item, "input", &[("type", "checkbox")]);
        let dom = MemoryDom::new(doc);
        let resolver = StructuralResolver;

        let from_item = resolver
            .resolve_toggle_control(&dom, item, ToggleRole::Checkbox)
            .await
            .unwrap();
        assert_eq!(
            from_item,
            Some(ResolvedControl::new(native, InteractionMode::NativeInput))
        );
        let from_aria = resolver
            .resolve_toggle_control(&dom, aria, ToggleRole::Checkbox)
            .await
            .unwrap();
        assert_eq!(
            from_aria,
            Some(ResolvedControl::new(aria, InteractionMode::AriaWidget))
        );
        let radio = resolver
            .resolve_toggle_control(&dom, item, ToggleRole::Radio)
            .await
            .unwrap();
        assert_eq!(radio, None);
    }

    #[tokio::test]
    async fn dropdown_targets() {
        let mut doc = Document::new();
        let body = doc.body();
        let wrapper = doc.append(body, "div", &[]);
        let select = doc.append(wrapper, "select", &[]);
        let combo = doc.append(body, "div", &[("role", "combobox")]);
        let option = doc.append(body, "div", &[("role", "option")]);
        let plain = doc.append(body, "span", &[]);
        let dom = MemoryDom::new(doc);
        let resolver = StructuralResolver;

        assert_eq!(
            resolver.resolve_dropdown(&dom, wrapper).await.unwrap(),
            Some(DropdownTarget::Native(select))
        );
        assert_eq!(
            resolver.resolve_dropdown(&dom, combo).await.unwrap(),
            Some(DropdownTarget::Listbox(combo))
        );
        assert_eq!(
            resolver.resolve_dropdown(&dom, option).await.unwrap(),
            Some(DropdownTarget::Option(option))
        );
        assert_eq!(resolver.resolve_dropdown(&dom, plain).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_anchor_reports_selector() {
        let dom = MemoryDom::default();
        let err = StructuralResolver
            .resolve_anchor(&dom, "#nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "element not found: #nope");
    }
}
