//! Element classifier: stateless predicates over a DOM node

use dom_adapter::{DomPort, NodeId};

use crate::errors::ActionError;

/// Marker class of the one rich-text editor integration we know (Ace).
pub const RICH_EDITOR_SELECTOR: &str = ".ace_editor";

/// Native input types that do not take free text.
const NON_TEXT_INPUT_TYPES: [&str; 10] = [
    "button", "submit", "reset", "checkbox", "radio", "file", "image", "range", "color", "hidden",
];

/// Effective `type` of a native `<input>` (defaulting to "text"), `None` for
/// any other element.
pub async fn native_input_type(
    dom: &dyn DomPort,
    node: NodeId,
) -> Result<Option<String>, ActionError> {
    if dom.tag_name(node).await? != "input" {
        return Ok(None);
    }
    let kind = dom
        .attribute(node, "type")
        .await?
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string());
    Ok(Some(kind))
}

pub async fn is_native_input_of_kind(
    dom: &dyn DomPort,
    node: NodeId,
    kind: &str,
) -> Result<bool, ActionError> {
    Ok(native_input_type(dom, node)
        .await?
        .map(|t| t.eq_ignore_ascii_case(kind))
        .unwrap_or(false))
}

/// Textareas and free-text single-line inputs.
pub async fn is_standard_text_entry(dom: &dyn DomPort, node: NodeId) -> Result<bool, ActionError> {
    if dom.tag_name(node).await? == "textarea" {
        return Ok(true);
    }
    Ok(native_input_type(dom, node)
        .await?
        .map(|t| !NON_TEXT_INPUT_TYPES.contains(&t.as_str()))
        .unwrap_or(false))
}

pub async fn is_aria_editable(dom: &dyn DomPort, node: NodeId) -> Result<bool, ActionError> {
    if dom.is_content_editable(node).await? {
        return Ok(true);
    }
    if dom.attribute(node, "contenteditable").await?.as_deref() == Some("true") {
        return Ok(true);
    }
    has_aria_role(dom, node, "textbox").await
}

pub async fn has_aria_role(
    dom: &dyn DomPort,
    node: NodeId,
    role: &str,
) -> Result<bool, ActionError> {
    Ok(dom
        .attribute(node, "role")
        .await?
        .map(|r| r.trim().eq_ignore_ascii_case(role))
        .unwrap_or(false))
}

pub async fn is_hidden_native_input(dom: &dyn DomPort, node: NodeId) -> Result<bool, ActionError> {
    is_native_input_of_kind(dom, node, "hidden").await
}

/// Host element of the known rich editor when `node` is the host, sits inside
/// one, or contains one.
pub async fn find_known_rich_editor(
    dom: &dyn DomPort,
    node: NodeId,
) -> Result<Option<NodeId>, ActionError> {
    if let Some(host) = dom.closest(node, RICH_EDITOR_SELECTOR).await? {
        return Ok(Some(host));
    }
    Ok(dom
        .query_within(node, RICH_EDITOR_SELECTOR)
        .await?
        .into_iter()
        .next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_adapter::{Document, MemoryDom};

    #[tokio::test]
    async fn text_entry_excludes_non_text_types() {
        let mut doc = Document::new();
        let body = doc.body();
        let plain = doc.append(body, "input", &[]);
        let email = doc.append(body, "input", &[("type", "EMAIL")]);
        let radio = doc.append(body, "input", &[("type", "radio")]);
        let area = doc.append(body, "textarea", &[]);
        let div = doc.append(body, "div", &[]);
        let dom = MemoryDom::new(doc);

        assert!(is_standard_text_entry(&dom, plain).await.unwrap());
        assert!(is_standard_text_entry(&dom, email).await.unwrap());
        assert!(is_standard_text_entry(&dom, area).await.unwrap());
        assert!(!is_standard_text_entry(&dom, radio).await.unwrap());
        assert!(!is_standard_text_entry(&dom, div).await.unwrap());
        assert!(is_native_input_of_kind(&dom, plain, "TEXT").await.unwrap());
        assert!(is_native_input_of_kind(&dom, radio, "radio").await.unwrap());
    }

    #[tokio::test]
    async fn aria_editable_signals() {
        let mut doc = Document::new();
        let body = doc.body();
        let textbox = doc.append(body, "div", &[("role", "TextBox")]);
        let editable = doc.append(body, "div", &[("contenteditable", "true")]);
        let inherited = doc.append(editable, "span", &[]);
        let off = doc.append(body, "div", &[("contenteditable", "false")]);
        let dom = MemoryDom::new(doc);

        assert!(is_aria_editable(&dom, textbox).await.unwrap());
        assert!(is_aria_editable(&dom, editable).await.unwrap());
        assert!(is_aria_editable(&dom, inherited).await.unwrap());
        assert!(!is_aria_editable(&dom, off).await.unwrap());
    }

    #[tokio::test]
    async fn rich_editor_found_above_and_below() {
        let mut doc = Document::new();
        let body = doc.body();
        let wrapper = doc.append(body, "div", &[("class", "question")]);
        let host = doc.append(wrapper, "div", &[("class", "ace_editor ace-tm")]);
        let capture = doc.append(host, "textarea", &[("class", "ace_text-input")]);
        let other = doc.append(body, "div", &[]);
        let dom = MemoryDom::new(doc);

        assert_eq!(find_known_rich_editor(&dom, wrapper).await.unwrap(), Some(host));
        assert_eq!(find_known_rich_editor(&dom, host).await.unwrap(), Some(host));
        assert_eq!(find_known_rich_editor(&dom, capture).await.unwrap(), Some(host));
        assert_eq!(find_known_rich_editor(&dom, other).await.unwrap(), None);
    }
}
