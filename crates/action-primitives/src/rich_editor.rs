//! Fallback chain for filling the known rich-text editor (Ace).
//!
//! Nothing structural tells us whether an editor took the text, so this path
//! is best effort: when every tier is unavailable the fill is still reported
//! as done and a warning is logged.

use std::sync::Arc;

use async_trait::async_trait;
use dom_adapter::{DomPort, EditorAttachment, EditorHandle, EventKind, NodeId};
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::ActionError;
use crate::types::{ExecCtx, ExecutorTiming};

/// Hidden textarea Ace uses to capture keystrokes.
pub const CAPTURE_ELEMENT_SELECTOR: &str = "textarea.ace_text-input";

/// Visible content layer of an Ace editor.
pub const CONTENT_AREA_SELECTOR: &str = ".ace_content";

/// Looks for an editor instance hanging off a host element.
#[async_trait]
pub trait EditorProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn probe(
        &self,
        dom: &dyn DomPort,
        host: NodeId,
    ) -> Result<Option<EditorHandle>, ActionError>;
}

/// Probe for one fixed attachment point.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentProbe(pub EditorAttachment);

#[async_trait]
impl EditorProbe for AttachmentProbe {
    fn name(&self) -> &'static str {
        self.0.label()
    }

    async fn probe(
        &self,
        dom: &dyn DomPort,
        host: NodeId,
    ) -> Result<Option<EditorHandle>, ActionError> {
        Ok(dom.locate_editor(host, self.0).await?)
    }
}

/// `env.editor`, then `editor`, then the own-property scan.
pub fn default_probes() -> Vec<Arc<dyn EditorProbe>> {
    vec![
        Arc::new(AttachmentProbe(EditorAttachment::EnvEditor)),
        Arc::new(AttachmentProbe(EditorAttachment::EditorProperty)),
        Arc::new(AttachmentProbe(EditorAttachment::OwnPropertyScan)),
    ]
}

/// Which tier ended the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RichEditorTier {
    EditorApi,
    CaptureElement,
    InsertText,
    /// Every tier was unavailable or threw
    Unconfirmed,
}

pub async fn fill_rich_editor(
    dom: &dyn DomPort,
    ctx: &ExecCtx,
    host: NodeId,
    text: &str,
    probes: &[Arc<dyn EditorProbe>],
    timing: &ExecutorTiming,
) -> RichEditorTier {
    match via_editor_api(dom, host, text, probes).await {
        Ok(true) => return RichEditorTier::EditorApi,
        Ok(false) => debug!(action_id = %ctx.action_id, %host, "no editor instance located"),
        Err(err) => debug!(action_id = %ctx.action_id, %host, error = %err, "editor api threw"),
    }
    pause(timing).await;

    match via_capture_element(dom, host, text).await {
        Ok(true) => return RichEditorTier::CaptureElement,
        Ok(false) => debug!(action_id = %ctx.action_id, %host, "no capture element"),
        Err(err) => debug!(action_id = %ctx.action_id, %host, error = %err, "capture element fill threw"),
    }
    pause(timing).await;

    match via_insert_text(dom, host, text).await {
        Ok(true) => return RichEditorTier::InsertText,
        Ok(false) => debug!(action_id = %ctx.action_id, %host, "text insertion unavailable"),
        Err(err) => debug!(action_id = %ctx.action_id, %host, error = %err, "text insertion threw"),
    }

    warn!(
        action_id = %ctx.action_id,
        %host,
        "rich editor fill unconfirmed after every fallback"
    );
    RichEditorTier::Unconfirmed
}

async fn pause(timing: &ExecutorTiming) {
    let delay = timing.rich_editor_step_delay();
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

async fn via_editor_api(
    dom: &dyn DomPort,
    host: NodeId,
    text: &str,
    probes: &[Arc<dyn EditorProbe>],
) -> Result<bool, ActionError> {
    for probe in probes {
        match probe.probe(dom, host).await {
            Ok(Some(editor)) => {
                debug!(%host, probe = probe.name(), "editor instance located");
                dom.editor_set_value(editor, text).await?;
                return Ok(true);
            }
            Ok(None) => {}
            Err(err) => debug!(%host, probe = probe.name(), error = %err, "probe failed"),
        }
    }
    Ok(false)
}

async fn via_capture_element(
    dom: &dyn DomPort,
    host: NodeId,
    text: &str,
) -> Result<bool, ActionError> {
    let Some(capture) = dom
        .query_within(host, CAPTURE_ELEMENT_SELECTOR)
        .await?
        .into_iter()
        .next()
    else {
        return Ok(false);
    };
    dom.focus(capture).await?;
    dom.select_all_and_delete(capture).await?;
    dom.set_value(capture, text).await?;
    dom.dispatch_event(capture, EventKind::Input).await?;
    dom.dispatch_event(capture, EventKind::Change).await?;
    Ok(true)
}

async fn via_insert_text(dom: &dyn DomPort, host: NodeId, text: &str) -> Result<bool, ActionError> {
    let Some(content) = dom
        .query_within(host, CONTENT_AREA_SELECTOR)
        .await?
        .into_iter()
        .next()
    else {
        return Ok(false);
    };
    dom.click(content).await?;
    Ok(dom.insert_text(text).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_adapter::{Document, MemoryDom};

    fn run(dom: &MemoryDom, host: NodeId) -> RichEditorTier {
        let probes = default_probes();
        tokio_test::block_on(fill_rich_editor(
            dom,
            &ExecCtx::default(),
            host,
            "SELECT 1;",
            &probes,
            &ExecutorTiming::immediate(),
        ))
    }

    #[test]
    fn probes_are_tried_in_order() {
        let mut doc = Document::new();
        let host = doc.append(doc.body(), "div", &[("class", "ace_editor")]);
        let scanned = doc.attach_editor(host, EditorAttachment::OwnPropertyScan);
        let dom = MemoryDom::new(doc);

        assert_eq!(run(&dom, host), RichEditorTier::EditorApi);
        dom.with(|doc| assert_eq!(doc.editor(scanned).unwrap().value, "SELECT 1;"));
    }

    #[test]
    fn throwing_editor_falls_through_to_capture_element() {
        let mut doc = Document::new();
        let host = doc.append(doc.body(), "div", &[("class", "ace_editor")]);
        let capture = doc.append(host, "textarea", &[("class", "ace_text-input")]);
        let editor = doc.attach_editor(host, EditorAttachment::EnvEditor);
        if let Some(instance) = doc.editor_mut(editor) {
            instance.broken = true;
        }
        let dom = MemoryDom::new(doc);

        assert_eq!(run(&dom, host), RichEditorTier::CaptureElement);
        dom.with(|doc| {
            assert_eq!(doc.value(capture).as_deref(), Some("SELECT 1;"));
            let events = doc.events_on(capture);
            assert!(events.contains(&EventKind::Input));
            assert!(events.contains(&EventKind::Change));
        });
    }

    #[test]
    fn content_area_insertion_is_last_resort() {
        let mut doc = Document::new();
        let host = doc.append(doc.body(), "div", &[("class", "ace_editor")]);
        let content = doc.append(host, "div", &[("class", "ace_content"), ("contenteditable", "true")]);
        let dom = MemoryDom::new(doc);

        dom.with(|doc| doc.on(content, "click", |doc, ev| doc.set_active(Some(ev.target))));
        assert_eq!(run(&dom, host), RichEditorTier::InsertText);
        assert_eq!(dom.with(|doc| doc.text(content)), "SELECT 1;");
    }

    #[test]
    fn exhaustion_is_not_an_error() {
        let mut doc = Document::new();
        let host = doc.append(doc.body(), "div", &[("class", "ace_editor")]);
        let dom = MemoryDom::new(doc);
        assert_eq!(run(&dom, host), RichEditorTier::Unconfirmed);
    }
}
