//! Fill-text primitive - native fields, contenteditable and the rich editor

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    rich_editor::{fill_rich_editor, RichEditorTier},
    types::{ActionReport, ExecCtx, InteractionMode},
};
use chrono::Utc;
use dom_adapter::{DomPort, EventKind, NodeId};
use std::time::Instant;
use tracing::{debug, info};

/// Execute fill_text primitive
///
/// Steps:
/// 1. Resolve the anchor
/// 2. Resolve the text target and its interaction mode
/// 3. Write the text the way that mode expects, with `input` and `change`
///    dispatched so page frameworks notice
/// 4. Generate action report
pub async fn execute_fill_text(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    text: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        selector = %selector,
        text_length = text.len(),
        "Executing fill_text primitive"
    );

    // 1. Resolve anchor
    let anchor = primitives.resolve_anchor(selector).await?;

    // 2. Resolve text target
    let dom = primitives.dom();
    let control = primitives
        .resolver()
        .resolve_text_target(dom, anchor)
        .await?
        .ok_or_else(|| ActionError::NotATextInput(selector.to_string()))?;
    debug!(
        action_id = %ctx.action_id,
        node = %control.node,
        mode = ?control.mode,
        "text target resolved"
    );

    // 3. Write
    match control.mode {
        InteractionMode::NativeInput => fill_native(dom, control.node, text).await?,
        InteractionMode::ContentEditable => fill_content_editable(dom, control.node, text).await?,
        InteractionMode::RichEditor => {
            let tier = fill_rich_editor(
                dom,
                ctx,
                control.node,
                text,
                primitives.probes(),
                primitives.timing(),
            )
            .await;
            if tier != RichEditorTier::Unconfirmed {
                debug!(action_id = %ctx.action_id, ?tier, "rich editor filled");
            }
        }
        InteractionMode::AriaWidget => {
            return Err(ActionError::NotATextInput(selector.to_string()));
        }
    }

    // 4. Generate report
    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        action_id = %ctx.action_id,
        latency_ms = latency_ms,
        "Fill text completed successfully"
    );
    Ok(ActionReport::success(started_at, latency_ms).with_mode(Some(control.mode)))
}

async fn fill_native(dom: &dyn DomPort, node: NodeId, text: &str) -> Result<(), ActionError> {
    dom.focus(node).await?;
    dom.set_value(node, text).await?;
    dom.dispatch_event(node, EventKind::Input).await?;
    dom.dispatch_event(node, EventKind::Change).await?;
    dom.blur(node).await?;
    Ok(())
}

async fn fill_content_editable(
    dom: &dyn DomPort,
    node: NodeId,
    text: &str,
) -> Result<(), ActionError> {
    dom.scroll_into_view(node).await?;
    dom.focus(node).await?;
    dom.select_all_and_delete(node).await?;
    dom.set_text_content(node, text).await?;
    dom.dispatch_event(node, EventKind::Input).await?;
    dom.dispatch_event(node, EventKind::Change).await?;
    dom.blur(node).await?;
    Ok(())
}
