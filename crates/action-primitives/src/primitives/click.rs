//! Click primitive - pointer sequence followed by the native click

use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    types::{ActionReport, ExecCtx},
};
use chrono::Utc;
use dom_adapter::EventKind;
use std::time::Instant;
use tracing::{debug, info};

/// Execute click primitive
///
/// Steps:
/// 1. Resolve the anchor
/// 2. Scroll it into view
/// 3. Dispatch mousedown and mouseup
/// 4. Invoke the native click
///
/// A click leaves no state behind to verify, so success means nothing threw.
pub async fn execute_click(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        selector = %selector,
        "Executing click primitive"
    );

    // 1. Resolve anchor
    let node = primitives.resolve_anchor(selector).await?;
    let dom = primitives.dom();

    // 2-4. Pointer sequence
    debug!(action_id = %ctx.action_id, %node, "dispatching pointer sequence");
    dom.scroll_into_view(node).await?;
    dom.dispatch_event(node, EventKind::MouseDown).await?;
    dom.dispatch_event(node, EventKind::MouseUp).await?;
    dom.click(node).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        action_id = %ctx.action_id,
        latency_ms = latency_ms,
        "Click completed successfully"
    );
    Ok(ActionReport::success(started_at, latency_ms))
}
