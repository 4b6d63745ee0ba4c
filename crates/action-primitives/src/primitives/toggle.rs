//! Radio and checkbox primitives

use crate::{
    aria::run_aria_toggle,
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    state::read_toggle_state,
    types::{ActionReport, ExecCtx, InteractionMode, SkipReason, ToggleRole},
};
use chrono::Utc;
use dom_adapter::{DomPort, EventKind, NodeId};
use std::time::Instant;
use tracing::{debug, info};

/// Execute select_radio primitive
pub async fn execute_select_radio(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
) -> Result<ActionReport, ActionError> {
    info!(
        action_id = %ctx.action_id,
        selector = %selector,
        "Executing select_radio primitive"
    );
    execute_toggle(
        primitives,
        ctx,
        selector,
        ToggleRole::Radio,
        true,
        SkipReason::AlreadySelected,
    )
    .await
}

/// Execute select_checkbox primitive
pub async fn execute_select_checkbox(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    desired: bool,
) -> Result<ActionReport, ActionError> {
    info!(
        action_id = %ctx.action_id,
        selector = %selector,
        desired = desired,
        "Executing select_checkbox primitive"
    );
    execute_toggle(
        primitives,
        ctx,
        selector,
        ToggleRole::Checkbox,
        desired,
        SkipReason::AlreadyInState,
    )
    .await
}

/// Steps:
/// 1. Resolve the anchor, then the toggle control for `role`
/// 2. Skip when the control already reads as `desired`
/// 3. Native: focus and click, forcing `checked` if the click did not land
///    ARIA: run the escalation protocol
async fn execute_toggle(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    role: ToggleRole,
    desired: bool,
    skip_reason: SkipReason,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();
    let dom = primitives.dom();

    // 1. Resolve
    let anchor = primitives.resolve_anchor(selector).await?;
    let control = primitives
        .resolver()
        .resolve_toggle_control(dom, anchor, role)
        .await?
        .ok_or_else(|| ActionError::ControlNotFound {
            role: role.to_string(),
            selector: selector.to_string(),
        })?;
    debug!(
        action_id = %ctx.action_id,
        node = %control.node,
        mode = ?control.mode,
        "toggle control resolved"
    );

    // 2. Current state
    let state = read_toggle_state(dom, control.node).await?;
    if state.matches(desired) {
        info!(action_id = %ctx.action_id, reason = %skip_reason, "Toggle skipped");
        return Ok(finish(
            ActionReport::skipped(skip_reason, started_at, 0),
            start_instant,
            control.mode,
        ));
    }

    // 3. Apply
    match control.mode {
        InteractionMode::AriaWidget => {
            let tier = run_aria_toggle(
                dom,
                ctx,
                control.node,
                role,
                desired,
                primitives.timing(),
            )
            .await?;
            debug!(action_id = %ctx.action_id, ?tier, "aria toggle settled");
        }
        _ => toggle_native(dom, ctx, control.node, desired).await?,
    }

    info!(action_id = %ctx.action_id, role = %role, "Toggle completed successfully");
    Ok(finish(
        ActionReport::success(started_at, 0),
        start_instant,
        control.mode,
    ))
}

async fn toggle_native(
    dom: &dyn DomPort,
    ctx: &ExecCtx,
    node: NodeId,
    desired: bool,
) -> Result<(), ActionError> {
    dom.focus(node).await?;
    dom.click(node).await?;
    if dom.checked(node).await? != Some(desired) {
        debug!(action_id = %ctx.action_id, %node, "native click did not land; forcing checked");
        dom.set_checked(node, desired).await?;
        dom.dispatch_event(node, EventKind::Input).await?;
        dom.dispatch_event(node, EventKind::Change).await?;
    }
    Ok(())
}

fn finish(mut report: ActionReport, start: Instant, mode: InteractionMode) -> ActionReport {
    report.latency_ms = start.elapsed().as_millis() as u64;
    report.finished_at = Utc::now();
    report.with_mode(Some(mode))
}
