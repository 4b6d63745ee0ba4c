//! Select primitive - native `<select>` and ARIA listbox/option widgets

use crate::{
    errors::ActionError,
    locator::DropdownTarget,
    primitives::DefaultActionPrimitives,
    types::{ActionReport, ExecCtx, InteractionMode},
};
use chrono::Utc;
use dom_adapter::{DomPort, EventKind, NodeId};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info};

/// Global query for rendered listbox options.
pub const OPTION_QUERY: &str = r#"[role="option"]"#;

/// Execute select_dropdown primitive
///
/// Steps:
/// 1. Resolve the anchor and classify it as native select, listbox or option
/// 2. Hand off to the matching handler
/// 3. Generate action report
pub async fn execute_select_dropdown(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    selector: &str,
    value: &str,
) -> Result<ActionReport, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        selector = %selector,
        item = %value,
        "Executing select primitive"
    );

    // 1. Resolve
    let anchor = primitives.resolve_anchor(selector).await?;
    let target = primitives
        .resolver()
        .resolve_dropdown(primitives.dom(), anchor)
        .await?
        .ok_or_else(|| ActionError::NotADropdown(selector.to_string()))?;
    debug!(action_id = %ctx.action_id, ?target, "dropdown resolved");

    // 2. Dispatch
    let mode = match target {
        DropdownTarget::Native(select) => {
            select_native_option(primitives, ctx, select, value).await?;
            InteractionMode::NativeInput
        }
        DropdownTarget::Listbox(listbox) => {
            select_listbox_option(primitives, ctx, listbox, value).await?;
            InteractionMode::AriaWidget
        }
        DropdownTarget::Option(option) => {
            let dom = primitives.dom();
            dom.scroll_into_view(option).await?;
            dom.click(option).await?;
            InteractionMode::AriaWidget
        }
    };

    // 3. Report
    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        action_id = %ctx.action_id,
        latency_ms = latency_ms,
        "Select completed successfully"
    );
    Ok(ActionReport::success(started_at, latency_ms).with_mode(Some(mode)))
}

/// Selects the first option whose value equals `value`, falling back to the
/// first whose visible text does, then dispatches `change`.
pub async fn select_native_option(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    select: NodeId,
    value: &str,
) -> Result<(), ActionError> {
    let dom = primitives.dom();
    let options = dom.select_options(select).await?;
    let wanted = value.trim();

    let matched = options
        .iter()
        .find(|opt| opt.value == value)
        .or_else(|| {
            options
                .iter()
                .find(|opt| opt.text == value || opt.text.trim() == wanted)
        })
        .ok_or_else(|| ActionError::OptionNotFound(value.to_string()))?;

    debug!(
        action_id = %ctx.action_id,
        index = matched.index,
        option_value = %matched.value,
        "native option matched"
    );
    dom.select_option(select, matched.index).await?;
    dom.dispatch_event(select, EventKind::Change).await?;
    Ok(())
}

/// Opens the listbox, waits for options to render and clicks the first
/// `[role=option]` in the document whose `data-value` or trimmed text matches.
pub async fn select_listbox_option(
    primitives: &DefaultActionPrimitives,
    ctx: &ExecCtx,
    listbox: NodeId,
    value: &str,
) -> Result<(), ActionError> {
    let dom = primitives.dom();
    dom.scroll_into_view(listbox).await?;
    dom.click(listbox).await?;

    let delay = primitives.timing().listbox_open_delay();
    if !delay.is_zero() {
        sleep(delay).await;
    }

    let option = find_listbox_option(dom, value)
        .await?
        .ok_or_else(|| ActionError::OptionNotFound(value.to_string()))?;
    debug!(action_id = %ctx.action_id, %option, "listbox option matched");
    dom.scroll_into_view(option).await?;
    dom.click(option).await?;
    Ok(())
}

async fn find_listbox_option(dom: &dyn DomPort, value: &str) -> Result<Option<NodeId>, ActionError> {
    let wanted = value.trim();
    for option in dom.query_selector_all(OPTION_QUERY).await? {
        if dom.attribute(option, "data-value").await?.as_deref() == Some(value) {
            return Ok(Some(option));
        }
        if dom.text_content(option).await?.trim() == wanted {
            return Ok(Some(option));
        }
    }
    Ok(None)
}
