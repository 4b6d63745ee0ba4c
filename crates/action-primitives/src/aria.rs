//! ARIA toggle protocol shared by the radio and checkbox handlers.
//!
//! Widgets differ in which channel their framework listens to, so the state
//! change escalates from a pointer click, to the space key, to writing
//! `aria-checked` directly. Each tier is verified by polling the state reader.

use dom_adapter::{DomPort, EventKind, NodeId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::ActionError;
use crate::state::read_toggle_state;
use crate::types::{ExecCtx, ExecutorTiming, ToggleRole, ToggleState};
use crate::waiting::poll_until;

/// Escalation tier that produced the desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AriaTier {
    Click,
    Keyboard,
    ForcedAttribute,
}

pub async fn run_aria_toggle(
    dom: &dyn DomPort,
    ctx: &ExecCtx,
    node: NodeId,
    role: ToggleRole,
    desired: bool,
    timing: &ExecutorTiming,
) -> Result<AriaTier, ActionError> {
    // 1. pointer
    dom.scroll_into_view(node).await?;
    dom.focus(node).await?;
    dom.click(node).await?;
    let state = settle(dom, node, desired, timing.aria_poll_attempts, timing).await?;
    if state.matches(desired) {
        return Ok(AriaTier::Click);
    }
    debug!(action_id = %ctx.action_id, %node, ?state, "click did not toggle; trying keyboard");

    // 2. keyboard
    dom.dispatch_event(node, EventKind::key_down(" ")).await?;
    dom.dispatch_event(node, EventKind::key_up(" ")).await?;
    let state = settle(dom, node, desired, timing.aria_poll_attempts, timing).await?;
    if state.matches(desired) {
        return Ok(AriaTier::Keyboard);
    }
    debug!(action_id = %ctx.action_id, %node, ?state, "keyboard did not toggle; forcing aria-checked");

    // 3. forced attribute
    let forced = if desired { "true" } else { "false" };
    dom.set_attribute(node, "aria-checked", forced).await?;
    dom.dispatch_event(node, EventKind::Input).await?;
    dom.dispatch_event(node, EventKind::Change).await?;
    let state = settle(dom, node, desired, 1, timing).await?;
    if state.matches(desired) {
        return Ok(AriaTier::ForcedAttribute);
    }

    warn!(
        action_id = %ctx.action_id,
        %node,
        role = %role,
        ?state,
        "aria toggle exhausted every tier"
    );
    Err(ActionError::VerificationFailed {
        role: role.to_string(),
    })
}

async fn settle(
    dom: &dyn DomPort,
    node: NodeId,
    desired: bool,
    attempts: u32,
    timing: &ExecutorTiming,
) -> Result<ToggleState, ActionError> {
    poll_until(
        || read_toggle_state(dom, node),
        |state| state.matches(desired),
        attempts,
        timing.aria_poll_delay(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_adapter::{Document, MemoryDom};

    fn widget(respond_to: Option<&'static str>) -> (MemoryDom, NodeId) {
        let mut doc = Document::new();
        let node = doc.append(
            doc.body(),
            "div",
            &[("role", "checkbox"), ("aria-checked", "false")],
        );
        if let Some(event) = respond_to {
            doc.on(node, event, |doc, ev| {
                if ev.kind.name() == "click" || ev.kind.key() == Some(" ") {
                    doc.set_attribute(ev.target, "aria-checked", "true");
                }
            });
        }
        (MemoryDom::new(doc), node)
    }

    #[tokio::test]
    async fn keyboard_tier_used_when_click_is_ignored() {
        let (dom, node) = widget(Some("keydown"));
        let tier = run_aria_toggle(
            &dom,
            &ExecCtx::default(),
            node,
            ToggleRole::Checkbox,
            true,
            &ExecutorTiming::immediate(),
        )
        .await
        .unwrap();
        assert_eq!(tier, AriaTier::Keyboard);
        assert!(dom.port_attribute_writes().is_empty());
    }

    #[tokio::test]
    async fn forced_attribute_sticks_on_passive_widget() {
        let (dom, node) = widget(None);
        let tier = run_aria_toggle(
            &dom,
            &ExecCtx::default(),
            node,
            ToggleRole::Checkbox,
            true,
            &ExecutorTiming::immediate(),
        )
        .await
        .unwrap();
        assert_eq!(tier, AriaTier::ForcedAttribute);
        assert_eq!(
            dom.port_attribute_writes(),
            vec![(node, "aria-checked".to_string(), "true".to_string())]
        );
    }
}
