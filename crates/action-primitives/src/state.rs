//! State reader: one on/off/unknown answer for native and ARIA toggles.

use dom_adapter::{DomPort, NodeId};

use crate::errors::ActionError;
use crate::types::ToggleState;

/// Reads the toggle state of `node`.
///
/// Signals, most authoritative first: the native `checked` property,
/// `aria-checked` (where `"mixed"` counts as on), `aria-pressed`, then
/// `data-state` and `data-checked`.
pub async fn read_toggle_state(dom: &dyn DomPort, node: NodeId) -> Result<ToggleState, ActionError> {
    if let Some(checked) = dom.checked(node).await? {
        return Ok(ToggleState::from_bool(checked));
    }

    if let Some(value) = dom.attribute(node, "aria-checked").await? {
        match normalized(&value).as_str() {
            "true" | "mixed" => return Ok(ToggleState::On),
            "false" => return Ok(ToggleState::Off),
            _ => {}
        }
    }

    if let Some(value) = dom.attribute(node, "aria-pressed").await? {
        match normalized(&value).as_str() {
            "true" | "mixed" => return Ok(ToggleState::On),
            "false" => return Ok(ToggleState::Off),
            _ => {}
        }
    }

    if let Some(value) = dom.attribute(node, "data-state").await? {
        match normalized(&value).as_str() {
            "checked" | "on" => return Ok(ToggleState::On),
            "unchecked" | "off" => return Ok(ToggleState::Off),
            _ => {}
        }
    }

    if let Some(value) = dom.attribute(node, "data-checked").await? {
        match normalized(&value).as_str() {
            "true" => return Ok(ToggleState::On),
            "false" => return Ok(ToggleState::Off),
            _ => {}
        }
    }

    Ok(ToggleState::Unknown)
}

fn normalized(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
