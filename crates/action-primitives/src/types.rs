//! Core data types for action primitives

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dom_adapter::NodeId;
use formpilot_core_types::ActionId;
use serde::{Deserialize, Serialize};

use crate::errors::ActionError;

/// Semantic type of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    FillText,
    Click,
    SelectRadio,
    SelectCheckbox,
    SelectDropdown,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::FillText,
        ActionKind::Click,
        ActionKind::SelectRadio,
        ActionKind::SelectCheckbox,
        ActionKind::SelectDropdown,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::FillText => "fillText",
            ActionKind::Click => "click",
            ActionKind::SelectRadio => "selectRadio",
            ActionKind::SelectCheckbox => "selectCheckbox",
            ActionKind::SelectDropdown => "selectDropdown",
        }
    }

    /// Whether the action cannot run without a value.
    pub fn requires_value(&self) -> bool {
        matches!(
            self,
            ActionKind::FillText | ActionKind::SelectCheckbox | ActionKind::SelectDropdown
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One canonical action record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Action {
    pub fn new(kind: ActionKind, selector: impl Into<String>, value: Option<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
            value,
        }
    }

    pub fn fill_text(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ActionKind::FillText, selector, Some(value.into()))
    }

    pub fn click(selector: impl Into<String>) -> Self {
        Self::new(ActionKind::Click, selector, None)
    }

    pub fn select_radio(selector: impl Into<String>) -> Self {
        Self::new(ActionKind::SelectRadio, selector, None)
    }

    pub fn select_checkbox(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ActionKind::SelectCheckbox, selector, Some(value.into()))
    }

    pub fn select_dropdown(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ActionKind::SelectDropdown, selector, Some(value.into()))
    }
}

/// How a resolved control is manipulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionMode {
    NativeInput,
    AriaWidget,
    ContentEditable,
    RichEditor,
}

/// Interactive target computed from an anchor. Never cached across actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedControl {
    pub node: NodeId,
    pub mode: InteractionMode,
}

impl ResolvedControl {
    pub fn new(node: NodeId, mode: InteractionMode) -> Self {
        Self { node, mode }
    }
}

/// Two-state controls the toggle resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleRole {
    Radio,
    Checkbox,
}

impl ToggleRole {
    /// Both the native input type and the ARIA role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleRole::Radio => "radio",
            ToggleRole::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for ToggleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized on/off reading of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    On,
    Off,
    Unknown,
}

impl ToggleState {
    pub fn from_bool(on: bool) -> Self {
        if on {
            ToggleState::On
        } else {
            ToggleState::Off
        }
    }

    /// `Unknown` never matches: callers proceed with the toggle attempt.
    pub fn matches(&self, desired: bool) -> bool {
        match self {
            ToggleState::On => desired,
            ToggleState::Off => !desired,
            ToggleState::Unknown => false,
        }
    }
}

/// Why an action was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ValueMissing,
    AlreadySelected,
    AlreadyInState,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ValueMissing => "value missing",
            SkipReason::AlreadySelected => "already selected",
            SkipReason::AlreadyInState => "already in desired state",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one of these per executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum ActionOutcome {
    Success,
    Skipped(SkipReason),
    Failed(String),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ActionOutcome::Failed(_))
    }

    /// Skip reason or failure message.
    pub fn message(&self) -> Option<String> {
        match self {
            ActionOutcome::Success => None,
            ActionOutcome::Skipped(reason) => Some(reason.to_string()),
            ActionOutcome::Failed(message) => Some(message.clone()),
        }
    }
}

/// Per-action execution context.
#[derive(Debug, Clone)]
pub struct ExecCtx {
    /// Unique identifier for this action, used to correlate log lines
    pub action_id: ActionId,
}

impl ExecCtx {
    pub fn new(action_id: ActionId) -> Self {
        Self { action_id }
    }
}

impl Default for ExecCtx {
    fn default() -> Self {
        Self::new(ActionId::new())
    }
}

/// Result of executing one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    pub outcome: ActionOutcome,

    /// Interaction mode the handler settled on, when resolution got that far
    pub mode: Option<InteractionMode>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,

    pub latency_ms: u64,
}

impl ActionReport {
    pub fn new(outcome: ActionOutcome, started_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self {
            outcome,
            mode: None,
            started_at,
            finished_at: Utc::now(),
            latency_ms,
        }
    }

    pub fn success(started_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self::new(ActionOutcome::Success, started_at, latency_ms)
    }

    pub fn skipped(reason: SkipReason, started_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self::new(ActionOutcome::Skipped(reason), started_at, latency_ms)
    }

    pub fn failure(error: &ActionError, started_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self::new(ActionOutcome::Failed(error.to_string()), started_at, latency_ms)
    }

    pub fn with_mode(mut self, mode: Option<InteractionMode>) -> Self {
        self.mode = mode;
        self
    }
}

/// Delays and retry bounds used by the executor. All values in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorTiming {
    /// Pause between consecutive actions of a batch
    pub inter_action_delay_ms: u64,
    /// Poll attempts per ARIA escalation tier
    pub aria_poll_attempts: u32,
    pub aria_poll_delay_ms: u64,
    /// Wait after opening a listbox before looking for options
    pub listbox_open_delay_ms: u64,
    /// Wait between rich-editor fallback steps
    pub rich_editor_step_delay_ms: u64,
}

impl Default for ExecutorTiming {
    fn default() -> Self {
        Self {
            inter_action_delay_ms: 250,
            aria_poll_attempts: 5,
            aria_poll_delay_ms: 100,
            listbox_open_delay_ms: 200,
            rich_editor_step_delay_ms: 50,
        }
    }
}

impl ExecutorTiming {
    /// No delays at all; polls still run once.
    pub fn immediate() -> Self {
        Self {
            inter_action_delay_ms: 0,
            aria_poll_attempts: 1,
            aria_poll_delay_ms: 0,
            listbox_open_delay_ms: 0,
            rich_editor_step_delay_ms: 0,
        }
    }

    pub fn inter_action_delay(&self) -> Duration {
        Duration::from_millis(self.inter_action_delay_ms)
    }

    pub fn aria_poll_delay(&self) -> Duration {
        Duration::from_millis(self.aria_poll_delay_ms)
    }

    pub fn listbox_open_delay(&self) -> Duration {
        Duration::from_millis(self.listbox_open_delay_ms)
    }

    pub fn rich_editor_step_delay(&self) -> Duration {
        Duration::from_millis(self.rich_editor_step_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_never_matches() {
        assert!(ToggleState::On.matches(true));
        assert!(ToggleState::Off.matches(false));
        assert!(!ToggleState::Unknown.matches(true));
        assert!(!ToggleState::Unknown.matches(false));
    }

    #[test]
    fn action_serializes_with_wire_names() {
        let json = serde_json::to_value(Action::select_checkbox("#agree", "1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "selectCheckbox", "selector": "#agree", "value": "1" })
        );
        let click = serde_json::to_value(Action::click("#go")).unwrap();
        assert!(click.get("value").is_none());
    }

    #[test]
    fn timing_fills_missing_fields() {
        let timing: ExecutorTiming =
            serde_json::from_str(r#"{ "aria_poll_attempts": 2 }"#).unwrap();
        assert_eq!(timing.aria_poll_attempts, 2);
        assert_eq!(timing.inter_action_delay_ms, 250);
        assert!(ActionKind::SelectDropdown.requires_value());
        assert!(!ActionKind::SelectRadio.requires_value());
    }
}
