//! Action executor: one canonical action in, one report out.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::ActionError;
use crate::primitives::ActionPrimitives;
use crate::types::{Action, ActionKind, ActionReport, ExecCtx, SkipReason};

/// Checkbox values that mean "checked". Everything else means unchecked.
pub fn coerce_checkbox_value(value: &str) -> bool {
    matches!(value, "true" | "1")
}

pub struct ActionExecutor {
    primitives: Arc<dyn ActionPrimitives>,
}

impl ActionExecutor {
    pub fn new(primitives: Arc<dyn ActionPrimitives>) -> Self {
        Self { primitives }
    }

    /// Runs `action`, folding every error into a `Failed` report.
    pub async fn execute(&self, ctx: &ExecCtx, action: &Action) -> ActionReport {
        let started_at = Utc::now();
        let start_instant = Instant::now();

        match self.try_execute(ctx, action).await {
            Ok(report) => report,
            Err(err) => {
                warn!(
                    action_id = %ctx.action_id,
                    kind = %action.kind,
                    selector = %action.selector,
                    error = %err,
                    error_kind = err.label(),
                    "Action failed"
                );
                let latency_ms = start_instant.elapsed().as_millis() as u64;
                ActionReport::failure(&err, started_at, latency_ms)
            }
        }
    }

    /// Runs `action`, surfacing structural and execution errors to the caller.
    ///
    /// A missing required value is a skip, decided before the DOM is touched.
    pub async fn try_execute(
        &self,
        ctx: &ExecCtx,
        action: &Action,
    ) -> Result<ActionReport, ActionError> {
        let selector = action.selector.trim();
        if selector.is_empty() {
            return Err(ActionError::Malformed(format!(
                "{} action has no selector",
                action.kind
            )));
        }

        if action.kind.requires_value() && action.value.is_none() {
            info!(
                action_id = %ctx.action_id,
                kind = %action.kind,
                selector = %selector,
                "Action skipped: value missing"
            );
            return Ok(ActionReport::skipped(SkipReason::ValueMissing, Utc::now(), 0));
        }
        let value = action.value.as_deref().unwrap_or_default();

        match action.kind {
            ActionKind::FillText => self.primitives.fill_text(ctx, selector, value).await,
            ActionKind::Click => self.primitives.click(ctx, selector).await,
            ActionKind::SelectRadio => self.primitives.select_radio(ctx, selector).await,
            ActionKind::SelectCheckbox => {
                self.primitives
                    .select_checkbox(ctx, selector, coerce_checkbox_value(value))
                    .await
            }
            ActionKind::SelectDropdown => {
                self.primitives.select_dropdown(ctx, selector, value).await
            }
        }
    }
}
