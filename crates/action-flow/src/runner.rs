//! Batch runner implementation

use std::sync::Arc;
use std::time::Duration;

use action_primitives::{
    Action, ActionExecutor, ActionPrimitives, ActionReport, DefaultActionPrimitives, ExecCtx,
    ExecutorTiming,
};
use chrono::Utc;
use dom_adapter::DomPort;
use formpilot_core_types::{ActionId, RunId};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::types::{ActionResult, BatchSummary};
use crate::wire::normalize_action;

/// Replays an action list, strictly one action at a time.
///
/// Actions share one live DOM, so nothing here runs concurrently. A failing
/// action never stops the batch.
pub struct BatchRunner {
    executor: ActionExecutor,
    inter_action_delay: Duration,
}

impl BatchRunner {
    pub fn new(executor: ActionExecutor, inter_action_delay: Duration) -> Self {
        Self {
            executor,
            inter_action_delay,
        }
    }

    /// Runner over the default primitives for `dom`.
    pub fn for_dom(dom: Arc<dyn DomPort>, timing: ExecutorTiming) -> Self {
        let delay = timing.inter_action_delay();
        let primitives: Arc<dyn ActionPrimitives> =
            Arc::new(DefaultActionPrimitives::new(dom, timing));
        Self::new(ActionExecutor::new(primitives), delay)
    }

    pub fn inter_action_delay(&self) -> Duration {
        self.inter_action_delay
    }

    /// Runs wire entries under a fresh run id.
    pub async fn run(&self, entries: &[Value]) -> BatchSummary {
        self.run_with_id(RunId::new(), entries).await
    }

    /// Runs wire entries.
    ///
    /// Steps:
    /// 1. Normalize each entry; a malformed one becomes a `Failed` result
    /// 2. Execute it with an action id derived from the run and its position
    /// 3. Pause before the next entry, whatever the outcome
    #[instrument(skip(self, run_id, entries), fields(run_id = %run_id, total = entries.len()))]
    pub async fn run_with_id(&self, run_id: RunId, entries: &[Value]) -> BatchSummary {
        info!("Starting batch");
        let mut summary = BatchSummary::new(run_id.clone());

        for (index, entry) in entries.iter().enumerate() {
            let ctx = ExecCtx::new(ActionId::for_step(&run_id, index));

            // 1. Normalize
            let report = match normalize_action(entry) {
                Ok(action) => self.execute(&ctx, &action).await,
                Err(err) => {
                    warn!(action_id = %ctx.action_id, error = %err, "Rejected malformed entry");
                    ActionReport::failure(&err, Utc::now(), 0)
                }
            };

            // 2. Record
            debug!(
                action_id = %ctx.action_id,
                outcome = ?report.outcome,
                latency_ms = report.latency_ms,
                "Entry finished"
            );
            summary.push(ActionResult::from_report(index, entry.clone(), report));

            // 3. Pace
            if index + 1 < entries.len() && !self.inter_action_delay.is_zero() {
                sleep(self.inter_action_delay).await;
            }
        }

        let summary = summary.finish();
        info!(
            success_count = summary.success_count,
            fail_count = summary.fail_count,
            skip_count = summary.skip_count,
            duration_ms = summary.duration_ms(),
            "Batch finished"
        );
        summary
    }

    /// Runs already-canonical actions.
    pub async fn run_actions(&self, actions: &[Action]) -> BatchSummary {
        let entries: Vec<Value> = actions
            .iter()
            .map(|action| serde_json::to_value(action).unwrap_or(Value::Null))
            .collect();
        self.run(&entries).await
    }

    async fn execute(&self, ctx: &ExecCtx, action: &Action) -> ActionReport {
        self.executor.execute(ctx, action).await
    }
}
