//! Batch result types

use action_primitives::{ActionOutcome, ActionReport, InteractionMode};
use chrono::{DateTime, Utc};
use formpilot_core_types::RunId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one entry of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Position in the input list
    pub index: usize,

    /// The entry exactly as it arrived on the wire
    pub action: Value,

    pub outcome: ActionOutcome,

    pub mode: Option<InteractionMode>,

    pub latency_ms: u64,
}

impl ActionResult {
    pub fn from_report(index: usize, action: Value, report: ActionReport) -> Self {
        Self {
            index,
            action,
            outcome: report.outcome,
            mode: report.mode,
            latency_ms: report.latency_ms,
        }
    }
}

/// Aggregated outcome of a batch.
///
/// `success_count + fail_count + skip_count == results.len()` and `results`
/// is in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub run_id: RunId,
    pub success_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
    pub results: Vec<ActionResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn new(run_id: RunId) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            success_count: 0,
            fail_count: 0,
            skip_count: 0,
            results: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Records one result and bumps exactly one counter.
    pub fn push(&mut self, result: ActionResult) {
        match result.outcome {
            ActionOutcome::Success => self.success_count += 1,
            ActionOutcome::Skipped(_) => self.skip_count += 1,
            ActionOutcome::Failed(_) => self.fail_count += 1,
        }
        self.results.push(result);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Skips do not count against the batch.
    pub fn success(&self) -> bool {
        self.fail_count == 0
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Wire shape handed back to the orchestration layer.
    pub fn to_report(&self) -> BatchReport {
        BatchReport {
            success: self.success(),
            success_count: self.success_count,
            fail_count: self.fail_count,
            skip_count: self.skip_count,
            duration_ms: self.duration_ms(),
            results: self.results.iter().map(ResultEntry::from).collect(),
        }
    }
}

/// Batch result as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub success: bool,
    pub success_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
    pub duration_ms: u64,
    pub results: Vec<ResultEntry>,
}

/// One entry of [`BatchReport::results`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub action: Value,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&ActionResult> for ResultEntry {
    fn from(result: &ActionResult) -> Self {
        let mut entry = ResultEntry {
            action: result.action.clone(),
            success: false,
            skipped: None,
            error: None,
            message: None,
        };
        match &result.outcome {
            ActionOutcome::Success => entry.success = true,
            ActionOutcome::Skipped(reason) => {
                entry.skipped = Some(true);
                entry.message = Some(reason.to_string());
            }
            ActionOutcome::Failed(error) => entry.error = Some(error.clone()),
        }
        entry
    }
}
