//! Batch orchestration layer
//!
//! Turns the action list produced by the analysis backend into canonical
//! actions and replays them, in order, through the action executor.

pub mod errors;
pub mod runner;
pub mod types;
pub mod wire;

pub use errors::FlowError;
pub use runner::BatchRunner;
pub use types::{ActionResult, BatchReport, BatchSummary, ResultEntry};
pub use wire::{normalize_action, parse_action_list, parse_kind, split_entries};
