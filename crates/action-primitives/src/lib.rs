//! Action resolution and execution engine
//!
//! This crate turns one abstract action (selector + semantic type + value)
//! into DOM interactions:
//! - element classifier and control resolver (anchor to actual control)
//! - state reader normalising native and ARIA toggle state
//! - per-operation primitives with verification and fallback
//!   (ARIA toggle escalation, rich-editor fallback chain)
//! - the action executor that maps an action record onto a primitive

pub mod aria;
pub mod classify;
pub mod errors;
pub mod executor;
mod locator;
mod primitives;
pub mod rich_editor;
pub mod state;
pub mod types;
mod waiting;

pub use errors::*;
pub use executor::{coerce_checkbox_value, ActionExecutor};
pub use locator::*;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
