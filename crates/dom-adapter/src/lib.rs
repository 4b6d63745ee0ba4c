//! DOM port for FormPilot.
//!
//! [`DomPort`] is the narrow set of DOM capabilities the action engine needs.
//! Two implementations ship here: [`MemoryDom`], a scripted in-process
//! document, and [`ScriptDom`], which drives a real page through JavaScript
//! evaluation (see [`ChromiumEngine`]).

pub mod chromium;
pub mod error;
pub mod memory;
pub mod port;
pub mod script;

pub use chromium::{launch_page, BrowserSettings, ChromiumEngine, ChromiumSession};
pub use error::{AdapterError, AdapterErrorKind};
pub use memory::{DomEvent, Document, JournalEntry, MemoryDom, Origin};
pub use port::{DomPort, EditorAttachment, EditorHandle, EventKind, NodeId, SelectOption};
pub use script::{ScriptDom, ScriptEngine};
