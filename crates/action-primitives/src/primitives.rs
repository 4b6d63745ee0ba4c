//! Action primitives implementation
//!
//! One handler per operation:
//! 1. fill_text - native field, contenteditable or rich editor
//! 2. click - pointer sequence plus native click
//! 3. select_radio - native radio or ARIA radio
//! 4. select_checkbox - native checkbox or ARIA checkbox
//! 5. select_native_option - `<select>` by value, then by text
//! 6. select_listbox_option - ARIA listbox/combobox/option

mod click;
mod fill_text;
mod select;
mod toggle;

pub use click::*;
pub use fill_text::*;
pub use select::*;
pub use toggle::*;

use std::sync::Arc;

use async_trait::async_trait;
use dom_adapter::{DomPort, NodeId};

use crate::{
    errors::ActionError,
    locator::{ControlResolver, StructuralResolver},
    rich_editor::{default_probes, EditorProbe},
    types::{ActionReport, ExecCtx, ExecutorTiming},
};

/// Action primitives trait
///
/// Every method resolves its own anchor from the selector, so nothing about
/// the DOM is carried over from a previous action.
#[async_trait]
pub trait ActionPrimitives: Send + Sync {
    /// Put `text` into the text target resolved from `selector`
    async fn fill_text(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        text: &str,
    ) -> Result<ActionReport, ActionError>;

    /// Click the anchor
    async fn click(&self, ctx: &ExecCtx, selector: &str) -> Result<ActionReport, ActionError>;

    /// Select the radio resolved from `selector`
    async fn select_radio(&self, ctx: &ExecCtx, selector: &str)
        -> Result<ActionReport, ActionError>;

    /// Bring the checkbox resolved from `selector` into `desired`
    async fn select_checkbox(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        desired: bool,
    ) -> Result<ActionReport, ActionError>;

    /// Pick `value` from a native select or ARIA listbox
    async fn select_dropdown(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        value: &str,
    ) -> Result<ActionReport, ActionError>;
}

/// Default implementation of action primitives
pub struct DefaultActionPrimitives {
    /// DOM the actions are applied to
    dom: Arc<dyn DomPort>,

    /// Resolver turning anchors into controls
    resolver: Arc<dyn ControlResolver>,

    /// Delays and retry bounds
    timing: ExecutorTiming,

    /// Attachment-point probes for the rich editor, tried in order
    probes: Vec<Arc<dyn EditorProbe>>,
}

impl DefaultActionPrimitives {
    pub fn new(dom: Arc<dyn DomPort>, timing: ExecutorTiming) -> Self {
        Self::with_resolver(dom, timing, Arc::new(StructuralResolver))
    }

    pub fn with_resolver(
        dom: Arc<dyn DomPort>,
        timing: ExecutorTiming,
        resolver: Arc<dyn ControlResolver>,
    ) -> Self {
        Self {
            dom,
            resolver,
            timing,
            probes: default_probes(),
        }
    }

    /// Replace the rich-editor probe list
    pub fn with_probes(mut self, probes: Vec<Arc<dyn EditorProbe>>) -> Self {
        self.probes = probes;
        self
    }

    pub fn dom(&self) -> &dyn DomPort {
        self.dom.as_ref()
    }

    pub fn resolver(&self) -> &dyn ControlResolver {
        self.resolver.as_ref()
    }

    pub fn timing(&self) -> &ExecutorTiming {
        &self.timing
    }

    pub fn probes(&self) -> &[Arc<dyn EditorProbe>] {
        &self.probes
    }

    /// First element matching `selector`
    pub async fn resolve_anchor(&self, selector: &str) -> Result<NodeId, ActionError> {
        self.resolver.resolve_anchor(self.dom(), selector).await
    }
}

#[async_trait]
impl ActionPrimitives for DefaultActionPrimitives {
    async fn fill_text(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        text: &str,
    ) -> Result<ActionReport, ActionError> {
        fill_text::execute_fill_text(self, ctx, selector, text).await
    }

    async fn click(&self, ctx: &ExecCtx, selector: &str) -> Result<ActionReport, ActionError> {
        click::execute_click(self, ctx, selector).await
    }

    async fn select_radio(
        &self,
        ctx: &ExecCtx,
        selector: &str,
    ) -> Result<ActionReport, ActionError> {
        toggle::execute_select_radio(self, ctx, selector).await
    }

    async fn select_checkbox(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        desired: bool,
    ) -> Result<ActionReport, ActionError> {
        toggle::execute_select_checkbox(self, ctx, selector, desired).await
    }

    async fn select_dropdown(
        &self,
        ctx: &ExecCtx,
        selector: &str,
        value: &str,
    ) -> Result<ActionReport, ActionError> {
        select::execute_select_dropdown(self, ctx, selector, value).await
    }
}
