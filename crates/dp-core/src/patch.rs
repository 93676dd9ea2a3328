//! Data patches: a target asset plus the record and field edits to make in it
//!
//! The host keeps a patch alive for as long as its content pack is loaded,
//! calls [`EditDataPatch::update_context`] whenever token values change, and
//! calls [`EditDataPatch::edit`] each time the target asset is loaded.

use crate::asset::Asset;
use crate::dispatch::KeyTypeDispatcher;
use crate::edit::EditSpecification;
use crate::editor::EditSummary;
use crate::error::Result;
use crate::monitor::Monitor;
use crate::options::EditOptions;
use crate::token::{Context, Resolvable, TokenString};
use crate::tracker::MutableTemplateTracker;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// State shared by every patch type: its name and target asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchBase {
    log_name: String,
    target: TokenString,
    tokens_used: BTreeSet<String>,
}

impl PatchBase {
    pub fn new(log_name: impl Into<String>, target: TokenString) -> Self {
        let tokens_used = target.tokens().map(str::to_string).collect();
        Self {
            log_name: log_name.into(),
            target,
            tokens_used,
        }
    }

    /// Name used in log messages
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// Resolved name of the asset to edit
    pub fn target(&self) -> &str {
        self.target.value()
    }

    /// Tokens referenced by the patch itself
    pub fn tokens_used(&self) -> &BTreeSet<String> {
        &self.tokens_used
    }

    pub fn is_ready(&self) -> bool {
        self.target.is_ready()
    }

    /// Re-resolve the target name, returning whether it changed
    pub fn update_context(&mut self, context: &dyn Context) -> bool {
        self.target.update_context(context)
    }
}

/// A patch which edits records and fields in a data dictionary
pub struct EditDataPatch<S = TokenString> {
    base: PatchBase,
    spec: EditSpecification<S>,
    tracker: MutableTemplateTracker,
    options: EditOptions,
    monitor: Box<dyn Monitor>,
}

impl<S: Resolvable> EditDataPatch<S> {
    /// Create a patch with default options
    pub fn new(
        log_name: impl Into<String>,
        target: impl Into<TokenString>,
        spec: EditSpecification<S>,
        monitor: Box<dyn Monitor>,
    ) -> Self {
        Self::with_options(log_name, target, spec, EditOptions::default(), monitor)
    }

    pub fn with_options(
        log_name: impl Into<String>,
        target: impl Into<TokenString>,
        spec: EditSpecification<S>,
        options: EditOptions,
        monitor: Box<dyn Monitor>,
    ) -> Self {
        let tracker = MutableTemplateTracker::new(&spec);
        Self {
            base: PatchBase::new(log_name, target.into()),
            spec,
            tracker,
            options,
            monitor,
        }
    }

    pub fn base(&self) -> &PatchBase {
        &self.base
    }

    pub fn log_name(&self) -> &str {
        self.base.log_name()
    }

    /// Resolved name of the asset to edit
    pub fn target(&self) -> &str {
        self.base.target()
    }

    pub fn specification(&self) -> &EditSpecification<S> {
        &self.spec
    }

    pub fn tracker(&self) -> &MutableTemplateTracker {
        &self.tracker
    }

    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Whether the target and every edit value are fully resolved
    pub fn is_ready(&self) -> bool {
        self.base.is_ready() && self.tracker.is_ready(&self.spec)
    }

    /// Update the patch for a new token context.
    ///
    /// Returns whether the next [`edit`](Self::edit) could produce different
    /// output than the last one.
    pub fn update_context(&mut self, context: &dyn Context) -> bool {
        let base_changed = self.base.update_context(context);
        let values_changed = self.tracker.update_context(&mut self.spec, context);
        base_changed || values_changed
    }

    /// Names of every token the patch depends on
    pub fn tokens_used(&self) -> Cow<'_, BTreeSet<String>> {
        if self.tracker.is_empty() {
            return Cow::Borrowed(self.base.tokens_used());
        }

        let mut tokens = self.base.tokens_used().clone();
        tokens.extend(self.tracker.tokens_used(&self.spec).map(str::to_string));
        Cow::Owned(tokens)
    }

    /// Apply the edits to a loaded asset.
    ///
    /// Returns `Ok(None)` if the asset can't be edited by a data patch.
    pub fn edit(&self, asset: &mut dyn Asset) -> Result<Option<EditSummary>> {
        KeyTypeDispatcher::new(self.base.log_name(), &self.options, self.monitor.as_ref())
            .edit(&self.spec, asset)
    }
}

impl<S> fmt::Debug for EditDataPatch<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditDataPatch")
            .field("base", &self.base)
            .field("spec", &self.spec)
            .field("tracker", &self.tracker)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
