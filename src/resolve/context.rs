use super::ids::OperationIds;
use super::reference;
use crate::config::ResolverConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::error::ResolveError;
use crate::ir::{AccessScopes, Ir};
use crate::spec::ObjectOrReference;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Mutable state of one resolution run.
///
/// Owns the IR under construction and the diagnostics sink; borrows the raw
/// document and the compiled configuration. A context is created per run and
/// never reused.
pub struct Context<'a> {
    pub document: &'a Value,
    pub config: &'a ResolverConfig,
    pub ir: Ir,
    pub diagnostics: Diagnostics,
    pub ids: OperationIds,
    /// Webhook ids are unique among webhooks only
    pub webhook_ids: OperationIds,
    /// Canonical pointers being expanded on the current recursion path
    tracker: Vec<String>,
    /// Shallowest tracker depth a cycle guard stopped at in the current expansion
    cycle_floor: Option<usize>,
    scope_cache: HashMap<String, AccessScopes>,
    /// Entity currently being resolved, used as the diagnostics pointer
    location: String,
}

impl<'a> Context<'a> {
    pub fn new(document: &'a Value, config: &'a ResolverConfig) -> Self {
        Context {
            document,
            config,
            ir: Ir::default(),
            diagnostics: Diagnostics::default(),
            ids: OperationIds::default(),
            webhook_ids: OperationIds::default(),
            tracker: Vec::new(),
            cycle_floor: None,
            scope_cache: HashMap::new(),
            location: "#".to_string(),
        }
    }

    /// Read the node at `pointer` as a `T`.
    pub fn resolve<T: DeserializeOwned>(&self, pointer: &str, expected: &'static str) -> Result<T, ResolveError> {
        reference::resolve(self.document, pointer, expected)
    }

    /// Follow `$ref` hops until an inline object is reached.
    pub fn resolve_object<T: DeserializeOwned + Clone>(
        &self,
        node: &ObjectOrReference<T>,
        expected: &'static str,
    ) -> Result<T, ResolveError> {
        reference::resolve_object(self.document, node, expected)
    }

    /// Whether `pointer` is already being expanded on the current path.
    ///
    /// A hit is remembered: every expansion started after `pointer` was
    /// pushed is then incomplete, see [`Context::expanding_complete`].
    pub fn cycle_guard(&mut self, pointer: &str) -> bool {
        let Some(depth) = self.tracker.iter().position(|p| p == pointer) else {
            return false;
        };
        self.cycle_floor = Some(self.cycle_floor.map_or(depth, |floor| floor.min(depth)));
        true
    }

    /// Run `f` with `pointer` pushed on the cycle tracker.
    pub fn expanding<R>(&mut self, pointer: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.expanding_complete(pointer, f).0
    }

    /// Like [`Context::expanding`], also reporting whether the result is
    /// complete. It is not when a cycle guard inside `f` stopped at a pointer
    /// pushed before `pointer`; such a result depends on the current path and
    /// must not be cached.
    pub fn expanding_complete<R>(&mut self, pointer: &str, f: impl FnOnce(&mut Self) -> R) -> (R, bool) {
        let depth = self.tracker.len();
        let outer = self.cycle_floor.take();
        self.tracker.push(pointer.to_string());
        let result = f(self);
        self.tracker.pop();

        let inner = self.cycle_floor.take().filter(|&floor| floor < depth);
        self.cycle_floor = match (outer, inner) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        (result, inner.is_none())
    }

    pub fn cached_scopes(&self, pointer: &str) -> Option<&AccessScopes> {
        self.scope_cache.get(pointer)
    }

    pub fn cache_scopes(&mut self, pointer: &str, scopes: AccessScopes) {
        self.scope_cache.insert(pointer.to_string(), scopes);
    }

    /// Set the entity pointer diagnostics are attributed to.
    pub fn set_location(&mut self, pointer: impl Into<String>) {
        self.location = pointer.into();
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Hand over the finished IR and everything recorded on the way.
    #[must_use]
    pub fn finish(self) -> (Ir, Diagnostics) {
        (self.ir, self.diagnostics)
    }

    /// Record a warning against the current entity. Repeats are dropped.
    pub fn warn(&mut self, code: &'static str, message: impl Into<String>) {
        self.record(Severity::Warning, code, message.into());
    }

    /// Record an informational note against the current entity.
    pub fn info(&mut self, code: &'static str, message: impl Into<String>) {
        self.record(Severity::Info, code, message.into());
    }

    fn record(&mut self, severity: Severity, code: &'static str, message: String) {
        let seen = self
            .diagnostics
            .iter()
            .any(|d| d.code == code && d.pointer == self.location && d.message == message);
        if !seen {
            self.diagnostics
                .push(Diagnostic::new(severity, code, self.location.clone(), message));
        }
    }
}
