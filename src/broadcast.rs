//! # Traversal Broadcaster
//!
//! Replays a finished [`Ir`] to registered consumers as an ordered event
//! stream:
//!
//! 1. one [`Event::Before`]
//! 2. one [`Event::Schema`] per component schema, in declared order
//! 3. one [`Event::Parameter`] per component parameter
//! 4. one [`Event::RequestBody`] per component request body
//! 5. one [`Event::Operation`] per path and method, paths in declared order
//!    and methods in canonical order
//! 6. one [`Event::Webhook`] per webhook and method, in the same order
//! 7. one [`Event::After`]
//!
//! Every consumer sees event *n* before any consumer sees event *n + 1*.
//! Events borrow the IR; nothing is copied and nothing can be mutated.
//!
//! ## Example
//!
//! ```rust
//! use openapi_ir::broadcast::{Broadcaster, Event, EventKind};
//! use openapi_ir::ir::Ir;
//!
//! let mut seen = Vec::new();
//! {
//!     let mut broadcaster = Broadcaster::new();
//!     broadcaster.register(|event: &Event<'_>| {
//!         seen.push(event.kind());
//!         Ok(())
//!     });
//!     broadcaster.broadcast(&Ir::default()).unwrap();
//! }
//! assert_eq!(seen, vec![EventKind::Before, EventKind::After]);
//! ```

use crate::error::ResolveError;
use crate::ir::{HttpMethod, Ir, IrOperation, IrParameter, IrRequestBody, IrSchema};
use std::fmt;
use tracing::debug;

/// Event kinds, in the order they are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Before,
    Schema,
    Parameter,
    RequestBody,
    Operation,
    Webhook,
    After,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Before,
        EventKind::Schema,
        EventKind::Parameter,
        EventKind::RequestBody,
        EventKind::Operation,
        EventKind::Webhook,
        EventKind::After,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Before => "before",
            EventKind::Schema => "schema",
            EventKind::Parameter => "parameter",
            EventKind::RequestBody => "requestBody",
            EventKind::Operation => "operation",
            EventKind::Webhook => "webhook",
            EventKind::After => "after",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traversal event, borrowing the node it describes.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Before(&'a Ir),
    Schema {
        name: &'a str,
        schema: &'a IrSchema,
    },
    Parameter {
        name: &'a str,
        parameter: &'a IrParameter,
    },
    RequestBody {
        name: &'a str,
        body: &'a IrRequestBody,
    },
    Operation {
        path: &'a str,
        method: HttpMethod,
        operation: &'a IrOperation,
    },
    Webhook {
        name: &'a str,
        method: HttpMethod,
        operation: &'a IrOperation,
    },
    After(&'a Ir),
}

impl Event<'_> {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Before(_) => EventKind::Before,
            Event::Schema { .. } => EventKind::Schema,
            Event::Parameter { .. } => EventKind::Parameter,
            Event::RequestBody { .. } => EventKind::RequestBody,
            Event::Operation { .. } => EventKind::Operation,
            Event::Webhook { .. } => EventKind::Webhook,
            Event::After(_) => EventKind::After,
        }
    }

    /// Pointer of the entity the event describes, in filter syntax.
    #[must_use]
    pub fn pointer(&self) -> Option<String> {
        match self {
            Event::Before(_) | Event::After(_) => None,
            Event::Schema { name, .. } => Some(format!("#/components/schemas/{name}")),
            Event::Parameter { name, .. } => Some(format!("#/components/parameters/{name}")),
            Event::RequestBody { name, .. } => Some(format!("#/components/requestBodies/{name}")),
            Event::Operation { path, method, .. } => Some(format!("#/paths{path}/{method}")),
            Event::Webhook { name, method, .. } => Some(format!("#/webhooks/{name}/{method}")),
        }
    }
}

/// Receives traversal events.
///
/// Any `FnMut(&Event) -> anyhow::Result<()>` closure is a consumer of every
/// event kind.
pub trait Consumer {
    /// Whether events of `kind` should be delivered. Defaults to all kinds.
    fn interested_in(&self, _kind: EventKind) -> bool {
        true
    }

    /// Handle one event. An error aborts the broadcast.
    fn on_event(&mut self, event: &Event<'_>) -> anyhow::Result<()>;
}

impl<F> Consumer for F
where
    F: FnMut(&Event<'_>) -> anyhow::Result<()>,
{
    fn on_event(&mut self, event: &Event<'_>) -> anyhow::Result<()> {
        self(event)
    }
}

struct Registration<'c> {
    /// Empty means every kind
    kinds: Vec<EventKind>,
    consumer: Box<dyn Consumer + 'c>,
}

impl Registration<'_> {
    fn wants(&self, kind: EventKind) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&kind)) && self.consumer.interested_in(kind)
    }
}

/// Delivers traversal events to consumers in registration order.
#[derive(Default)]
pub struct Broadcaster<'c> {
    consumers: Vec<Registration<'c>>,
}

impl<'c> Broadcaster<'c> {
    #[must_use]
    pub fn new() -> Self {
        Broadcaster { consumers: Vec::new() }
    }

    /// Register a consumer for every event kind it is interested in.
    pub fn register(&mut self, consumer: impl Consumer + 'c) {
        self.consumers.push(Registration {
            kinds: Vec::new(),
            consumer: Box::new(consumer),
        });
    }

    /// Register a consumer for `kinds` only.
    pub fn register_for(&mut self, kinds: &[EventKind], consumer: impl Consumer + 'c) {
        self.consumers.push(Registration {
            kinds: kinds.to_vec(),
            consumer: Box::new(consumer),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Emit the full event stream for `ir`.
    ///
    /// Stops at the first consumer error.
    pub fn broadcast(&mut self, ir: &Ir) -> Result<(), ResolveError> {
        debug!(consumers = self.consumers.len(), "broadcasting traversal events");

        self.emit(&Event::Before(ir))?;
        for (name, schema) in &ir.components.schemas {
            self.emit(&Event::Schema { name, schema })?;
        }
        for (name, parameter) in &ir.components.parameters {
            self.emit(&Event::Parameter { name, parameter })?;
        }
        for (name, body) in &ir.components.request_bodies {
            self.emit(&Event::RequestBody { name, body })?;
        }
        for (path, item) in &ir.paths {
            for (method, operation) in item {
                self.emit(&Event::Operation {
                    path,
                    method: *method,
                    operation,
                })?;
            }
        }
        for (name, item) in &ir.webhooks {
            for (method, operation) in item {
                self.emit(&Event::Webhook {
                    name,
                    method: *method,
                    operation,
                })?;
            }
        }
        self.emit(&Event::After(ir))
    }

    fn emit(&mut self, event: &Event<'_>) -> Result<(), ResolveError> {
        let kind = event.kind();
        for registration in self.consumers.iter_mut().filter(|r| r.wants(kind)) {
            registration
                .consumer
                .on_event(event)
                .map_err(|err| ResolveError::Consumer {
                    event: kind,
                    message: format!("{err:#}"),
                })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Broadcaster<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::ir::{IrSchema, SchemaType};
    use std::cell::Cell;
    use std::rc::Rc;

    struct OnlyOperations(Rc<Cell<usize>>);

    impl Consumer for OnlyOperations {
        fn interested_in(&self, kind: EventKind) -> bool {
            kind == EventKind::Operation
        }

        fn on_event(&mut self, _event: &Event<'_>) -> anyhow::Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_interest_filters_delivery() {
        let mut ir = Ir::default();
        ir.components
            .schemas
            .insert("Pet".into(), IrSchema::of_type(SchemaType::Object));

        let mut kinds = Vec::new();
        let operations = Rc::new(Cell::new(0));
        {
            let mut broadcaster = Broadcaster::new();
            broadcaster.register_for(&[EventKind::Schema], |event: &Event<'_>| {
                kinds.push(event.kind());
                Ok(())
            });
            broadcaster.register(OnlyOperations(Rc::clone(&operations)));
            broadcaster.broadcast(&ir).unwrap();
        }
        assert_eq!(kinds, vec![EventKind::Schema]);
        assert_eq!(operations.get(), 0);
    }

    #[test]
    fn test_consumer_error_aborts() {
        let mut ir = Ir::default();
        ir.components
            .schemas
            .insert("A".into(), IrSchema::of_type(SchemaType::String));
        ir.components
            .schemas
            .insert("B".into(), IrSchema::of_type(SchemaType::String));

        let mut delivered = 0;
        let result = {
            let mut broadcaster = Broadcaster::new();
            broadcaster.register(|event: &Event<'_>| match event {
                Event::Schema { name: "A", .. } => anyhow::bail!("cannot emit A"),
                _ => {
                    delivered += 1;
                    Ok(())
                }
            });
            broadcaster.broadcast(&ir)
        };
        let err = result.unwrap_err();
        assert!(matches!(err, ResolveError::Consumer { event: EventKind::Schema, .. }));
        assert!(err.to_string().contains("cannot emit A"));
        assert_eq!(delivered, 1);
    }

    #[test]
    fn test_event_pointer() {
        let ir = Ir::default();
        assert_eq!(Event::Before(&ir).pointer(), None);
        let schema = IrSchema::default();
        assert_eq!(
            Event::Schema { name: "Pet", schema: &schema }.pointer().as_deref(),
            Some("#/components/schemas/Pet")
        );
    }
}
