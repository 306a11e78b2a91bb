//! # Intermediate Representation
//!
//! The version-agnostic model produced by [`resolve`](crate::resolve). Nothing
//! in this module knows whether a node came from Swagger 2.0 or OpenAPI 3.x:
//!
//! - [`IrSchema`] - one canonical schema node; compositions, enums, tuples and
//!   nullability are all expressed through `items` + `logicalOperator`
//! - [`IrOperation`] - one method on one path, with parameters keyed by
//!   location, a single negotiated body and one representative response per
//!   status code
//! - [`Ir::webhooks`] - OpenAPI 3.1 webhooks, keyed by name, each holding
//!   operations exactly like a path
//! - [`IrComponents`] - reusable schemas, parameters and request bodies, keyed
//!   by name in declared order
//!
//! Every type serializes with `serde` to the JSON shape downstream generators
//! consume (`camelCase` keys, `$ref`, `type`, `const`).

mod operation;
mod schema;

pub use operation::*;
pub use schema::*;

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Operations of one path, iterated in canonical method order.
pub type IrPathItem = BTreeMap<HttpMethod, IrOperation>;

/// Reusable definitions, populated only from document-level components
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrComponents {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, IrSchema>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, IrParameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, IrRequestBody>,
}

/// The finished representation of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ir {
    pub components: IrComponents,
    pub paths: IndexMap<String, IrPathItem>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub webhooks: IndexMap<String, IrPathItem>,
    pub servers: Vec<IrServer>,
}

impl Ir {
    /// Look up an operation.
    #[must_use]
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&IrOperation> {
        self.paths.get(path).and_then(|item| item.get(&method))
    }

    /// All operations, paths in declared order and methods in canonical order.
    pub fn operations(&self) -> impl Iterator<Item = &IrOperation> {
        self.paths.values().flat_map(|item| item.values())
    }

    /// Look up a webhook operation.
    #[must_use]
    pub fn webhook(&self, name: &str, method: HttpMethod) -> Option<&IrOperation> {
        self.webhooks.get(name).and_then(|item| item.get(&method))
    }

    /// Find an operation by its unique id.
    #[must_use]
    pub fn operation_by_id(&self, id: &str) -> Option<&IrOperation> {
        self.operations().find(|op| op.id == id)
    }
}
