//! # Resolution Engine
//!
//! Turns a bundled Swagger 2.0 / OpenAPI 3.x document into the version-agnostic
//! [`Ir`]. The entry points are:
//!
//! - [`resolve_document`] - walk the document and return the IR plus diagnostics
//! - [`parse_spec`] - the same, then replay the finished IR through a
//!   [`Broadcaster`]
//!
//! ## Pipeline
//!
//! ```text
//! raw JSON ──read_document──► v2::Document | v3::Document
//!                                   │ (version adapter)
//!                                   ▼
//!              ParameterSource / OperationSource / RawSchema
//!                                   │ (shared normalizers)
//!                                   ▼
//!                                   Ir ──► Broadcaster ──► consumers
//! ```
//!
//! The adapters in `v2` and `v3` are the only code that knows which grammar a
//! document was written in. Everything below them sees canonical sources.
//!
//! ## Example
//!
//! ```rust
//! use openapi_ir::config::ResolverConfig;
//! use openapi_ir::ir::HttpMethod;
//! use openapi_ir::resolve::resolve_document;
//! use serde_json::json;
//!
//! let document = json!({
//!     "openapi": "3.0.3",
//!     "paths": {
//!         "/pets": { "get": { "operationId": "listPets", "responses": { "204": {} } } }
//!     }
//! });
//! let resolution = resolve_document(&document, &ResolverConfig::default()).unwrap();
//! let op = resolution.ir.operation("/pets", HttpMethod::Get).unwrap();
//! assert_eq!(op.id, "listPets");
//! ```

pub mod context;
pub mod ids;
pub mod media;
pub mod operation;
pub mod pagination;
pub mod parameter;
pub mod reference;
pub mod schema;
pub mod security;
pub mod server;
mod v2;
mod v3;

pub use context::Context;
pub use schema::{schema_to_ir, SchemaState};

use crate::broadcast::Broadcaster;
use crate::config::ResolverConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ResolveError;
use crate::ir::Ir;
use crate::spec::{read_document, Document, RawSchema};
use indexmap::IndexMap;
use pagination::pagination_field;
use serde_json::Value;
use tracing::{debug, info};

/// Result of one successful run
#[derive(Debug, Clone)]
pub struct Resolution {
    pub ir: Ir,
    pub diagnostics: Diagnostics,
}

/// Resolve `document` into the IR.
///
/// # Errors
///
/// Fails on an unsupported version, a document that does not have the shape
/// of its declared version, or a dangling `$ref`. Everything else is degraded
/// and recorded in [`Resolution::diagnostics`].
pub fn resolve_document(document: &Value, config: &ResolverConfig) -> Result<Resolution, ResolveError> {
    let typed = read_document(document)?;
    let mut ctx = Context::new(document, config);

    match &typed {
        Document::V2(doc) => v2::walk(&mut ctx, doc)?,
        Document::V3(doc) => v3::walk(&mut ctx, doc)?,
    }

    let (ir, diagnostics) = ctx.finish();
    info!(
        schemas = ir.components.schemas.len(),
        parameters = ir.components.parameters.len(),
        request_bodies = ir.components.request_bodies.len(),
        operations = ir.operations().count(),
        webhooks = ir.webhooks.values().map(|item| item.len()).sum::<usize>(),
        diagnostics = diagnostics.len(),
        "document resolved"
    );
    Ok(Resolution { ir, diagnostics })
}

/// Resolve `document` and deliver the traversal events to `broadcaster`.
///
/// A consumer error aborts the remaining events and is returned as
/// [`ResolveError::Consumer`].
pub fn parse_spec(
    document: &Value,
    config: &ResolverConfig,
    broadcaster: &mut Broadcaster,
) -> Result<Resolution, ResolveError> {
    let resolution = resolve_document(document, config)?;
    broadcaster.broadcast(&resolution.ir)?;
    Ok(resolution)
}

/// Normalize reusable schemas in declared order.
///
/// Each root is resolved with its own pointer on the tracker, so a schema
/// that refers to itself becomes a `$ref` to its own name.
pub(crate) fn walk_schemas(ctx: &mut Context<'_>, schemas: &IndexMap<String, RawSchema>) -> Result<(), ResolveError> {
    for (name, raw) in schemas {
        let pointer = format!("#/components/schemas/{name}");
        if !ctx.config.is_included(&pointer) {
            debug!(pointer = %pointer, "skipping excluded schema");
            continue;
        }
        ctx.set_location(&pointer);
        debug!(pointer = %pointer, "resolving schema");
        let state = SchemaState::component(pointer.clone());
        let (ir, complete) = ctx.expanding_complete(&pointer, |ctx| schema_to_ir(ctx, raw, &state));
        let mut ir = ir?;
        ir.pagination = pagination_field(ctx, "", raw)?;
        if complete {
            ctx.cache_scopes(&pointer, ir.access_scopes.clone());
        }
        ctx.ir.components.schemas.insert(name.clone(), ir);
    }
    Ok(())
}
