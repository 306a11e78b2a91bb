//! # Operation Normalizer
//!
//! Version adapters reduce each path-item method entry to an
//! [`OperationSource`]: parameters already merged and diverted, one negotiated
//! body, one negotiated media type per response, and the effective security
//! requirements. [`operation_to_ir`] turns that into an [`IrOperation`].

use super::context::Context;
use super::ids::derive_id;
use super::media::{self, is_binary};
use super::pagination::pagination_field;
use super::parameter::{parameters_to_ir, ParameterSource};
use super::reference::{canonical, component_name};
use super::schema::{schema_to_ir, SchemaState};
use super::security::{security_to_ir, SecuritySchemes};
use crate::diagnostics::{DUPLICATE_OPERATION_ID, EXCLUDED_REFERENCE};
use crate::error::ResolveError;
use crate::ir::{AccessScopes, HttpMethod, IrBody, IrOperation, IrResponse, IrSchema, IrServer, SchemaType};
use crate::spec::{v3, RawSchema};
use indexmap::IndexMap;
use serde_json::Value;

/// Where a request body's schema comes from
#[derive(Debug, Clone)]
pub enum BodySchema {
    /// Declared on the operation (or a Swagger body/form parameter)
    Inline(RawSchema),
    /// A `$ref` to a reusable request body; `raw` is that body's media schema
    Component { pointer: String, raw: RawSchema },
}

/// A request body in canonical form
#[derive(Debug, Clone)]
pub struct BodySource {
    pub media_type: String,
    pub schema: BodySchema,
    pub required: bool,
    pub description: Option<String>,
}

/// One response, with its media type already negotiated
#[derive(Debug, Clone, Default)]
pub struct ResponseSource {
    /// `None` when the response declares no content at all
    pub media_type: Option<String>,
    pub schema: Option<RawSchema>,
    pub description: Option<String>,
}

/// An operation in canonical form, before schema resolution
#[derive(Debug, Clone)]
pub struct OperationSource {
    pub method: HttpMethod,
    /// Path template, or the webhook name
    pub path: String,
    pub webhook: bool,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: Option<bool>,
    pub parameters: Vec<ParameterSource>,
    pub body: Option<BodySource>,
    pub responses: IndexMap<String, ResponseSource>,
    /// Effective requirements, document defaults already applied
    pub security: Vec<v3::SecurityRequirement>,
    pub servers: Vec<IrServer>,
    pub extensions: IndexMap<String, Value>,
}

/// Only `x-` keys of `other` are passed through.
#[must_use]
pub fn extensions(other: &IndexMap<String, Value>) -> IndexMap<String, Value> {
    other
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Assemble one IR operation.
pub fn operation_to_ir(
    ctx: &mut Context<'_>,
    source: &OperationSource,
    schemes: &SecuritySchemes,
) -> Result<IrOperation, ResolveError> {
    let id = assign_id(ctx, source);
    let parameters = parameters_to_ir(ctx, &source.parameters)?;
    let body = source.body.as_ref().map(|body| body_to_ir(ctx, body)).transpose()?;

    let mut responses = IndexMap::with_capacity(source.responses.len());
    for (status, response) in &source.responses {
        responses.insert(status.clone(), response_to_ir(ctx, status, response)?);
    }

    let security = security_to_ir(ctx, schemes, &source.security);

    Ok(IrOperation {
        id,
        operation_id: source.operation_id.clone(),
        method: source.method,
        path: source.path.clone(),
        summary: source.summary.clone(),
        description: source.description.clone(),
        tags: source.tags.clone(),
        deprecated: source.deprecated,
        parameters,
        body,
        responses,
        security,
        servers: source.servers.clone(),
        extensions: source.extensions.clone(),
    })
}

fn assign_id(ctx: &mut Context<'_>, source: &OperationSource) -> String {
    let ids = if source.webhook {
        &mut ctx.webhook_ids
    } else {
        &mut ctx.ids
    };
    match source.operation_id.as_deref().filter(|id| !id.is_empty()) {
        Some(declared) => {
            let (id, renamed) = ids.claim(declared);
            if renamed {
                ctx.info(
                    DUPLICATE_OPERATION_ID,
                    format!("operationId `{declared}` is already taken, using `{id}`"),
                );
            }
            id
        }
        None => ids.claim(&derive_id(source.method, &source.path)).0,
    }
}

fn body_to_ir(ctx: &mut Context<'_>, body: &BodySource) -> Result<IrBody, ResolveError> {
    let (schema, pagination) = match &body.schema {
        BodySchema::Inline(raw) => {
            let mut described = raw.clone();
            if described.description.is_none() {
                described.description = body.description.clone();
            }
            let schema = schema_to_ir(ctx, &described, &SchemaState::default())?;
            (schema, pagination_field(ctx, "", raw)?)
        }
        BodySchema::Component { pointer, raw } => {
            let pointer = canonical(pointer);
            let mut schema = IrSchema::reference(pointer.clone());
            schema.description = body.description.clone();
            schema.access_scopes = component_body_scopes(ctx, &pointer, raw)?;
            (schema, pagination_field(ctx, "", raw)?)
        }
    };

    Ok(IrBody {
        kind: media::media_kind(&body.media_type),
        media_type: body.media_type.clone(),
        schema,
        required: body.required,
        pagination,
    })
}

/// Scopes of a referenced request body, reusing the walked component when present.
fn component_body_scopes(
    ctx: &mut Context<'_>,
    pointer: &str,
    raw: &RawSchema,
) -> Result<AccessScopes, ResolveError> {
    let name = component_name(pointer);
    if let Some(component) = ctx.ir.components.request_bodies.get(&name) {
        return Ok(component.schema.access_scopes.clone());
    }
    if !ctx.config.is_included(pointer) {
        ctx.warn(
            EXCLUDED_REFERENCE,
            format!("`{pointer}` is excluded by the filters but still referenced"),
        );
    }
    let schema = ctx.expanding(pointer, |ctx| schema_to_ir(ctx, raw, &SchemaState::default()))?;
    Ok(schema.access_scopes)
}

fn response_to_ir(ctx: &mut Context<'_>, status: &str, response: &ResponseSource) -> Result<IrResponse, ResolveError> {
    let mut schema = match (&response.media_type, &response.schema) {
        (_, Some(raw)) => {
            let mut described = raw.clone();
            if described.description.is_none() {
                described.description = response.description.clone();
            }
            schema_to_ir(ctx, &described, &SchemaState::default())?
        }
        (Some(media_type), None) if is_binary(media_type) => IrSchema {
            schema_type: Some(SchemaType::String),
            format: Some("binary".to_string()),
            ..IrSchema::default()
        },
        (None, None) if status == "204" => IrSchema::of_type(SchemaType::Void),
        _ => IrSchema::of_type(SchemaType::Unknown),
    };
    if schema.description.is_none() {
        schema.description = response.description.clone();
    }
    Ok(IrResponse {
        media_type: response.media_type.clone(),
        schema,
    })
}
