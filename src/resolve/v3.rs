//! OpenAPI 3.0.x / 3.1.x adapter and document walker.

use super::context::Context;
use super::media::negotiate;
use super::operation::{extensions, operation_to_ir, BodySchema, BodySource, OperationSource, ResponseSource};
use super::parameter::{merge_by_key, parameter_to_ir, ParameterSource};
use super::reference::{self, canonical};
use super::schema::{schema_to_ir, SchemaState};
use super::security::{self, SecuritySchemes};
use super::{pagination::pagination_field, server, walk_schemas};
use crate::error::ResolveError;
use crate::ir::{HttpMethod, IrRequestBody, ParameterLocation, ParameterStyle};
use crate::spec::v3::{Document, MediaType, Operation, Parameter, PathItem, RequestBody, Response};
use crate::spec::{ObjectOrReference, RawSchema};
use indexmap::IndexMap;
use serde::Deserialize;
use std::borrow::Cow;
use tracing::debug;

/// Walk `document` into `ctx.ir`.
///
/// Order: component schemas, parameters and request bodies, then servers,
/// then every path in declared order with its methods in canonical order,
/// then webhooks the same way.
pub(crate) fn walk(ctx: &mut Context<'_>, document: &Document) -> Result<(), ResolveError> {
    let schemes = security::v3_schemes(ctx, &document.components.security_schemes)?;

    walk_schemas(ctx, &document.components.schemas)?;

    for (name, node) in &document.components.parameters {
        let pointer = format!("#/components/parameters/{name}");
        if !ctx.config.is_included(&pointer) {
            debug!(pointer = %pointer, "skipping excluded parameter");
            continue;
        }
        ctx.set_location(&pointer);
        let raw = ctx.resolve_object(node, "parameter")?;
        let parameter = parameter_to_ir(ctx, &parameter_source(&raw, &pointer)?)?;
        ctx.ir.components.parameters.insert(name.clone(), parameter);
    }

    for (name, node) in &document.components.request_bodies {
        let pointer = format!("#/components/requestBodies/{name}");
        if !ctx.config.is_included(&pointer) {
            debug!(pointer = %pointer, "skipping excluded request body");
            continue;
        }
        ctx.set_location(&pointer);
        let raw = ctx.resolve_object(node, "request body")?;
        let (media_type, schema) = match negotiate_content(&raw.content) {
            Some((media_type, schema)) => (Some(media_type.to_string()), schema),
            None => (None, RawSchema::default()),
        };

        let mut described = schema.clone();
        if described.description.is_none() {
            described.description = raw.description.clone();
        }
        let ir = ctx.expanding(&pointer, |ctx| schema_to_ir(ctx, &described, &SchemaState::default()))?;
        let pagination = pagination_field(ctx, "", &schema)?;
        ctx.ir.components.request_bodies.insert(
            name.clone(),
            IrRequestBody {
                description: raw.description.clone(),
                media_type,
                required: raw.required.unwrap_or(false),
                schema: ir,
                pagination,
            },
        );
    }

    ctx.ir.servers = server::v3_servers(&document.servers, ctx.config.input_locations());

    for (path, item) in &document.paths {
        walk_item(ctx, document, &schemes, path, item, false)?;
    }
    for (name, item) in &document.webhooks {
        walk_item(ctx, document, &schemes, name, item, true)?;
    }
    Ok(())
}

/// Resolve the methods of one path item, or of one webhook when `webhook` is set.
fn walk_item(
    ctx: &mut Context<'_>,
    document: &Document,
    schemes: &SecuritySchemes,
    key: &str,
    item: &PathItem,
    webhook: bool,
) -> Result<(), ResolveError> {
    let item = match &item.reference {
        Some(pointer) => {
            let base: PathItem = ctx.resolve(pointer, "path item")?;
            Cow::Owned(item.clone().merged_over(base))
        }
        None => Cow::Borrowed(item),
    };
    for method in HttpMethod::ALL {
        let Some(operation) = item.operation(method) else {
            continue;
        };
        let pointer = if webhook {
            format!("#/webhooks/{key}/{method}")
        } else {
            format!("#/paths{key}/{method}")
        };
        if !ctx.config.is_included(&pointer) {
            debug!(pointer = %pointer, "skipping excluded operation");
            continue;
        }
        ctx.set_location(&pointer);
        debug!(pointer = %pointer, "resolving operation");
        let mut source = operation_source(ctx, document, &item, key, method, operation)?;
        source.webhook = webhook;
        let ir = operation_to_ir(ctx, &source, schemes)?;
        let items = if webhook {
            &mut ctx.ir.webhooks
        } else {
            &mut ctx.ir.paths
        };
        items.entry(key.to_string()).or_default().insert(method, ir);
    }
    Ok(())
}

/// The winning media type of a content map and its schema.
fn negotiate_content(content: &IndexMap<String, MediaType>) -> Option<(&str, RawSchema)> {
    let media_type = negotiate(content.keys().map(String::as_str))?;
    let schema = content[media_type].schema.clone().unwrap_or_default();
    Some((media_type, schema))
}

/// Canonical form of a resolved parameter; `pointer` names it in errors.
pub(crate) fn parameter_source(parameter: &Parameter, pointer: &str) -> Result<ParameterSource, ResolveError> {
    let location: ParameterLocation = parameter.location.parse().map_err(|message| ResolveError::InvalidDocument {
        pointer: pointer.to_string(),
        message,
    })?;

    let schema = match (&parameter.schema, &parameter.content) {
        (Some(schema), _) => schema.clone(),
        (None, Some(content)) => negotiate_content(content).map(|(_, schema)| schema).unwrap_or_default(),
        (None, None) => RawSchema::default(),
    };

    Ok(ParameterSource {
        name: parameter.name.clone(),
        location,
        schema,
        required: parameter.required.unwrap_or(location == ParameterLocation::Path),
        deprecated: parameter.deprecated,
        description: parameter.description.clone(),
        style: parameter
            .style
            .as_deref()
            .and_then(|style| style.parse::<ParameterStyle>().ok()),
        explode: parameter.explode,
        allow_reserved: parameter.allow_reserved,
    })
}

fn resolve_parameters(
    ctx: &Context<'_>,
    nodes: &[ObjectOrReference<Parameter>],
) -> Result<Vec<Parameter>, ResolveError> {
    nodes
        .iter()
        .map(|node| ctx.resolve_object(node, "parameter"))
        .collect()
}

fn operation_source(
    ctx: &Context<'_>,
    document: &Document,
    item: &PathItem,
    path: &str,
    method: HttpMethod,
    operation: &Operation,
) -> Result<OperationSource, ResolveError> {
    let merged = merge_by_key(
        resolve_parameters(ctx, &item.parameters)?,
        resolve_parameters(ctx, &operation.parameters)?,
        |p| (p.name.clone(), p.location.clone()),
    );
    let parameters = merged
        .iter()
        .map(|parameter| parameter_source(parameter, ctx.location()))
        .collect::<Result<Vec<_>, _>>()?;

    let body = operation
        .request_body
        .as_ref()
        .map(|node| body_source(ctx, node))
        .transpose()?
        .flatten();

    let mut responses = IndexMap::with_capacity(operation.responses.len());
    for (status, value) in &operation.responses {
        if status.starts_with("x-") {
            continue;
        }
        let pointer = format!("{}/responses/{status}", ctx.location());
        let node = ObjectOrReference::<Response>::deserialize(value).map_err(|source| ResolveError::UnexpectedShape {
            pointer,
            expected: "response",
            source,
        })?;
        let response = ctx.resolve_object(&node, "response")?;
        responses.insert(status.clone(), response_source(&response));
    }

    let servers = operation
        .servers
        .as_ref()
        .or(item.servers.as_ref())
        .map(|servers| servers.iter().map(server::server_to_ir).collect())
        .unwrap_or_default();

    Ok(OperationSource {
        method,
        path: path.to_string(),
        webhook: false,
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone().or_else(|| item.summary.clone()),
        description: operation.description.clone().or_else(|| item.description.clone()),
        tags: operation.tags.clone(),
        deprecated: operation.deprecated,
        parameters,
        body,
        responses,
        security: operation
            .security
            .clone()
            .or_else(|| document.security.clone())
            .unwrap_or_default(),
        servers,
        extensions: extensions(&operation.other),
    })
}

fn body_source(ctx: &Context<'_>, node: &ObjectOrReference<RequestBody>) -> Result<Option<BodySource>, ResolveError> {
    let component = match node {
        ObjectOrReference::Ref { reference } => {
            let pointer = canonical(reference);
            reference::is_top_level_component(&pointer).then_some(pointer)
        }
        ObjectOrReference::Object(_) => None,
    };
    let body = ctx.resolve_object(node, "request body")?;
    let Some((media_type, raw)) = negotiate_content(&body.content) else {
        return Ok(None);
    };

    let schema = match component {
        Some(pointer) => BodySchema::Component { pointer, raw },
        None => BodySchema::Inline(raw),
    };
    Ok(Some(BodySource {
        media_type: media_type.to_string(),
        schema,
        required: body.required.unwrap_or(false),
        description: body.description.clone(),
    }))
}

fn response_source(response: &Response) -> ResponseSource {
    let negotiated = response.content.as_ref().and_then(|content| {
        let media_type = negotiate(content.keys().map(String::as_str))?;
        Some((media_type.to_string(), content[media_type].schema.clone()))
    });
    let (media_type, schema) = match negotiated {
        Some((media_type, schema)) => (Some(media_type), schema),
        None => (None, None),
    };
    ResponseSource {
        media_type,
        schema,
        description: response.description.clone(),
    }
}
