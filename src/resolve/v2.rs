//! Swagger 2.0 adapter and document walker.
//!
//! `body` and `formData` parameters are diverted into the request body here,
//! so the shared normalizers only ever see path/query/header parameters.

use super::context::Context;
use super::media::{negotiate, DEFAULT_MEDIA_TYPE, FORM_DATA, URL_ENCODED};
use super::operation::{extensions, operation_to_ir, BodySchema, BodySource, OperationSource, ResponseSource};
use super::parameter::{merge_by_key, parameter_to_ir, ParameterSource};
use super::{security, server, walk_schemas};
use crate::error::ResolveError;
use crate::ir::{HttpMethod, ParameterLocation, ParameterStyle};
use crate::spec::v2::{Document, Operation, Parameter, PathItem, Response, SimpleParameter};
use crate::spec::{ObjectOrReference, RawSchema, SchemaOrBool, SchemaTypes};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

/// Walk `document` into `ctx.ir`.
pub(crate) fn walk(ctx: &mut Context<'_>, document: &Document) -> Result<(), ResolveError> {
    let schemes = security::v2_schemes(&document.security_definitions);

    walk_schemas(ctx, &document.definitions)?;

    for (name, parameter) in &document.parameters {
        let Some(source) = parameter_source(parameter) else {
            debug!(parameter = %name, "body and form parameters are not reusable parameters");
            continue;
        };
        let pointer = format!("#/components/parameters/{name}");
        if !ctx.config.is_included(&pointer) {
            debug!(pointer = %pointer, "skipping excluded parameter");
            continue;
        }
        ctx.set_location(&pointer);
        let ir = parameter_to_ir(ctx, &source)?;
        ctx.ir.components.parameters.insert(name.clone(), ir);
    }

    ctx.ir.servers = server::v2_servers(
        &document.schemes,
        document.host.as_deref(),
        document.base_path.as_deref(),
        ctx.config.input_locations(),
    );

    for (path, item) in &document.paths {
        for method in HttpMethod::ALL {
            let Some(operation) = item.operation(method) else {
                continue;
            };
            let pointer = format!("#/paths{path}/{method}");
            if !ctx.config.is_included(&pointer) {
                debug!(pointer = %pointer, "skipping excluded operation");
                continue;
            }
            ctx.set_location(&pointer);
            debug!(pointer = %pointer, "resolving operation");
            let source = operation_source(ctx, document, item, path, method, operation)?;
            let ir = operation_to_ir(ctx, &source, &schemes)?;
            ctx.ir.paths.entry(path.clone()).or_default().insert(method, ir);
        }
    }
    Ok(())
}

/// Canonical form of a path/query/header parameter; `None` for body and form entries.
pub(crate) fn parameter_source(parameter: &Parameter) -> Option<ParameterSource> {
    let (location, simple) = match parameter {
        Parameter::Body(_) | Parameter::FormData(_) => return None,
        Parameter::Query(p) => (ParameterLocation::Query, p),
        Parameter::Header(p) => (ParameterLocation::Header, p),
        Parameter::Path(p) => (ParameterLocation::Path, p),
    };

    let collection_format = simple.collection_format.as_deref();
    let style = match collection_format {
        Some("ssv") => Some(ParameterStyle::SpaceDelimited),
        Some("pipes") => Some(ParameterStyle::PipeDelimited),
        _ => None,
    };

    Some(ParameterSource {
        name: simple.name.clone(),
        location,
        schema: simple.schema.clone(),
        required: simple.required.unwrap_or(location == ParameterLocation::Path),
        deprecated: None,
        description: simple.description.clone(),
        style,
        explode: collection_format.map(|format| format == "multi"),
        allow_reserved: None,
    })
}

fn operation_source(
    ctx: &Context<'_>,
    document: &Document,
    item: &PathItem,
    path: &str,
    method: HttpMethod,
    operation: &Operation,
) -> Result<OperationSource, ResolveError> {
    let resolve = |nodes: &[ObjectOrReference<Parameter>]| -> Result<Vec<Parameter>, ResolveError> {
        nodes
            .iter()
            .map(|node| ctx.resolve_object(node, "parameter"))
            .collect()
    };
    let merged = merge_by_key(resolve(&item.parameters)?, resolve(&operation.parameters)?, |p| {
        (p.name().to_string(), p.location())
    });

    let mut parameters = Vec::new();
    let mut body_parameter = None;
    let mut form_fields = Vec::new();
    for parameter in &merged {
        match parameter {
            Parameter::Body(body) => body_parameter = Some(body),
            Parameter::FormData(field) => form_fields.push(field),
            _ => parameters.extend(parameter_source(parameter)),
        }
    }

    let consumes = operation
        .consumes
        .as_deref()
        .or(document.consumes.as_deref())
        .unwrap_or_default();
    let produces = operation
        .produces
        .as_deref()
        .or(document.produces.as_deref())
        .unwrap_or_default();

    let body = match body_parameter {
        Some(body) => Some(BodySource {
            media_type: negotiate(consumes.iter().map(String::as_str))
                .unwrap_or(DEFAULT_MEDIA_TYPE)
                .to_string(),
            schema: BodySchema::Inline(body.schema.clone()),
            required: body.required.unwrap_or(false),
            description: body.description.clone(),
        }),
        None if !form_fields.is_empty() => Some(form_body(&form_fields, consumes)),
        None => None,
    };

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
        let source = match response.schema {
            Some(schema) => ResponseSource {
                media_type: Some(
                    negotiate(produces.iter().map(String::as_str))
                        .unwrap_or(DEFAULT_MEDIA_TYPE)
                        .to_string(),
                ),
                schema: Some(schema),
                description: response.description,
            },
            None => ResponseSource {
                description: response.description,
                ..ResponseSource::default()
            },
        };
        responses.insert(status.clone(), source);
    }

    Ok(OperationSource {
        method,
        path: path.to_string(),
        webhook: false,
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
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
        servers: Vec::new(),
        extensions: extensions(&operation.other),
    })
}

fn is_file(schema: &RawSchema) -> bool {
    matches!(&schema.schema_type, Some(SchemaTypes::One(t)) if t == "file")
}

/// Collapse `formData` parameters into one object body.
fn form_body(fields: &[&SimpleParameter], consumes: &[String]) -> BodySource {
    let has_file = fields.iter().any(|field| is_file(&field.schema));
    let declares = |media_type: &str| consumes.iter().any(|c| c.eq_ignore_ascii_case(media_type));
    let media_type = if has_file && declares(FORM_DATA) {
        FORM_DATA
    } else if declares(URL_ENCODED) {
        URL_ENCODED
    } else if declares(FORM_DATA) || has_file {
        FORM_DATA
    } else {
        URL_ENCODED
    };

    let mut schema = RawSchema::of_type("object");
    let mut properties = IndexMap::with_capacity(fields.len());
    for field in fields {
        let mut property = field.schema.clone();
        if property.description.is_none() {
            property.description = field.description.clone();
        }
        properties.insert(field.name.clone(), SchemaOrBool::Schema(Box::new(property)));
        if field.required.unwrap_or(false) {
            schema.required.push(field.name.clone());
        }
    }
    schema.properties = Some(properties);

    BodySource {
        media_type: media_type.to_string(),
        schema: BodySchema::Inline(schema),
        required: fields.iter().any(|field| field.required.unwrap_or(false)),
        description: None,
    }
}
