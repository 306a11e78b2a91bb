//! Pagination Inference.
//!
//! A shallow name/type heuristic. A name matching one of the configured
//! keywords is a hint on its own; otherwise a scalar direct property whose key
//! matches names the controlling field. References are followed for at most
//! one hop and `allOf` branches share that budget.

use super::context::Context;
use super::reference;
use crate::error::ResolveError;
use crate::ir::Pagination;
use crate::spec::{RawSchema, SchemaOrBool};
use std::borrow::Cow;

const SCALAR_TYPES: [&str; 4] = ["boolean", "integer", "number", "string"];

/// Pagination hint for a parameter, body or schema called `name`.
pub fn pagination_field(ctx: &Context<'_>, name: &str, schema: &RawSchema) -> Result<Pagination, ResolveError> {
    field(ctx, name, schema, 1)
}

fn field(ctx: &Context<'_>, name: &str, schema: &RawSchema, hops: usize) -> Result<Pagination, ResolveError> {
    if ctx.config.is_pagination_keyword(name) {
        return Ok(Pagination::ByName);
    }

    if let Some(pointer) = &schema.reference {
        if hops == 0 {
            return Ok(Pagination::Off);
        }
        let target = schema_like(ctx, pointer)?;
        return field(ctx, name, &target, hops - 1);
    }

    for (key, property) in schema.properties.iter().flatten() {
        if !ctx.config.is_pagination_keyword(key) {
            continue;
        }
        let SchemaOrBool::Schema(property) = property else {
            continue;
        };
        let property: Cow<'_, RawSchema> = match &property.reference {
            Some(pointer) if hops > 0 => Cow::Owned(schema_like(ctx, pointer)?),
            Some(_) => continue,
            None => Cow::Borrowed(&**property),
        };
        if property.types().iter().any(|t| SCALAR_TYPES.contains(t)) {
            return Ok(Pagination::Field(key.clone()));
        }
    }

    for branch in schema.all_of.iter().flatten() {
        let pagination = field(ctx, name, branch, hops)?;
        if !pagination.is_off() {
            return Ok(pagination);
        }
    }

    Ok(Pagination::Off)
}

/// The schema behind `pointer`, unwrapping a parameter's `schema` when the
/// target is a parameter object.
fn schema_like(ctx: &Context<'_>, pointer: &str) -> Result<RawSchema, ResolveError> {
    let node = reference::lookup(ctx.document, pointer)?;
    let node = match (node.get("in"), node.get("schema")) {
        (Some(_), Some(schema)) => schema,
        _ => node,
    };
    Ok(RawSchema::from_value(node.clone()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::ResolverConfig;
    use serde_json::{json, Value};

    fn infer(document: &Value, name: &str, schema: Value) -> Pagination {
        let config = ResolverConfig::default();
        let ctx = Context::new(document, &config);
        let raw: RawSchema = serde_json::from_value(schema).unwrap();
        pagination_field(&ctx, name, &raw).unwrap()
    }

    #[test]
    fn test_name_match_wins() {
        let document = json!({});
        assert_eq!(infer(&document, "page_token", json!({ "type": "string" })), Pagination::ByName);
        assert_eq!(infer(&document, "limit", json!({ "type": "integer" })), Pagination::Off);
    }

    #[test]
    fn test_direct_property_is_type_gated() {
        let document = json!({});
        let scalar = json!({ "type": "object", "properties": { "cursor": { "type": "string" } } });
        assert_eq!(infer(&document, "body", scalar), Pagination::Field("cursor".into()));

        let nested = json!({ "type": "object", "properties": { "cursor": { "type": "object" } } });
        assert_eq!(infer(&document, "body", nested), Pagination::Off);

        let deep = json!({ "properties": { "meta": { "properties": { "cursor": { "type": "string" } } } } });
        assert_eq!(infer(&document, "body", deep), Pagination::Off);
    }

    #[test]
    fn test_reference_followed_one_hop() {
        let document = json!({
            "components": {
                "schemas": {
                    "Query": { "properties": { "offset": { "$ref": "#/components/schemas/Offset" } } },
                    "Offset": { "type": "integer" },
                    "Listing": { "properties": { "cursor": { "type": "string" } } },
                    "Alias": { "$ref": "#/components/schemas/Query" }
                },
                "parameters": {
                    "Page": { "name": "p", "in": "query", "schema": { "$ref": "#/components/schemas/Query" } }
                }
            }
        });
        assert_eq!(
            infer(&document, "q", json!({ "$ref": "#/components/schemas/Listing" })),
            Pagination::Field("cursor".into())
        );
        assert_eq!(
            infer(&document, "q", json!({ "$ref": "#/components/schemas/Query" })),
            Pagination::Off
        );
        assert_eq!(
            infer(&document, "q", json!({ "properties": { "offset": { "$ref": "#/components/schemas/Offset" } } })),
            Pagination::Field("offset".into())
        );
        assert_eq!(
            infer(&document, "q", json!({ "$ref": "#/components/schemas/Alias" })),
            Pagination::Off
        );
        assert_eq!(
            infer(&document, "q", json!({ "$ref": "#/components/parameters/Page" })),
            Pagination::Off
        );
    }

    #[test]
    fn test_all_of_branches() {
        let document = json!({});
        let schema = json!({
            "allOf": [
                { "properties": { "limit": { "type": "integer" } } },
                { "properties": { "after": { "type": "string" } } }
            ]
        });
        assert_eq!(infer(&document, "", schema), Pagination::Field("after".into()));
    }
}
