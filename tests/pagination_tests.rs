#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{resolve_with, resolve_yaml};
use openapi_ir::config::{PaginationConfig, ParserConfig};
use openapi_ir::ir::{HttpMethod, Pagination, ParameterLocation};

const LISTINGS: &str = r##"
openapi: 3.0.3
info: { title: Listings, version: "1" }
paths:
  /items:
    get:
      operationId: listItems
      parameters:
        - { name: page_token, in: query, schema: { type: string } }
        - { name: limit, in: query, schema: { type: integer } }
        - name: window
          in: query
          schema: { $ref: "#/components/schemas/Window" }
      responses:
        "200": { description: ok }
    post:
      operationId: searchItems
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                query: { type: string }
                cursor: { type: string }
      responses:
        "200": { description: ok }
    put:
      operationId: replaceItems
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                cursor: { type: object }
      responses:
        "200": { description: ok }
components:
  schemas:
    Window:
      type: object
      properties:
        offset: { type: integer }
    Envelope:
      allOf:
        - $ref: "#/components/schemas/Window"
        - type: object
          properties:
            data: { type: array, items: { type: string } }
"##;

#[test]
fn test_parameter_name_match() {
    let resolution = resolve_yaml(LISTINGS);
    let op = resolution.ir.operation("/items", HttpMethod::Get).unwrap();

    let token = op.parameters.get(ParameterLocation::Query, "page_token").unwrap();
    assert_eq!(token.pagination, Pagination::ByName);
    let limit = op.parameters.get(ParameterLocation::Query, "limit").unwrap();
    assert_eq!(limit.pagination, Pagination::Off);
}

#[test]
fn test_parameter_schema_reference_is_followed() {
    let resolution = resolve_yaml(LISTINGS);
    let op = resolution.ir.operation("/items", HttpMethod::Get).unwrap();
    let window = op.parameters.get(ParameterLocation::Query, "window").unwrap();
    assert_eq!(window.pagination.field(), Some("offset"));
}

#[test]
fn test_body_field_is_type_gated() {
    let resolution = resolve_yaml(LISTINGS);

    let search = resolution.ir.operation("/items", HttpMethod::Post).unwrap();
    assert_eq!(search.body.as_ref().unwrap().pagination, Pagination::Field("cursor".into()));

    let replace = resolution.ir.operation("/items", HttpMethod::Put).unwrap();
    assert_eq!(replace.body.as_ref().unwrap().pagination, Pagination::Off);
}

#[test]
fn test_component_schema_hints() {
    let resolution = resolve_yaml(LISTINGS);
    let schemas = &resolution.ir.components.schemas;
    assert_eq!(schemas["Window"].pagination.field(), Some("offset"));
    assert_eq!(schemas["Envelope"].pagination.field(), Some("offset"));
}

#[test]
fn test_pagination_serializes_as_bool_or_name() {
    let resolution = resolve_yaml(LISTINGS);
    let op = resolution.ir.operation("/items", HttpMethod::Get).unwrap();
    let json = serde_json::to_value(op).unwrap();

    assert_eq!(json["parameters"]["query"]["page_token"]["pagination"], true);
    assert_eq!(json["parameters"]["query"]["window"]["pagination"], "offset");
    assert!(json["parameters"]["query"]["limit"].get("pagination").is_none());
}

#[test]
fn test_keywords_are_configurable() {
    let config = ParserConfig {
        pagination: PaginationConfig {
            keywords: vec!["limit".to_string()],
        },
        ..ParserConfig::default()
    };
    let resolution = resolve_with(LISTINGS, &config);
    let op = resolution.ir.operation("/items", HttpMethod::Get).unwrap();

    let limit = op.parameters.get(ParameterLocation::Query, "limit").unwrap();
    assert_eq!(limit.pagination, Pagination::ByName);
    let token = op.parameters.get(ParameterLocation::Query, "page_token").unwrap();
    assert_eq!(token.pagination, Pagination::Off);
}
