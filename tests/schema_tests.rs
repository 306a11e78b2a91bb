#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::resolve_yaml;
use openapi_ir::diagnostics::{MALFORMED_SCHEMA, UNSUPPORTED_ENUM_VALUE};
use openapi_ir::ir::{AccessScope, HttpMethod, LogicalOperator, SchemaType};
use serde_json::json;

const SWAGGER_NULLABLE: &str = r##"
swagger: "2.0"
info: { title: Nullable, version: "1" }
paths: {}
definitions:
  Name:
    type: string
    x-nullable: true
  Nickname:
    type: string
    x-nullable: true
    description: What friends call you
    deprecated: true
"##;

#[test]
fn test_legacy_nullable_wraps_in_or_null() {
    let resolution = resolve_yaml(SWAGGER_NULLABLE);
    let schemas = &resolution.ir.components.schemas;

    assert_eq!(
        serde_json::to_value(&schemas["Name"]).unwrap(),
        json!({
            "items": [{ "type": "string" }, { "type": "null" }],
            "logicalOperator": "or"
        })
    );
    assert_eq!(
        serde_json::to_value(&schemas["Nickname"]).unwrap(),
        json!({
            "description": "What friends call you",
            "deprecated": true,
            "items": [{ "type": "string" }, { "type": "null" }],
            "logicalOperator": "or"
        })
    );
}

#[test]
fn test_type_arrays_become_compositions() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.1.0
info: { title: Types, version: "1" }
paths: {}
components:
  schemas:
    MaybeCount: { type: [integer, "null"] }
    Identifier: { type: [string, integer] }
    Flag: { nullable: true, type: boolean }
"##,
    );
    let schemas = &resolution.ir.components.schemas;

    assert_eq!(
        serde_json::to_value(&schemas["MaybeCount"]).unwrap(),
        json!({ "items": [{ "type": "integer" }, { "type": "null" }], "logicalOperator": "or" })
    );
    assert_eq!(
        serde_json::to_value(&schemas["Identifier"]).unwrap(),
        json!({ "items": [{ "type": "string" }, { "type": "integer" }], "logicalOperator": "or" })
    );
    assert_eq!(schemas["Flag"].items[0].schema_type, Some(SchemaType::Boolean));
    assert_eq!(schemas["Flag"].items[1].schema_type, Some(SchemaType::Null));
}

#[test]
fn test_all_of_required_backfills_sibling_property() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Compose, version: "1" }
paths: {}
components:
  schemas:
    Base:
      type: object
      properties:
        id: { type: string }
    Extended:
      allOf:
        - $ref: "#/components/schemas/Base"
        - type: object
          properties:
            x: { type: integer }
      required: [x]
"##,
    );
    let extended = &resolution.ir.components.schemas["Extended"];

    assert_eq!(extended.logical_operator, Some(LogicalOperator::And));
    assert_eq!(extended.items.len(), 3);
    assert_eq!(extended.items[0].reference.as_deref(), Some("#/components/schemas/Base"));
    assert!(extended.items[0].required.contains("x"));
    assert!(extended.items[1].required.contains("x"));

    let merged = extended.items.last().unwrap();
    assert_eq!(merged.schema_type, Some(SchemaType::Object));
    assert_eq!(merged.properties["x"].schema_type, Some(SchemaType::Integer));
    assert!(merged.required.contains("x"));
}

const PETS: &str = r##"
openapi: 3.0.3
info: { title: Pets, version: "1" }
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                allOf:
                  - $ref: "#/components/schemas/Pet"
components:
  schemas:
    Pet:
      type: object
      required: [petType]
      properties:
        petType: { type: string }
      discriminator:
        propertyName: petType
        mapping:
          dog: "#/components/schemas/Dog"
          hound: "#/components/schemas/Dog"
    Dog:
      allOf:
        - $ref: "#/components/schemas/Pet"
        - type: object
          properties:
            bark: { type: boolean }
    Cat:
      allOf:
        - $ref: "#/components/schemas/Pet"
        - type: object
          properties:
            purr: { type: boolean }
    AnyPet:
      oneOf:
        - $ref: "#/components/schemas/Dog"
        - $ref: "#/components/schemas/Cat"
      discriminator:
        propertyName: petType
"##;

#[test]
fn test_all_of_through_reference_pins_discriminator() {
    let resolution = resolve_yaml(PETS);
    let schemas = &resolution.ir.components.schemas;

    let dog = &schemas["Dog"];
    assert_eq!(dog.logical_operator, Some(LogicalOperator::And));
    assert_eq!(dog.items.len(), 3);
    let tag = &dog.items[1].properties["petType"];
    assert_eq!(tag.logical_operator, Some(LogicalOperator::Or));
    let values: Vec<_> = tag.items.iter().map(|leaf| leaf.constant.clone().unwrap()).collect();
    assert_eq!(values, vec![json!("dog"), json!("hound")]);
    assert!(dog.items[1].required.contains("petType"));

    let cat_tag = &schemas["Cat"].items[1].properties["petType"];
    assert_eq!(cat_tag.schema_type, Some(SchemaType::String));
    assert_eq!(cat_tag.constant, Some(json!("Cat")));
}

#[test]
fn test_inline_single_branch_all_of_collapses() {
    let resolution = resolve_yaml(PETS);
    let op = resolution.ir.operation("/pets", HttpMethod::Get).unwrap();
    let schema = &op.responses["200"].schema;
    assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/Pet"));
    assert!(schema.items.is_empty());
    assert!(schema.logical_operator.is_none());
}

#[test]
fn test_one_of_discriminator_tags_each_branch() {
    let resolution = resolve_yaml(PETS);
    let any_pet = &resolution.ir.components.schemas["AnyPet"];

    assert_eq!(any_pet.logical_operator, Some(LogicalOperator::Or));
    assert_eq!(any_pet.items.len(), 2);

    let dog = &any_pet.items[0];
    assert_eq!(dog.logical_operator, Some(LogicalOperator::And));
    assert_eq!(dog.items[0].properties["petType"].constant, Some(json!("Dog")));
    assert!(dog.items[0].required.contains("petType"));
    assert_eq!(dog.items[1].reference.as_deref(), Some("#/components/schemas/Dog"));
}

#[test]
fn test_enum_decomposes_into_const_leaves() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Enums, version: "1" }
paths: {}
components:
  schemas:
    Status:
      type: string
      enum: [active, inactive, null]
    MaybeStatus:
      type: string
      nullable: true
      enum: [active, null]
    Level:
      type: integer
      enum: [1, 2]
    Mixed:
      enum: [a, [1, 2], true]
"##,
    );
    let schemas = &resolution.ir.components.schemas;

    let status = &schemas["Status"];
    assert_eq!(status.schema_type, Some(SchemaType::Enum));
    assert_eq!(status.logical_operator, Some(LogicalOperator::Or));
    assert_eq!(status.items.len(), 2);
    assert_eq!(status.items[0].constant, Some(json!("active")));
    assert_eq!(status.items[1].schema_type, Some(SchemaType::String));

    let maybe = &schemas["MaybeStatus"];
    assert_eq!(maybe.items.len(), 2);
    assert_eq!(maybe.items[1].schema_type, Some(SchemaType::Null));

    assert!(schemas["Level"]
        .items
        .iter()
        .all(|leaf| leaf.schema_type == Some(SchemaType::Integer)));

    let mixed = &schemas["Mixed"];
    assert_eq!(mixed.items.len(), 2);
    assert_eq!(mixed.items[1].schema_type, Some(SchemaType::Boolean));
    assert_eq!(resolution.diagnostics.with_code(UNSUPPORTED_ENUM_VALUE).count(), 1);
}

#[test]
fn test_fixed_length_arrays_become_tuples() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Arrays, version: "1" }
paths: {}
components:
  schemas:
    Point:
      type: array
      items: { type: number }
      minItems: 2
      maxItems: 2
    Tags:
      type: array
      items: { type: string }
      minItems: 1
    Values:
      type: array
      items:
        oneOf:
          - type: string
          - type: integer
"##,
    );
    let schemas = &resolution.ir.components.schemas;

    let point = &schemas["Point"];
    assert_eq!(point.schema_type, Some(SchemaType::Tuple));
    assert_eq!(point.items.len(), 2);
    assert!(point.items.iter().all(|item| item.schema_type == Some(SchemaType::Number)));

    let tags = &schemas["Tags"];
    assert_eq!(tags.schema_type, Some(SchemaType::Array));
    assert_eq!(tags.items.len(), 1);

    let values = &schemas["Values"];
    assert_eq!(values.schema_type, Some(SchemaType::Array));
    assert_eq!(values.logical_operator, Some(LogicalOperator::Or));
    assert_eq!(values.items.len(), 2);
    assert_eq!(values.items[1].schema_type, Some(SchemaType::Integer));
}

#[test]
fn test_object_additional_properties() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Objects, version: "1" }
paths: {}
components:
  schemas:
    Open: { type: object }
    Counts:
      type: object
      additionalProperties: { type: integer }
    Closed:
      type: object
      properties:
        name: { type: string }
      additionalProperties: false
    Declared:
      type: object
      properties:
        name: { type: string }
"##,
    );
    let schemas = &resolution.ir.components.schemas;

    let open = schemas["Open"].additional_properties.as_deref().unwrap();
    assert_eq!(open.schema_type, Some(SchemaType::Unknown));
    let counts = schemas["Counts"].additional_properties.as_deref().unwrap();
    assert_eq!(counts.schema_type, Some(SchemaType::Integer));
    let closed = schemas["Closed"].additional_properties.as_deref().unwrap();
    assert_eq!(closed.schema_type, Some(SchemaType::Never));
    assert!(schemas["Declared"].additional_properties.is_none());

    let name = &schemas["Declared"].properties["name"];
    assert_eq!(name.access_scope, Some(AccessScope::Both));
}

#[test]
fn test_unrecognized_type_degrades_to_unknown() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Odd, version: "1" }
paths: {}
components:
  schemas:
    Money: { type: currency }
    Anything: { description: free-form }
"##,
    );
    let schemas = &resolution.ir.components.schemas;

    assert_eq!(schemas["Money"].schema_type, Some(SchemaType::Unknown));
    assert_eq!(schemas["Anything"].schema_type, Some(SchemaType::Unknown));
    assert_eq!(schemas["Anything"].description.as_deref(), Some("free-form"));
    assert_eq!(resolution.diagnostics.with_code(MALFORMED_SCHEMA).count(), 1);
}

#[test]
fn test_wrong_shaped_keywords_degrade_without_failing() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Odd, version: "1" }
paths:
  /things:
    get:
      operationId: listThings
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Tuple" }
components:
  schemas:
    Tuple:
      type: array
      items: [{ type: string }]
    Sized:
      type: string
      title: 42
      maxLength: 5.5
      minLength: 1
"##,
    );
    let schemas = &resolution.ir.components.schemas;

    let tuple = &schemas["Tuple"];
    assert_eq!(tuple.schema_type, Some(SchemaType::Array));
    assert_eq!(tuple.items[0].schema_type, Some(SchemaType::Unknown));

    let sized = &schemas["Sized"];
    assert_eq!(sized.schema_type, Some(SchemaType::String));
    assert!(sized.title.is_none());
    assert_eq!(sized.min_length, Some(1));
    assert!(sized.max_length.is_none());

    assert!(resolution.ir.operation_by_id("listThings").is_some());

    let pointers: Vec<_> = resolution
        .diagnostics
        .with_code(MALFORMED_SCHEMA)
        .map(|d| d.pointer.as_str())
        .collect();
    assert_eq!(
        pointers,
        vec!["#/components/schemas/Tuple", "#/components/schemas/Sized", "#/components/schemas/Sized"]
    );
}
