#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::resolve_yaml;
use openapi_ir::diagnostics::{Severity, DUPLICATE_OPERATION_ID, UNSUPPORTED_SECURITY_SCHEME};
use openapi_ir::ir::{HttpMethod, IrSecurity, MediaKind, SchemaType};
use std::collections::HashSet;

const DUPLICATES: &str = r##"
openapi: 3.0.3
info: { title: Ids, version: "1" }
paths:
  /pets:
    get:
      operationId: list
      responses: { "200": { description: ok } }
  /owners:
    get:
      operationId: list
      responses: { "200": { description: ok } }
  /owners/{ownerId}/pets:
    get:
      responses: { "200": { description: ok } }
  /toys:
    get:
      operationId: list
      responses: { "200": { description: ok } }
"##;

#[test]
fn test_operation_ids_are_unique() {
    let resolution = resolve_yaml(DUPLICATES);
    let ir = &resolution.ir;

    let ids: Vec<&str> = ir.operations().map(|op| op.id.as_str()).collect();
    assert_eq!(ids, vec!["list", "list2", "getOwnersByOwnerIdPets", "list3"]);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());

    let renamed = ir.operation("/owners", HttpMethod::Get).unwrap();
    assert_eq!(renamed.operation_id.as_deref(), Some("list"));

    let notes: Vec<_> = resolution.diagnostics.with_code(DUPLICATE_OPERATION_ID).collect();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|d| d.severity == Severity::Info));
    assert_eq!(notes[0].pointer, "#/paths/owners/get");
}

const RESPONSES: &str = r##"
openapi: 3.0.3
info: { title: Responses, version: "1" }
paths:
  /pets/{petId}:
    delete:
      operationId: deletePet
      responses:
        "204": { description: gone }
        default: { description: error }
    get:
      operationId: getPet
      responses:
        "200":
          description: ok
          content:
            application/xml:
              schema: { type: string }
            application/json:
              schema: { $ref: "#/components/schemas/Pet" }
        "404":
          $ref: "#/components/responses/NotFound"
        x-internal: { note: ignored }
    put:
      operationId: uploadPhoto
      requestBody:
        required: true
        description: The photo
        content:
          image/png: {}
      responses:
        "200":
          description: ok
          content:
            application/octet-stream: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
  responses:
    NotFound:
      description: missing
      content:
        application/problem+json:
          schema:
            type: object
            properties:
              title: { type: string }
"##;

#[test]
fn test_response_negotiation() {
    let resolution = resolve_yaml(RESPONSES);
    let op = resolution.ir.operation("/pets/{petId}", HttpMethod::Get).unwrap();

    let ok = &op.responses["200"];
    assert_eq!(ok.media_type.as_deref(), Some("application/json"));
    assert_eq!(ok.schema.reference.as_deref(), Some("#/components/schemas/Pet"));
    assert_eq!(ok.schema.description.as_deref(), Some("ok"));

    let missing = &op.responses["404"];
    assert_eq!(missing.media_type.as_deref(), Some("application/problem+json"));
    assert!(missing.schema.properties.contains_key("title"));
    assert_eq!(missing.schema.description.as_deref(), Some("missing"));

    assert!(!op.responses.contains_key("x-internal"));
}

#[test]
fn test_contentless_responses() {
    let resolution = resolve_yaml(RESPONSES);
    let op = resolution.ir.operation("/pets/{petId}", HttpMethod::Delete).unwrap();

    assert_eq!(op.responses["204"].schema.schema_type, Some(SchemaType::Void));
    assert!(op.responses["204"].media_type.is_none());
    assert_eq!(op.responses["204"].schema.description.as_deref(), Some("gone"));
    assert_eq!(op.responses["default"].schema.schema_type, Some(SchemaType::Unknown));
    assert_eq!(op.responses["default"].schema.description.as_deref(), Some("error"));
}

#[test]
fn test_binary_bodies() {
    let resolution = resolve_yaml(RESPONSES);
    let op = resolution.ir.operation("/pets/{petId}", HttpMethod::Put).unwrap();

    let body = op.body.as_ref().unwrap();
    assert_eq!(body.media_type, "image/png");
    assert_eq!(body.kind, Some(MediaKind::OctetStream));
    assert!(body.required);
    assert_eq!(body.schema.description.as_deref(), Some("The photo"));

    let ok = &op.responses["200"];
    assert_eq!(ok.schema.schema_type, Some(SchemaType::String));
    assert_eq!(ok.schema.format.as_deref(), Some("binary"));
}

const SWAGGER_BODIES: &str = r##"
swagger: "2.0"
info: { title: Bodies, version: "1" }
consumes: [application/json]
produces: [application/xml, application/json]
paths:
  /pets:
    post:
      operationId: addPet
      parameters:
        - name: pet
          in: body
          required: true
          description: Pet to add
          schema: { $ref: "#/definitions/Pet" }
      responses:
        "201":
          description: created
          schema: { $ref: "#/definitions/Pet" }
        "400": { description: invalid }
  /pets/{petId}/photo:
    post:
      operationId: uploadPhoto
      consumes: [multipart/form-data]
      parameters:
        - { name: petId, in: path, type: string }
        - { name: caption, in: formData, type: string, description: Shown under the photo }
        - { name: file, in: formData, type: file, required: true }
      responses:
        "204": { description: stored }
  /pets/{petId}/notes:
    post:
      operationId: addNote
      parameters:
        - { name: petId, in: path, type: string }
        - { name: note, in: formData, type: string }
      responses:
        "204": { description: stored }
definitions:
  Pet:
    type: object
    properties:
      name: { type: string }
"##;

#[test]
fn test_swagger_body_parameter() {
    let resolution = resolve_yaml(SWAGGER_BODIES);
    let op = resolution.ir.operation("/pets", HttpMethod::Post).unwrap();

    let body = op.body.as_ref().unwrap();
    assert_eq!(body.media_type, "application/json");
    assert_eq!(body.kind, Some(MediaKind::Json));
    assert!(body.required);
    assert_eq!(body.schema.reference.as_deref(), Some("#/components/schemas/Pet"));
    assert_eq!(body.schema.description.as_deref(), Some("Pet to add"));
    assert!(op.parameters.is_empty());

    let created = &op.responses["201"];
    assert_eq!(created.media_type.as_deref(), Some("application/json"));
    assert_eq!(created.schema.reference.as_deref(), Some("#/components/schemas/Pet"));

    assert_eq!(created.schema.description.as_deref(), Some("created"));

    let invalid = &op.responses["400"];
    assert!(invalid.media_type.is_none());
    assert_eq!(invalid.schema.schema_type, Some(SchemaType::Unknown));
    assert_eq!(invalid.schema.description.as_deref(), Some("invalid"));
}

#[test]
fn test_swagger_form_parameters_become_one_body() {
    let resolution = resolve_yaml(SWAGGER_BODIES);

    let upload = resolution.ir.operation("/pets/{petId}/photo", HttpMethod::Post).unwrap();
    assert_eq!(upload.parameters.len(), 1);
    let body = upload.body.as_ref().unwrap();
    assert_eq!(body.media_type, "multipart/form-data");
    assert_eq!(body.kind, Some(MediaKind::FormData));
    assert!(body.required);

    let schema = &body.schema;
    assert_eq!(schema.schema_type, Some(SchemaType::Object));
    assert!(schema.required.contains("file"));
    assert!(!schema.required.contains("caption"));
    assert_eq!(schema.properties["file"].format.as_deref(), Some("binary"));
    assert_eq!(
        schema.properties["caption"].description.as_deref(),
        Some("Shown under the photo")
    );

    let note = resolution.ir.operation("/pets/{petId}/notes", HttpMethod::Post).unwrap();
    let body = note.body.as_ref().unwrap();
    assert_eq!(body.media_type, "application/x-www-form-urlencoded");
    assert_eq!(body.kind, Some(MediaKind::UrlSearchParams));
    assert!(!body.required);
}

const SECURED: &str = r##"
openapi: 3.0.3
info: { title: Secured, version: "1" }
security:
  - bearer: []
paths:
  /me:
    get:
      operationId: me
      responses: { "200": { description: ok } }
  /health:
    get:
      operationId: health
      security: []
      responses: { "200": { description: ok } }
  /admin:
    get:
      operationId: admin
      security:
        - apiKey: []
          mutual: []
          ghost: []
        - oauth: [admin]
      responses: { "200": { description: ok } }
components:
  securitySchemes:
    bearer: { type: http, scheme: Bearer, bearerFormat: JWT }
    apiKey: { type: apiKey, name: X-Api-Key, in: header }
    mutual: { type: mutualTLS }
    oauth:
      type: oauth2
      flows:
        clientCredentials:
          tokenUrl: https://auth.example.com/token
          scopes: { admin: Administer }
"##;

#[test]
fn test_security_defaults_to_document_requirements() {
    let resolution = resolve_yaml(SECURED);
    let ir = &resolution.ir;

    let me = ir.operation_by_id("me").unwrap();
    assert_eq!(
        me.security,
        vec![IrSecurity::Http {
            scheme: "bearer".to_string(),
            bearer_format: Some("JWT".to_string()),
            description: None,
        }]
    );

    let health = ir.operation_by_id("health").unwrap();
    assert!(health.security.is_empty());
}

#[test]
fn test_referenced_security_scheme_is_resolved() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Shared auth, version: "1" }
security:
  - partnerKey: []
paths:
  /orders:
    get:
      operationId: listOrders
      responses: { "204": { description: none } }
components:
  securitySchemes:
    partnerKey: { $ref: "#/components/securitySchemes/apiKey" }
    apiKey: { type: apiKey, name: X-Partner-Key, in: header }
"##,
    );
    let op = resolution.ir.operation("/orders", HttpMethod::Get).unwrap();

    assert_eq!(op.security.len(), 1);
    assert!(matches!(&op.security[0], IrSecurity::ApiKey { name, .. } if name == "X-Partner-Key"));
    assert_eq!(resolution.diagnostics.with_code(UNSUPPORTED_SECURITY_SCHEME).count(), 0);
}

#[test]
fn test_security_schemes_are_normalized() {
    let resolution = resolve_yaml(SECURED);
    let admin = resolution.ir.operation_by_id("admin").unwrap();

    let kinds: Vec<_> = admin.security.iter().map(IrSecurity::kind).collect();
    assert_eq!(kinds, vec!["apiKey", "oauth2"]);

    let IrSecurity::OAuth2 { flows, .. } = &admin.security[1] else {
        panic!("expected oauth2");
    };
    let client = flows.client_credentials.as_ref().unwrap();
    assert_eq!(client.token_url.as_deref(), Some("https://auth.example.com/token"));
    assert!(flows.implicit.is_none());

    let warnings: Vec<_> = resolution
        .diagnostics
        .with_code(UNSUPPORTED_SECURITY_SCHEME)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("mutual"));
}

#[test]
fn test_extensions_and_metadata() {
    let resolution = resolve_yaml(
        r##"
openapi: 3.0.3
info: { title: Meta, version: "1" }
paths:
  /pets:
    summary: Pets
    get:
      operationId: listPets
      tags: [pets]
      deprecated: true
      x-rate-limit: 10
      responses: { "200": { description: ok } }
"##,
    );
    let op = resolution.ir.operation_by_id("listPets").unwrap();
    assert_eq!(op.summary.as_deref(), Some("Pets"));
    assert_eq!(op.tags, vec!["pets"]);
    assert_eq!(op.deprecated, Some(true));
    assert_eq!(op.extensions["x-rate-limit"], 10);

    let json = serde_json::to_value(op).unwrap();
    assert_eq!(json["x-rate-limit"], 10);
    assert_eq!(json["method"], "get");
}
