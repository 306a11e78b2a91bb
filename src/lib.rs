//! # openapi-ir
//!
//! **openapi-ir** resolves Swagger 2.0, OpenAPI 3.0.x and OpenAPI 3.1.x
//! documents into one version-agnostic Intermediate Representation (IR) that
//! code and SDK generators can consume without ever seeing a version-specific
//! document shape.
//!
//! ## Overview
//!
//! The three grammars disagree on almost everything a generator cares about:
//! parameter models, nullability, composition, security scheme shapes and
//! where reusable definitions live. This crate reconciles them once:
//!
//! - `$ref`s are canonicalized (`#/definitions/Pet` becomes
//!   `#/components/schemas/Pet`) and self-referential schemas terminate
//! - `allOf`/`anyOf`/`oneOf`, enums, tuples, `type` arrays and nullability all
//!   become `items` + `logicalOperator` compositions
//! - Swagger `body`/`formData` parameters become a single request body
//! - each operation gets one negotiated body, one representative response per
//!   status code, a unique id and its effective security requirements
//! - pagination controls are flagged with a name/type heuristic
//!
//! ## Architecture
//!
//! - **[`spec`]** - typed Swagger 2.0 / OpenAPI 3.x document shapes and loading
//! - **[`resolve`]** - the resolution engine: references, schemas, parameters,
//!   operations, servers and the per-version document walkers
//! - **[`ir`]** - the IR data model and its JSON serialization
//! - **[`broadcast`]** - replays the finished IR to consumers as ordered events
//! - **[`config`]** - include/exclude filters, pagination keywords, input locations
//! - **[`diagnostics`]** - recoverable conditions found during a run
//! - **[`error`]** - fatal conditions
//!
//! ### Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Load as spec::load_document
//!     participant Resolve as resolve::parse_spec
//!     participant Walker as v2/v3 walker
//!     participant Norm as Schema/Parameter/Operation normalizers
//!     participant Bcast as Broadcaster
//!     participant Consumer
//!
//!     Caller->>Load: load_document("openapi.yaml")
//!     Load-->>Caller: serde_json::Value
//!     Caller->>Resolve: parse_spec(&doc, &config, &mut broadcaster)
//!     Resolve->>Walker: walk(ctx, typed document)
//!     Walker->>Norm: components, then paths x methods, then webhooks
//!     Norm-->>Walker: IrSchema / IrParameter / IrOperation
//!     Walker-->>Resolve: Ir + Diagnostics
//!     Resolve->>Bcast: broadcast(&ir)
//!     Bcast->>Consumer: before, schema*, parameter*, requestBody*, operation*, webhook*, after
//!     Resolve-->>Caller: Resolution { ir, diagnostics }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use openapi_ir::broadcast::{Broadcaster, Event};
//! use openapi_ir::config::ParserConfig;
//! use openapi_ir::resolve::parse_spec;
//! use openapi_ir::spec::parse_document;
//!
//! let document = parse_document(r##"
//! swagger: "2.0"
//! host: api.example.com
//! basePath: /v1
//! schemes: [https]
//! paths:
//!   /pets:
//!     get:
//!       operationId: listPets
//!       parameters:
//!         - { name: cursor, in: query, type: string }
//!       responses:
//!         "200":
//!           description: ok
//!           schema: { type: array, items: { $ref: "#/definitions/Pet" } }
//! definitions:
//!   Pet:
//!     type: object
//!     properties:
//!       name: { type: string }
//! "##).unwrap();
//!
//! let config = ParserConfig::default().compile().unwrap();
//! let mut operations = Vec::new();
//! let resolution = {
//!     let mut broadcaster = Broadcaster::new();
//!     broadcaster.register(|event: &Event<'_>| {
//!         if let Event::Operation { operation, .. } = event {
//!             operations.push(operation.id.clone());
//!         }
//!         Ok(())
//!     });
//!     parse_spec(&document, &config, &mut broadcaster).unwrap()
//! };
//!
//! assert_eq!(operations, vec!["listPets"]);
//! assert_eq!(resolution.ir.servers[0].url, "https://api.example.com/v1");
//! assert!(resolution.ir.components.schemas.contains_key("Pet"));
//! ```
//!
//! ## Error Model
//!
//! Only a dangling `$ref`, an unsupported version, a document that does not
//! have the shape of its version, an invalid filter and a failing consumer
//! abort a run ([`error::ResolveError`]). Everything else degrades to a
//! conservative IR shape and is recorded in [`diagnostics::Diagnostics`].

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod logging;
pub mod resolve;
pub mod spec;

pub use broadcast::{Broadcaster, Consumer, Event, EventKind};
pub use config::{ParserConfig, ResolverConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::ResolveError;
pub use ir::Ir;
pub use resolve::{parse_spec, resolve_document, Resolution};
