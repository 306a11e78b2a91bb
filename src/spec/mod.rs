//! Raw, version-specific document shapes and document loading.
//!
//! Swagger 2.0 and OpenAPI 3.x each get their own closed set of types in
//! [`v2`] and [`v3`]; [`RawSchema`] is shared because both grammars embed the
//! same JSON Schema dialect with small differences the resolver reconciles.

pub mod v2;
pub mod v3;
mod load;
mod types;

pub use load::*;
pub use types::*;
