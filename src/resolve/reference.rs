//! Reference Resolver and pointer canonicalization.
//!
//! Lookups run against the raw document with the pointer exactly as written,
//! so a Swagger `#/definitions/Pet` resolves where it lives. Everything that
//! leaves the resolver (IR `$ref`s, tracker entries, filter checks) uses the
//! canonical form produced by [`canonical`].

use crate::error::ResolveError;
use crate::spec::ObjectOrReference;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;

/// Longest `$ref` chain followed before giving up
const MAX_HOPS: usize = 32;

static TOP_LEVEL_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#/components/(schemas|parameters|requestBodies|responses)/[^/]+$")
        .expect("component pointer regex should be valid")
});

/// Legacy storage locations and their canonical equivalents
const REWRITES: [(&str, &str); 3] = [
    ("#/definitions/", "#/components/schemas/"),
    ("#/parameters/", "#/components/parameters/"),
    ("#/responses/", "#/components/responses/"),
];

/// Rewrite `pointer` into the canonical grammar.
///
/// Percent-encoding is decoded and Swagger 2.0 storage locations are moved
/// under `#/components/`.
#[must_use]
pub fn canonical(pointer: &str) -> String {
    let decoded = urlencoding::decode(pointer).unwrap_or(Cow::Borrowed(pointer));
    for (legacy, modern) in REWRITES {
        if let Some(rest) = decoded.strip_prefix(legacy) {
            return format!("{modern}{rest}");
        }
    }
    decoded.into_owned()
}

/// Whether a canonical pointer names a reusable top-level definition.
#[must_use]
pub fn is_top_level_component(pointer: &str) -> bool {
    TOP_LEVEL_COMPONENT.is_match(pointer)
}

/// Last segment of a pointer, unescaped (`#/components/schemas/Pet` -> `Pet`).
#[must_use]
pub fn component_name(pointer: &str) -> String {
    let segment = pointer.rsplit('/').next().unwrap_or(pointer);
    segment.replace("~1", "/").replace("~0", "~")
}

/// Return the raw node `pointer` names.
pub fn lookup<'a>(document: &'a Value, pointer: &str) -> Result<&'a Value, ResolveError> {
    let dangling = || ResolveError::DanglingReference {
        pointer: pointer.to_string(),
    };
    let fragment = pointer.strip_prefix('#').ok_or_else(dangling)?;
    let fragment = urlencoding::decode(fragment).map_err(|_| dangling())?;
    document.pointer(&fragment).ok_or_else(dangling)
}

/// Read the node at `pointer` as a `T`.
///
/// `expected` names the shape for the error message (e.g. `"parameter"`).
pub fn resolve<T: DeserializeOwned>(document: &Value, pointer: &str, expected: &'static str) -> Result<T, ResolveError> {
    let node = lookup(document, pointer)?;
    T::deserialize(node).map_err(|source| ResolveError::UnexpectedShape {
        pointer: pointer.to_string(),
        expected,
        source,
    })
}

/// Follow `$ref` hops from `node` until an inline object is reached.
pub fn resolve_object<T: DeserializeOwned + Clone>(
    document: &Value,
    node: &ObjectOrReference<T>,
    expected: &'static str,
) -> Result<T, ResolveError> {
    let mut pointer = match node {
        ObjectOrReference::Object(object) => return Ok(object.clone()),
        ObjectOrReference::Ref { reference } => reference.clone(),
    };
    for _ in 0..MAX_HOPS {
        match resolve::<ObjectOrReference<T>>(document, &pointer, expected)? {
            ObjectOrReference::Object(object) => return Ok(object),
            ObjectOrReference::Ref { reference } => pointer = reference,
        }
    }
    Err(ResolveError::DanglingReference { pointer })
}
