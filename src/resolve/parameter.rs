//! Parameter Normalizer.
//!
//! Version adapters turn their own parameter shapes into [`ParameterSource`];
//! everything from there on is version-agnostic.

use super::context::Context;
use super::pagination::pagination_field;
use super::schema::{schema_to_ir, SchemaState};
use crate::error::ResolveError;
use crate::ir::{IrParameter, IrParameters, ParameterLocation, ParameterStyle};
use crate::spec::RawSchema;

/// A parameter in canonical form, before schema resolution.
#[derive(Debug, Clone)]
pub struct ParameterSource {
    pub name: String,
    pub location: ParameterLocation,
    pub schema: RawSchema,
    pub required: bool,
    pub deprecated: Option<bool>,
    pub description: Option<String>,
    /// Declared style; `None` uses the location default
    pub style: Option<ParameterStyle>,
    /// Declared (or collection-format derived) explode; `None` uses the style default
    pub explode: Option<bool>,
    pub allow_reserved: Option<bool>,
}

/// Merge path-level and operation-level entries; operation-level entries
/// replace path-level ones with the same key in place.
pub fn merge_by_key<T, K, F>(path_level: Vec<T>, operation_level: Vec<T>, key: F) -> Vec<T>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut merged = path_level;
    for entry in operation_level {
        let k = key(&entry);
        match merged.iter().position(|existing| key(existing) == k) {
            Some(at) => merged[at] = entry,
            None => merged.push(entry),
        }
    }
    merged
}

/// Normalize one parameter.
pub fn parameter_to_ir(ctx: &mut Context<'_>, source: &ParameterSource) -> Result<IrParameter, ResolveError> {
    let style = source
        .style
        .unwrap_or_else(|| ParameterStyle::default_for(source.location));
    let explode = source.explode.unwrap_or_else(|| style.default_explode());

    let mut raw = source.schema.clone();
    if raw.description.is_none() {
        raw.description = source.description.clone();
    }
    if raw.deprecated.is_none() {
        raw.deprecated = source.deprecated;
    }
    let schema = schema_to_ir(ctx, &raw, &SchemaState::default())?;
    let pagination = pagination_field(ctx, &source.name, &source.schema)?;

    Ok(IrParameter {
        name: source.name.clone(),
        location: source.location,
        schema,
        style,
        explode,
        allow_reserved: source.allow_reserved.unwrap_or(false),
        required: source.required,
        deprecated: source.deprecated,
        description: source.description.clone(),
        pagination,
    })
}

/// Normalize a merged parameter list into the location-keyed map.
pub fn parameters_to_ir(ctx: &mut Context<'_>, sources: &[ParameterSource]) -> Result<IrParameters, ResolveError> {
    let mut parameters = IrParameters::default();
    for source in sources {
        parameters.insert(parameter_to_ir(ctx, source)?);
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_operation_level_in_place() {
        let path_level = vec![("id", "path", 1), ("limit", "query", 1)];
        let operation_level = vec![("limit", "query", 2), ("id", "header", 2)];
        let merged = merge_by_key(path_level, operation_level, |(name, location, _)| (*name, *location));
        assert_eq!(merged, vec![("id", "path", 1), ("limit", "query", 2), ("id", "header", 2)]);
    }
}
