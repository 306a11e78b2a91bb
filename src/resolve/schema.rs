//! # Schema Normalizer
//!
//! Converts one raw schema node into one canonical [`IrSchema`].
//!
//! ## Dispatch
//!
//! The first matching keyword wins:
//!
//! 1. `$ref` - canonical reference node; the target is expanded only to fold
//!    in its `accessScopes`, and never while it is already being expanded on
//!    the current path
//! 2. `enum` - one `const` leaf per literal, combined with `or`
//! 3. `allOf` - composition merge, see [`parse_all_of`]
//! 4. `anyOf` / `oneOf` - `or` composition with discriminator tagging
//! 5. `type`, `properties` or `const` - dispatch by primitive kind
//! 6. anything else - `unknown`
//!
//! Nothing in this module fails on malformed input. Keywords dropped while
//! reading a node are reported as `malformed-schema` warnings. The only errors are the
//! reference resolver's: a dangling `$ref` or a target of the wrong shape.

use super::context::Context;
use super::reference::{self, canonical, component_name};
use crate::diagnostics::{EXCLUDED_REFERENCE, MALFORMED_SCHEMA, UNSUPPORTED_ENUM_VALUE};
use crate::error::ResolveError;
use crate::ir::{AccessScope, AccessScopes, IrSchema, LogicalOperator, SchemaType};
use crate::spec::{Discriminator, ExclusiveBound, RawSchema, SchemaOrBool};
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Longest tuple expanded from `minItems == maxItems`; longer ones stay arrays.
const MAX_TUPLE_LEN: u64 = 256;

/// Per-call resolution state.
#[derive(Debug, Clone, Default)]
pub struct SchemaState {
    /// Canonical pointer of the component this node is being resolved through
    pub reference: Option<String>,
    /// The node is the value of an object property
    pub is_property: bool,
    /// The node is a branch of an `allOf`
    pub in_all_of: bool,
}

impl SchemaState {
    /// State for the root of the component at `pointer`.
    #[must_use]
    pub fn component(pointer: impl Into<String>) -> Self {
        SchemaState {
            reference: Some(pointer.into()),
            ..SchemaState::default()
        }
    }

    fn property() -> Self {
        SchemaState {
            is_property: true,
            ..SchemaState::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Union {
    AnyOf,
    OneOf,
}

/// Convert `schema` into its canonical IR node.
pub fn schema_to_ir(ctx: &mut Context<'_>, schema: &RawSchema, state: &SchemaState) -> Result<IrSchema, ResolveError> {
    for message in &schema.malformed {
        ctx.warn(MALFORMED_SCHEMA, message.clone());
    }
    if let Some(pointer) = &schema.reference {
        return parse_ref(ctx, schema, pointer, state);
    }
    if let Some(values) = &schema.enumeration {
        return Ok(parse_enum(ctx, schema, values, state));
    }
    if let Some(branches) = &schema.all_of {
        return parse_all_of(ctx, schema, branches, state);
    }
    if let Some(branches) = &schema.any_of {
        return parse_union(ctx, schema, branches, Union::AnyOf, state);
    }
    if let Some(branches) = &schema.one_of {
        return parse_union(ctx, schema, branches, Union::OneOf, state);
    }
    if schema.schema_type.is_some() || schema.properties.is_some() || schema.constant.is_some() {
        return parse_type(ctx, schema, state);
    }

    let mut ir = IrSchema::of_type(SchemaType::Unknown);
    apply_docs(&mut ir, schema);
    apply_constraints(&mut ir, schema, state);
    Ok(ir)
}

fn parse_ref(
    ctx: &mut Context<'_>,
    schema: &RawSchema,
    pointer: &str,
    state: &SchemaState,
) -> Result<IrSchema, ResolveError> {
    let canonical = canonical(pointer);

    let mut ir = if reference::is_top_level_component(&canonical) {
        if !ctx.config.is_included(&canonical) {
            ctx.warn(
                EXCLUDED_REFERENCE,
                format!("`{canonical}` is excluded by the filters but still referenced"),
            );
        }
        let mut ir = IrSchema::reference(canonical.clone());
        ir.access_scopes = reference_scopes(ctx, pointer, &canonical)?;
        ir
    } else if ctx.cycle_guard(&canonical) {
        IrSchema::reference(canonical.clone())
    } else {
        // Not a registered name, so the target is inlined.
        let target: RawSchema = ctx.resolve(pointer, "schema")?;
        ctx.expanding(&canonical, |ctx| schema_to_ir(ctx, &target, state))?
    };

    apply_docs(&mut ir, schema);
    if schema.is_nullable() {
        return Ok(or_null(ir));
    }
    Ok(ir)
}

/// Access scopes of the component at `canonical`.
///
/// Expanded once per run, unless the expansion ran into a cycle through a
/// component further up the current path. That result is path-dependent and
/// is recomputed on the next reference.
fn reference_scopes(ctx: &mut Context<'_>, pointer: &str, canonical: &str) -> Result<AccessScopes, ResolveError> {
    if let Some(scopes) = ctx.cached_scopes(canonical) {
        return Ok(scopes.clone());
    }
    if ctx.cycle_guard(canonical) {
        return Ok(AccessScopes::default());
    }

    debug!(pointer = canonical, "expanding reference for access scopes");
    let target: RawSchema = ctx.resolve(pointer, "schema")?;
    let state = SchemaState::component(canonical);
    let previous = ctx.location().to_string();
    ctx.set_location(canonical);
    let (resolved, complete) = ctx.expanding_complete(canonical, |ctx| schema_to_ir(ctx, &target, &state));
    ctx.set_location(previous);

    let scopes = resolved?.access_scopes;
    if complete {
        ctx.cache_scopes(canonical, scopes.clone());
    }
    Ok(scopes)
}

fn parse_enum(ctx: &mut Context<'_>, schema: &RawSchema, values: &[Value], state: &SchemaState) -> IrSchema {
    let integer = schema.types().contains(&"integer");
    let nullable = schema.is_nullable();

    let mut items = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let schema_type = match value {
            Value::String(_) => SchemaType::String,
            Value::Number(_) if integer => SchemaType::Integer,
            Value::Number(_) => SchemaType::Number,
            Value::Bool(_) => SchemaType::Boolean,
            Value::Null if nullable => SchemaType::Null,
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                ctx.warn(
                    UNSUPPORTED_ENUM_VALUE,
                    format!("dropped enum value `{value}` of unsupported type"),
                );
                continue;
            }
        };
        items.push(IrSchema {
            schema_type: Some(schema_type),
            constant: Some(value.clone()),
            title: schema.enum_title(index),
            description: schema.enum_description(index),
            ..IrSchema::default()
        });
    }

    let mut ir = IrSchema {
        schema_type: Some(SchemaType::Enum),
        items,
        logical_operator: Some(LogicalOperator::Or),
        default: schema.default.clone(),
        ..IrSchema::default()
    };
    apply_docs(&mut ir, schema);
    apply_access(&mut ir, schema, state);
    ir
}

/// Composition merge for `allOf`.
///
/// Each branch is resolved with the parent's `required` names added to it.
/// When resolving through a component whose branch points at a
/// discriminated parent, a branch pinning the discriminator to this
/// component's values is appended. When the composite reads as an object,
/// its own properties plus any required property only a sibling branch
/// defines are appended as one more object branch.
fn parse_all_of(
    ctx: &mut Context<'_>,
    schema: &RawSchema,
    branches: &[RawSchema],
    state: &SchemaState,
) -> Result<IrSchema, ResolveError> {
    let branch_state = SchemaState {
        reference: state.reference.clone(),
        is_property: false,
        in_all_of: true,
    };

    let mut items = Vec::with_capacity(branches.len() + 1);
    for branch in branches {
        let mut ir = schema_to_ir(ctx, branch, &branch_state)?;
        ir.required.extend(schema.required.iter().cloned());
        items.push(ir);

        if let (Some(pointer), Some(origin)) = (&branch.reference, &state.reference) {
            if let Some(tag) = discriminator_branch(ctx, pointer, origin)? {
                items.push(tag);
            }
        }
    }

    if reads_as_object(ctx, schema, branches)? {
        let mut object = parse_object(ctx, schema, &branch_state)?;
        for name in &schema.required {
            if object.properties.contains_key(name) {
                continue;
            }
            if let Some(property) = property_from_siblings(ctx, branches, name)? {
                object.access_scopes.merge(&property.access_scopes);
                object.properties.insert(name.clone(), property);
            }
        }
        if !object.properties.is_empty() {
            items.push(object);
        }
    }

    let mut ir = collapse(items, LogicalOperator::And);
    apply_docs(&mut ir, schema);
    apply_access(&mut ir, schema, state);
    if schema.is_nullable() {
        return Ok(or_null(ir));
    }
    Ok(ir)
}

fn reads_as_object(ctx: &Context<'_>, schema: &RawSchema, branches: &[RawSchema]) -> Result<bool, ResolveError> {
    if schema.is_object() || schema.properties.as_ref().is_some_and(|p| !p.is_empty()) {
        return Ok(true);
    }
    if schema.required.is_empty() {
        return Ok(false);
    }
    for branch in branches {
        if one_hop(ctx, branch)?.is_object() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `schema`, or its `$ref` target resolved once.
pub(crate) fn one_hop<'s>(ctx: &Context<'_>, schema: &'s RawSchema) -> Result<Cow<'s, RawSchema>, ResolveError> {
    match &schema.reference {
        Some(pointer) => Ok(Cow::Owned(ctx.resolve(pointer, "schema")?)),
        None => Ok(Cow::Borrowed(schema)),
    }
}

/// Resolve the first sibling branch's definition of property `name`.
fn property_from_siblings(
    ctx: &mut Context<'_>,
    branches: &[RawSchema],
    name: &str,
) -> Result<Option<IrSchema>, ResolveError> {
    for branch in branches {
        let pointer = branch.reference.as_deref().map(canonical);
        if pointer.as_deref().is_some_and(|p| ctx.cycle_guard(p)) {
            continue;
        }
        let resolved = one_hop(ctx, branch)?;
        if !resolved.is_object() {
            continue;
        }
        let Some(SchemaOrBool::Schema(property)) = resolved.properties.as_ref().and_then(|p| p.get(name)) else {
            continue;
        };

        let state = SchemaState::property();
        let ir = match &pointer {
            Some(pointer) => ctx.expanding(pointer, |ctx| schema_to_ir(ctx, property, &state))?,
            None => schema_to_ir(ctx, property, &state)?,
        };
        return Ok(Some(ir));
    }
    Ok(None)
}

/// Object branch pinning the discriminator of the parent at `pointer` to
/// the values that select `origin`.
fn discriminator_branch(ctx: &Context<'_>, pointer: &str, origin: &str) -> Result<Option<IrSchema>, ResolveError> {
    let parent: RawSchema = ctx.resolve(pointer, "schema")?;
    let Some(discriminator) = &parent.discriminator else {
        return Ok(None);
    };
    let property = discriminator.property_name();

    let mut object = IrSchema::of_type(SchemaType::Object);
    object
        .properties
        .insert(property.to_string(), discriminator_values(discriminator, origin));
    if parent.required.iter().any(|name| name == property) {
        object.required.insert(property.to_string());
    }
    Ok(Some(object))
}

/// `const` leaf (or `or` of leaves) for the discriminator values that map to `target`.
fn discriminator_values(discriminator: &Discriminator, target: &str) -> IrSchema {
    let name = component_name(target);
    let mut values: Vec<&str> = discriminator
        .mapping()
        .into_iter()
        .flatten()
        .filter(|(_, mapped)| canonical(mapped) == target || **mapped == name)
        .map(|(value, _)| value.as_str())
        .collect();
    if values.is_empty() {
        values.push(&name);
    }

    let mut leaves: Vec<IrSchema> = values
        .into_iter()
        .map(|value| IrSchema {
            schema_type: Some(SchemaType::String),
            constant: Some(Value::String(value.to_string())),
            ..IrSchema::default()
        })
        .collect();
    match leaves.len() {
        1 => leaves.remove(0),
        _ => IrSchema::composition(leaves, LogicalOperator::Or),
    }
}

fn parse_union(
    ctx: &mut Context<'_>,
    schema: &RawSchema,
    branches: &[RawSchema],
    kind: Union,
    state: &SchemaState,
) -> Result<IrSchema, ResolveError> {
    let mut items = Vec::with_capacity(branches.len() + 1);
    for branch in branches {
        let mut ir = schema_to_ir(ctx, branch, &SchemaState::default())?;

        if let (Some(discriminator), Some(pointer)) = (&schema.discriminator, &branch.reference) {
            let property = discriminator.property_name();
            let mut tag = IrSchema::of_type(SchemaType::Object);
            tag.properties
                .insert(property.to_string(), discriminator_values(discriminator, &canonical(pointer)));
            if kind == Union::OneOf {
                tag.required.insert(property.to_string());
            }
            ir = combine(vec![tag, ir], LogicalOperator::And);
        }

        let nested_or = ir.reference.is_none() && ir.logical_operator == Some(LogicalOperator::Or) && ir.is_composition();
        if kind == Union::OneOf && nested_or && ir.schema_type.is_none() {
            items.extend(ir.items);
        } else {
            items.push(ir);
        }
    }
    if schema.is_nullable() {
        items.push(IrSchema::of_type(SchemaType::Null));
    }

    let mut ir = collapse(items, LogicalOperator::Or);
    if schema.properties.as_ref().is_some_and(|p| !p.is_empty()) {
        let object = parse_object(ctx, schema, &SchemaState::default())?;
        ir = combine(vec![ir, object], LogicalOperator::And);
    }
    apply_docs(&mut ir, schema);
    apply_access(&mut ir, schema, state);
    Ok(ir)
}

fn parse_type(ctx: &mut Context<'_>, schema: &RawSchema, state: &SchemaState) -> Result<IrSchema, ResolveError> {
    let mut types = schema.types();
    if types.is_empty() {
        if let Some(constant) = &schema.constant {
            types.push(const_type(constant));
        }
    }
    let nullable = schema.is_nullable() || types.contains(&"null");
    let concrete: Vec<&str> = types.into_iter().filter(|t| *t != "null").collect();

    match concrete.as_slice() {
        [] => {
            let mut ir = IrSchema::of_type(if nullable { SchemaType::Null } else { SchemaType::Unknown });
            apply_docs(&mut ir, schema);
            apply_constraints(&mut ir, schema, state);
            Ok(ir)
        }
        [single] => {
            let mut ir = parse_one(ctx, schema, single, state)?;
            apply_docs(&mut ir, schema);
            apply_constraints(&mut ir, schema, state);
            if !nullable {
                return Ok(ir);
            }
            if ir.default == Some(Value::Null) {
                ir.default = None;
            }
            Ok(or_null(ir))
        }
        many => {
            let mut items = Vec::with_capacity(many.len() + 1);
            for name in many {
                let mut ir = parse_one(ctx, schema, name, state)?;
                apply_constraints(&mut ir, schema, state);
                items.push(ir);
            }
            if nullable {
                items.push(IrSchema::of_type(SchemaType::Null));
            }
            let mut ir = combine(items, LogicalOperator::Or);
            apply_docs(&mut ir, schema);
            Ok(ir)
        }
    }
}

fn parse_one(ctx: &mut Context<'_>, schema: &RawSchema, name: &str, state: &SchemaState) -> Result<IrSchema, ResolveError> {
    Ok(match name {
        "array" => parse_array(ctx, schema)?,
        "object" => parse_object(ctx, schema, state)?,
        "boolean" => IrSchema::of_type(SchemaType::Boolean),
        "integer" => IrSchema::of_type(SchemaType::Integer),
        "number" => IrSchema::of_type(SchemaType::Number),
        "string" => IrSchema::of_type(SchemaType::String),
        "null" => IrSchema::of_type(SchemaType::Null),
        "file" => IrSchema {
            schema_type: Some(SchemaType::String),
            format: Some("binary".to_string()),
            ..IrSchema::default()
        },
        other => {
            ctx.warn(MALFORMED_SCHEMA, format!("unrecognized type `{other}` read as unknown"));
            IrSchema::of_type(SchemaType::Unknown)
        }
    })
}

fn parse_array(ctx: &mut Context<'_>, schema: &RawSchema) -> Result<IrSchema, ResolveError> {
    let child = SchemaState::default();

    if let Some(prefix) = &schema.prefix_items {
        let mut items = Vec::with_capacity(prefix.len());
        for item in prefix {
            items.push(schema_to_ir(ctx, item, &child)?);
        }
        return Ok(with_items(SchemaType::Tuple, items));
    }

    let item = match schema.items.as_deref() {
        Some(SchemaOrBool::Schema(item)) => Some(&**item),
        _ => None,
    };
    let element = match item {
        Some(item) => schema_to_ir(ctx, item, &child)?,
        None => IrSchema::of_type(SchemaType::Unknown),
    };

    match (schema.min_items, schema.max_items) {
        (Some(min), Some(max)) if min == max && min > 0 && min <= MAX_TUPLE_LEN => {
            let count = usize::try_from(min).unwrap_or(0);
            return Ok(with_items(SchemaType::Tuple, vec![element; count]));
        }
        _ => {}
    }

    let hoist = item.is_some_and(|item| {
        item.reference.is_none()
            && !item.is_nullable()
            && item.composition().is_some_and(|branches| branches.len() > 1)
    });
    if hoist && element.is_composition() {
        let mut ir = IrSchema::of_type(SchemaType::Array);
        ir.absorb(element);
        ir.schema_type = Some(SchemaType::Array);
        return Ok(ir);
    }
    Ok(with_items(SchemaType::Array, vec![element]))
}

fn parse_object(ctx: &mut Context<'_>, schema: &RawSchema, state: &SchemaState) -> Result<IrSchema, ResolveError> {
    let mut ir = IrSchema::of_type(SchemaType::Object);

    for (name, property) in schema.properties.iter().flatten() {
        let property = match property {
            SchemaOrBool::Schema(property) => schema_to_ir(ctx, property, &SchemaState::property())?,
            SchemaOrBool::Bool(true) => IrSchema::of_type(SchemaType::Unknown),
            SchemaOrBool::Bool(false) => IrSchema::of_type(SchemaType::Never),
        };
        ir.access_scopes.merge(&property.access_scopes);
        ir.properties.insert(name.clone(), property);
    }

    let additional = match &schema.additional_properties {
        None if ir.properties.is_empty() && !state.in_all_of => Some(IrSchema::of_type(SchemaType::Unknown)),
        None => None,
        Some(SchemaOrBool::Bool(true)) => Some(IrSchema::of_type(SchemaType::Unknown)),
        Some(SchemaOrBool::Bool(false)) if ir.properties.is_empty() && state.in_all_of => None,
        Some(SchemaOrBool::Bool(false)) => Some(IrSchema::of_type(SchemaType::Never)),
        Some(SchemaOrBool::Schema(additional)) => Some(schema_to_ir(ctx, additional, &SchemaState::default())?),
    };
    if let Some(additional) = additional {
        ir.access_scopes.merge(&additional.access_scopes);
        ir.additional_properties = Some(Box::new(additional));
    }

    for (pattern, property) in schema.pattern_properties.iter().flatten() {
        let property = schema_to_ir(ctx, property, &SchemaState::default())?;
        ir.access_scopes.merge(&property.access_scopes);
        ir.pattern_properties.insert(pattern.clone(), property);
    }
    if let Some(names) = &schema.property_names {
        ir.property_names = Some(Box::new(schema_to_ir(ctx, names, &SchemaState::default())?));
    }

    ir.required = schema.required.iter().cloned().collect();
    Ok(ir)
}

/// Type name a `const` implies when `type` is absent.
fn const_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn with_items(schema_type: SchemaType, items: Vec<IrSchema>) -> IrSchema {
    let mut ir = IrSchema::of_type(schema_type);
    for item in &items {
        ir.access_scopes.merge(&item.access_scopes);
    }
    ir.items = items;
    ir
}

/// Composition of `items`, carrying the union of their access scopes.
fn combine(items: Vec<IrSchema>, operator: LogicalOperator) -> IrSchema {
    let mut ir = with_items(SchemaType::Unknown, items);
    ir.schema_type = None;
    ir.logical_operator = Some(operator);
    ir
}

/// Like [`combine`], but a single branch stands for itself and no branch at all is `unknown`.
fn collapse(mut items: Vec<IrSchema>, operator: LogicalOperator) -> IrSchema {
    match items.len() {
        0 => IrSchema::of_type(SchemaType::Unknown),
        1 => {
            let mut ir = IrSchema::default();
            ir.absorb(items.remove(0));
            ir
        }
        _ => combine(items, operator),
    }
}

/// `or` of `ir` and `null`, with the docs consumers look for hoisted onto the wrapper.
fn or_null(mut ir: IrSchema) -> IrSchema {
    let description = ir.description.take();
    let deprecated = ir.deprecated.take();
    let mut wrapper = combine(vec![ir, IrSchema::of_type(SchemaType::Null)], LogicalOperator::Or);
    wrapper.description = description;
    wrapper.deprecated = deprecated;
    wrapper
}

fn apply_docs(ir: &mut IrSchema, schema: &RawSchema) {
    if schema.title.is_some() {
        ir.title = schema.title.clone();
    }
    if schema.description.is_some() {
        ir.description = schema.description.clone();
    }
    if schema.deprecated.is_some() {
        ir.deprecated = schema.deprecated;
    }
}

fn apply_constraints(ir: &mut IrSchema, schema: &RawSchema, state: &SchemaState) {
    if schema.constant.is_some() {
        ir.constant = schema.constant.clone();
    }
    if schema.default.is_some() {
        ir.default = schema.default.clone();
    }
    if let Some(example) = schema.first_example() {
        ir.example = Some(example.clone());
    }
    if schema.format.is_some() {
        ir.format = schema.format.clone();
    }
    if schema.pattern.is_some() {
        ir.pattern = schema.pattern.clone();
    }

    ir.minimum = schema.minimum.clone();
    ir.maximum = schema.maximum.clone();
    match &schema.exclusive_minimum {
        Some(ExclusiveBound::Flag(true)) => ir.exclusive_minimum = ir.minimum.take(),
        Some(ExclusiveBound::Bound(bound)) => ir.exclusive_minimum = Some(bound.clone()),
        _ => {}
    }
    match &schema.exclusive_maximum {
        Some(ExclusiveBound::Flag(true)) => ir.exclusive_maximum = ir.maximum.take(),
        Some(ExclusiveBound::Bound(bound)) => ir.exclusive_maximum = Some(bound.clone()),
        _ => {}
    }

    ir.min_length = schema.min_length;
    ir.max_length = schema.max_length;
    ir.min_items = schema.min_items;
    ir.max_items = schema.max_items;

    apply_access(ir, schema, state);
}

/// `readOnly`/`writeOnly` set the node's own scope; properties default to `both`.
fn apply_access(ir: &mut IrSchema, schema: &RawSchema, state: &SchemaState) {
    let scope = if schema.read_only == Some(true) {
        AccessScope::Read
    } else if schema.write_only == Some(true) {
        AccessScope::Write
    } else if state.is_property {
        AccessScope::Both
    } else {
        return;
    };
    ir.access_scope = Some(scope);
    ir.access_scopes.insert(scope);
}
