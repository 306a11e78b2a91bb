use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use smallvec::SmallVec;

/// Closed set of IR schema types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Array,
    Boolean,
    Enum,
    Integer,
    Never,
    Null,
    Number,
    Object,
    String,
    Tuple,
    Undefined,
    Unknown,
    Void,
}

impl SchemaType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Array => "array",
            SchemaType::Boolean => "boolean",
            SchemaType::Enum => "enum",
            SchemaType::Integer => "integer",
            SchemaType::Never => "never",
            SchemaType::Null => "null",
            SchemaType::Number => "number",
            SchemaType::Object => "object",
            SchemaType::String => "string",
            SchemaType::Tuple => "tuple",
            SchemaType::Undefined => "undefined",
            SchemaType::Unknown => "unknown",
            SchemaType::Void => "void",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the branches in [`IrSchema::items`] combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
}

/// Direction in which a schema is meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    /// Server to client only (`readOnly`)
    Read,
    /// Client to server only (`writeOnly`)
    Write,
    /// Both directions
    Both,
}

/// Set of access scopes found anywhere below a schema node.
///
/// Kept sorted and de-duplicated so that merging is associative and idempotent
/// and two resolutions of the same document compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessScopes(SmallVec<[AccessScope; 3]>);

impl AccessScopes {
    /// Add one scope.
    pub fn insert(&mut self, scope: AccessScope) {
        if let Err(at) = self.0.binary_search(&scope) {
            self.0.insert(at, scope);
        }
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: &AccessScopes) {
        for scope in &other.0 {
            self.insert(*scope);
        }
    }

    #[must_use]
    pub fn contains(&self, scope: AccessScope) -> bool {
        self.0.binary_search(&scope).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AccessScope> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<AccessScope> for AccessScopes {
    fn from_iter<I: IntoIterator<Item = AccessScope>>(iter: I) -> Self {
        let mut scopes = AccessScopes::default();
        for scope in iter {
            scopes.insert(scope);
        }
        scopes
    }
}

/// Pagination hint: `false`, `true` (the name itself matched) or the name of
/// the property that controls paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Pagination {
    #[default]
    Off,
    /// The parameter or body name itself is a pagination keyword
    ByName,
    /// This direct property is the pagination control
    Field(String),
}

impl Pagination {
    #[must_use]
    pub fn is_off(&self) -> bool {
        matches!(self, Pagination::Off)
    }

    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Pagination::Field(name) => Some(name),
            _ => None,
        }
    }
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Pagination::Off => serializer.serialize_bool(false),
            Pagination::ByName => serializer.serialize_bool(true),
            Pagination::Field(name) => serializer.serialize_str(name),
        }
    }
}

/// Canonical schema node.
///
/// A node with `$ref` set never carries `properties` or `items` of its own;
/// the referenced component is resolved separately and only its derived
/// `accessScopes` are folded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrSchema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Array/tuple element types, or composition branches when `logical_operator` is set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<IrSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, IrSchema>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub pattern_properties: IndexMap<String, IrSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<IrSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<IrSchema>>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_scope: Option<AccessScope>,
    #[serde(skip_serializing_if = "AccessScopes::is_empty")]
    pub access_scopes: AccessScopes,

    #[serde(skip_serializing_if = "Pagination::is_off")]
    pub pagination: Pagination,
}

impl IrSchema {
    /// A node of a single type and nothing else.
    #[must_use]
    pub fn of_type(schema_type: SchemaType) -> Self {
        IrSchema {
            schema_type: Some(schema_type),
            ..IrSchema::default()
        }
    }

    /// A bare reference node.
    #[must_use]
    pub fn reference(pointer: impl Into<String>) -> Self {
        IrSchema {
            reference: Some(pointer.into()),
            ..IrSchema::default()
        }
    }

    /// A composition of `items` combined with `operator`.
    #[must_use]
    pub fn composition(items: Vec<IrSchema>, operator: LogicalOperator) -> Self {
        IrSchema {
            items,
            logical_operator: Some(operator),
            ..IrSchema::default()
        }
    }

    /// Whether `items` holds composition branches rather than element types.
    #[must_use]
    pub fn is_composition(&self) -> bool {
        self.logical_operator.is_some() && !self.items.is_empty()
    }

    /// Overlay every field `other` sets onto `self`.
    ///
    /// Collections are replaced when non-empty and `accessScopes` are unioned.
    pub fn absorb(&mut self, other: IrSchema) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            reference,
            schema_type,
            title,
            description,
            deprecated,
            logical_operator,
            property_names,
            additional_properties,
            constant,
            default,
            example,
            format,
            pattern,
            minimum,
            maximum,
            exclusive_minimum,
            exclusive_maximum,
            min_items,
            max_items,
            min_length,
            max_length,
            access_scope,
        );
        if !other.items.is_empty() {
            self.items = other.items;
        }
        if !other.properties.is_empty() {
            self.properties = other.properties;
        }
        if !other.pattern_properties.is_empty() {
            self.pattern_properties = other.pattern_properties;
        }
        if !other.required.is_empty() {
            self.required = other.required;
        }
        if !other.pagination.is_off() {
            self.pagination = other.pagination;
        }
        self.access_scopes.merge(&other.access_scopes);
    }
}
