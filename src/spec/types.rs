use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

/// Either an inline object or a `$ref` to one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ObjectOrReference<T> {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Object(T),
}

/// `type` as a single name or, in OpenAPI 3.1, a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchemaTypes {
    One(String),
    Many(Vec<String>),
}

/// A schema position that JSON Schema also allows to be `true`/`false`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrBool {
    Bool(bool),
    Schema(Box<RawSchema>),
}

/// Swagger 2.0 names only the property; OpenAPI 3.x adds an explicit mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    Name(String),
    Object {
        #[serde(rename = "propertyName")]
        property_name: String,
        #[serde(default)]
        mapping: IndexMap<String, String>,
    },
}

impl Discriminator {
    #[must_use]
    pub fn property_name(&self) -> &str {
        match self {
            Discriminator::Name(name) => name,
            Discriminator::Object { property_name, .. } => property_name,
        }
    }

    /// Discriminator value to target pointer (or bare component name).
    #[must_use]
    pub fn mapping(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Discriminator::Name(_) => None,
            Discriminator::Object { mapping, .. } => Some(mapping),
        }
    }
}

/// Legacy drafts use a boolean flag next to `minimum`/`maximum`; 3.1 uses the bound itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    Flag(bool),
    Bound(Number),
}

/// A schema node as written in any supported grammar.
///
/// Fields that differ between versions (`nullable` vs `x-nullable` vs a `null`
/// entry in `type`, boolean vs numeric exclusive bounds, `file`) are kept as
/// written; the schema normalizer reconciles them.
///
/// Reading a schema never fails. A keyword whose value has the wrong shape
/// is dropped and a node that is not an object reads as an empty schema;
/// both are listed in [`RawSchema::malformed`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct RawSchema {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaTypes>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<bool>,

    #[serde(rename = "enum")]
    pub enumeration: Option<Vec<Value>>,
    #[serde(rename = "const", default, deserialize_with = "present")]
    pub constant: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub example: Option<Value>,
    pub examples: Option<Vec<Value>>,

    pub all_of: Option<Vec<RawSchema>>,
    pub any_of: Option<Vec<RawSchema>>,
    pub one_of: Option<Vec<RawSchema>>,
    pub discriminator: Option<Discriminator>,

    pub properties: Option<IndexMap<String, SchemaOrBool>>,
    pub additional_properties: Option<SchemaOrBool>,
    pub pattern_properties: Option<IndexMap<String, RawSchema>>,
    pub property_names: Option<Box<RawSchema>>,
    #[serde(default, deserialize_with = "string_list")]
    pub required: Vec<String>,

    pub items: Option<Box<SchemaOrBool>>,
    pub prefix_items: Option<Vec<RawSchema>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,

    pub format: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<ExclusiveBound>,
    pub exclusive_maximum: Option<ExclusiveBound>,

    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub nullable: Option<bool>,
    #[serde(rename = "x-nullable")]
    pub x_nullable: Option<bool>,

    #[serde(rename = "x-enum-varnames")]
    pub x_enum_varnames: Option<Vec<Value>>,
    #[serde(rename = "x-enumNames")]
    pub x_enum_names: Option<Vec<Value>>,
    #[serde(rename = "x-enum-descriptions")]
    pub x_enum_descriptions: Option<Vec<Value>>,

    /// What was dropped while reading this node
    #[serde(skip)]
    pub malformed: Vec<String>,
}

impl<'de> Deserialize<'de> for RawSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(RawSchema::from_value)
    }
}

impl RawSchema {
    /// Read a schema node, dropping keywords whose value has the wrong shape.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return RawSchema {
                    malformed: vec![format!("expected a schema object, found {}", json_kind(&other))],
                    ..RawSchema::default()
                }
            }
        };

        let whole = Value::Object(fields);
        if let Ok(schema) = RawSchema::deserialize(&whole) {
            return schema;
        }
        let Value::Object(fields) = whole else {
            return RawSchema::default();
        };

        let mut kept = Map::new();
        let mut malformed = Vec::new();
        for (key, field) in fields {
            let single = Value::Object(Map::from_iter([(key.clone(), field)]));
            if let Err(err) = RawSchema::deserialize(&single) {
                malformed.push(format!("ignored `{key}`: {err}"));
                continue;
            }
            if let Value::Object(single) = single {
                kept.extend(single);
            }
        }
        let mut schema = RawSchema::deserialize(&Value::Object(kept)).unwrap_or_default();
        schema.malformed = malformed;
        schema
    }

    /// A schema of one type and nothing else.
    #[must_use]
    pub fn of_type(name: &str) -> Self {
        RawSchema {
            schema_type: Some(SchemaTypes::One(name.to_string())),
            ..RawSchema::default()
        }
    }

    /// Declared type names, inferring `object` from `properties`.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        match &self.schema_type {
            Some(SchemaTypes::One(name)) => vec![name.as_str()],
            Some(SchemaTypes::Many(names)) => names.iter().map(String::as_str).collect(),
            None if self.properties.is_some() => vec!["object"],
            None => Vec::new(),
        }
    }

    /// Whether any of the nullability encodings is present.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true) || self.x_nullable == Some(true) || self.types().contains(&"null")
    }

    /// Whether the node reads as an object, declared or inferred.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.types().contains(&"object")
    }

    /// Branches of whichever composition keyword comes first in dispatch order.
    #[must_use]
    pub fn composition(&self) -> Option<&[RawSchema]> {
        self.all_of
            .as_deref()
            .or(self.any_of.as_deref())
            .or(self.one_of.as_deref())
    }

    /// `example`, or the first of the 3.1 `examples`.
    #[must_use]
    pub fn first_example(&self) -> Option<&Value> {
        self.example
            .as_ref()
            .or_else(|| self.examples.as_ref().and_then(|examples| examples.first()))
    }

    /// Name of an enum literal's variant, from `x-enum-varnames` or `x-enumNames`.
    #[must_use]
    pub fn enum_title(&self, index: usize) -> Option<String> {
        self.x_enum_varnames
            .as_ref()
            .and_then(|names| names.get(index))
            .or_else(|| self.x_enum_names.as_ref().and_then(|names| names.get(index)))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Description of an enum literal from `x-enum-descriptions`.
    #[must_use]
    pub fn enum_description(&self, index: usize) -> Option<String> {
        self.x_enum_descriptions
            .as_ref()
            .and_then(|descriptions| descriptions.get(index))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Keep an explicit `null` as `Some(Value::Null)` instead of folding it into `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// `required` is a list of names on schemas but a boolean on Swagger form
/// parameters; anything other than a list of strings reads as empty.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_inference_and_nullability() {
        let schema: RawSchema = serde_json::from_value(json!({
            "properties": { "id": { "type": "string" } }
        }))
        .unwrap();
        assert_eq!(schema.types(), vec!["object"]);
        assert!(!schema.is_nullable());

        let schema: RawSchema = serde_json::from_value(json!({ "type": ["string", "null"] })).unwrap();
        assert!(schema.is_nullable());

        let schema: RawSchema = serde_json::from_value(json!({ "type": "string", "x-nullable": true })).unwrap();
        assert!(schema.is_nullable());
    }

    #[test]
    fn test_explicit_null_is_kept() {
        let schema: RawSchema = serde_json::from_value(json!({ "const": null, "default": null })).unwrap();
        assert_eq!(schema.constant, Some(Value::Null));
        assert_eq!(schema.default, Some(Value::Null));

        let schema: RawSchema = serde_json::from_value(json!({})).unwrap();
        assert!(schema.constant.is_none());
    }

    #[test]
    fn test_lenient_required_and_bool_schemas() {
        let schema: RawSchema = serde_json::from_value(json!({
            "required": true,
            "additionalProperties": false,
            "items": { "type": "integer" }
        }))
        .unwrap();
        assert!(schema.required.is_empty());
        assert!(matches!(schema.additional_properties, Some(SchemaOrBool::Bool(false))));
        assert!(matches!(schema.items.as_deref(), Some(SchemaOrBool::Schema(_))));
    }

    #[test]
    fn test_discriminator_forms() {
        let legacy: RawSchema = serde_json::from_value(json!({ "discriminator": "petType" })).unwrap();
        assert_eq!(legacy.discriminator.unwrap().property_name(), "petType");

        let modern: RawSchema = serde_json::from_value(json!({
            "discriminator": { "propertyName": "kind", "mapping": { "dog": "#/components/schemas/Dog" } }
        }))
        .unwrap();
        let discriminator = modern.discriminator.unwrap();
        assert_eq!(discriminator.property_name(), "kind");
        assert_eq!(discriminator.mapping().unwrap()["dog"], "#/components/schemas/Dog");
    }

    #[test]
    fn test_wrong_shaped_keywords_are_dropped() {
        let schema: RawSchema = serde_json::from_value(json!({
            "type": "string",
            "title": 42,
            "maxLength": 5.5,
            "minLength": 1
        }))
        .unwrap();
        assert_eq!(schema.types(), vec!["string"]);
        assert!(schema.title.is_none());
        assert!(schema.max_length.is_none());
        assert_eq!(schema.min_length, Some(1));
        assert_eq!(schema.malformed.len(), 2);
        assert!(schema.malformed[0].starts_with("ignored `title`"));
        assert!(schema.malformed[1].starts_with("ignored `maxLength`"));
    }

    #[test]
    fn test_non_object_schema_reads_as_empty() {
        let schema: RawSchema = serde_json::from_value(json!({
            "type": "array",
            "items": [{ "type": "string" }]
        }))
        .unwrap();
        assert!(schema.malformed.is_empty());
        let Some(SchemaOrBool::Schema(items)) = schema.items.as_deref() else {
            panic!("items should read as a schema");
        };
        assert!(items.schema_type.is_none());
        assert_eq!(items.malformed, vec!["expected a schema object, found an array"]);
    }
}
