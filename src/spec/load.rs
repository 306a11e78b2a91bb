use super::{v2, v3};
use crate::error::ResolveError;
use anyhow::Context as _;
use serde_json::{Map, Number, Value};
use serde_path_to_error::Segment;
use std::fmt;
use std::path::Path;

/// Source grammar of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    /// Swagger 2.0
    V2,
    /// OpenAPI 3.0.x
    V3_0,
    /// OpenAPI 3.1.x
    V3_1,
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVersion::V2 => write!(f, "2.0"),
            SpecVersion::V3_0 => write!(f, "3.0"),
            SpecVersion::V3_1 => write!(f, "3.1"),
        }
    }
}

/// A typed document of one of the supported grammars.
#[derive(Debug, Clone)]
pub enum Document {
    V2(Box<v2::Document>),
    V3(Box<v3::Document>),
}

/// Read which grammar `document` is written in.
pub fn detect_version(document: &Value) -> Result<SpecVersion, ResolveError> {
    if let Some(swagger) = document.get("swagger") {
        return match version_string(swagger).as_deref() {
            Some("2.0") => Ok(SpecVersion::V2),
            other => Err(ResolveError::UnsupportedVersion {
                found: format!("swagger {}", other.unwrap_or("<missing>")),
            }),
        };
    }

    match document.get("openapi").and_then(version_string) {
        Some(version) if version.starts_with("3.0") => Ok(SpecVersion::V3_0),
        Some(version) if version.starts_with("3.1") => Ok(SpecVersion::V3_1),
        Some(version) => Err(ResolveError::UnsupportedVersion {
            found: format!("openapi {version}"),
        }),
        None => Err(ResolveError::UnsupportedVersion {
            found: "<missing>".to_string(),
        }),
    }
}

/// YAML authors often leave the version unquoted, e.g. `swagger: 2.0`.
fn version_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(|v| format!("{v:.1}")),
        _ => None,
    }
}

/// Read the typed shape of `document`.
///
/// Schema nodes never fail here, see [`RawSchema`](super::RawSchema). Any
/// other node of the wrong shape fails with the pointer of that node.
pub fn read_document(document: &Value) -> Result<Document, ResolveError> {
    Ok(match detect_version(document)? {
        SpecVersion::V2 => Document::V2(Box::new(typed(document)?)),
        SpecVersion::V3_0 | SpecVersion::V3_1 => Document::V3(Box::new(typed(document)?)),
    })
}

fn typed<T: serde::de::DeserializeOwned>(document: &Value) -> Result<T, ResolveError> {
    serde_path_to_error::deserialize(document).map_err(|err| ResolveError::InvalidDocument {
        pointer: json_pointer(err.path()),
        message: err.into_inner().to_string(),
    })
}

/// Render a deserializer path as a JSON pointer.
fn json_pointer(path: &serde_path_to_error::Path) -> String {
    let mut pointer = String::from("#");
    for segment in path.iter() {
        match segment {
            Segment::Seq { index } => {
                pointer.push('/');
                pointer.push_str(&index.to_string());
            }
            Segment::Map { key } => {
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
            }
            _ => {}
        }
    }
    pointer
}

/// Parse document text. JSON is tried first, then YAML.
pub fn parse_document(content: &str) -> Result<Value, ResolveError> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| ResolveError::InvalidDocument {
        pointer: "#".to_string(),
        message: e.to_string(),
    })?;
    Ok(yaml_to_json(yaml))
}

/// Load a document from disk.
///
/// `.yaml`/`.yml` files are read as YAML, everything else as JSON.
///
/// # Arguments
///
/// * `file_path` - Path to the Swagger/OpenAPI document
///
/// # Returns
///
/// The document as a JSON value with key order preserved
pub fn load_document(file_path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let is_yaml = file_path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false);
    let value = if is_yaml {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", file_path.display()))?;
        yaml_to_json(yaml)
    } else {
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", file_path.display()))?
    };
    Ok(value)
}

/// YAML mappings allow non-string keys (`200:` is an integer); JSON objects do not.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64().and_then(Number::from_f64).map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_version(&json!({ "swagger": "2.0" })).unwrap(), SpecVersion::V2);
        assert_eq!(detect_version(&json!({ "swagger": 2.0 })).unwrap(), SpecVersion::V2);
        assert_eq!(detect_version(&json!({ "openapi": "3.0.3" })).unwrap(), SpecVersion::V3_0);
        assert_eq!(detect_version(&json!({ "openapi": "3.1.0" })).unwrap(), SpecVersion::V3_1);
        assert!(matches!(
            detect_version(&json!({ "openapi": "4.0.0" })),
            Err(ResolveError::UnsupportedVersion { .. })
        ));
        assert!(matches!(
            detect_version(&json!({ "info": {} })),
            Err(ResolveError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_yaml_integer_keys_become_strings() {
        let value = parse_document("responses:\n  200:\n    description: OK\n  default:\n    description: Err\n").unwrap();
        let keys: Vec<&String> = value["responses"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["200", "default"]);
    }

    #[test]
    fn test_parse_document_prefers_json() {
        let value = parse_document(r#"{"openapi": "3.1.0", "paths": {}}"#).unwrap();
        assert_eq!(value["openapi"], "3.1.0");
        assert!(matches!(
            parse_document("openapi: [unclosed"),
            Err(ResolveError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_shape_error_names_pointer() {
        let document = json!({
            "openapi": "3.0.3",
            "servers": [{ "url": "/" }, { "description": "no url" }],
            "paths": {}
        });
        let err = read_document(&document).unwrap_err();
        assert_eq!(err.pointer(), Some("#/servers/1"));
        assert!(err.to_string().contains("missing field `url`"));
    }
}
