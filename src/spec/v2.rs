//! Swagger 2.0 document shapes.
//!
//! Parameters are a closed variant type keyed by `in`, since `body` and
//! `formData` entries describe the request body rather than a parameter.

use super::types::{ObjectOrReference, RawSchema};
use crate::ir::HttpMethod;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

pub use super::v3::SecurityRequirement;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub host: Option<String>,
    pub base_path: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub definitions: IndexMap<String, RawSchema>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub security_definitions: IndexMap<String, Value>,
    pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<ObjectOrReference<Parameter>>,
    pub delete: Option<Operation>,
    pub get: Option<Operation>,
    pub head: Option<Operation>,
    pub options: Option<Operation>,
    pub patch: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
}

impl PathItem {
    #[must_use]
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Trace => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub deprecated: Option<bool>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    #[serde(default)]
    pub parameters: Vec<ObjectOrReference<Parameter>>,
    #[serde(default)]
    pub responses: IndexMap<String, Value>,
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "in", rename_all = "camelCase")]
pub enum Parameter {
    Body(BodyParameter),
    FormData(SimpleParameter),
    Query(SimpleParameter),
    Header(SimpleParameter),
    Path(SimpleParameter),
}

impl Parameter {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Parameter::Body(p) => &p.name,
            Parameter::FormData(p) | Parameter::Query(p) | Parameter::Header(p) | Parameter::Path(p) => &p.name,
        }
    }

    /// The `in` value as written.
    #[must_use]
    pub fn location(&self) -> &'static str {
        match self {
            Parameter::Body(_) => "body",
            Parameter::FormData(_) => "formData",
            Parameter::Query(_) => "query",
            Parameter::Header(_) => "header",
            Parameter::Path(_) => "path",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodyParameter {
    pub name: String,
    pub description: Option<String>,
    pub required: Option<bool>,
    #[serde(default)]
    pub schema: RawSchema,
}

/// A non-body parameter. Its type keywords sit inline next to `name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleParameter {
    pub name: String,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub collection_format: Option<String>,
    #[serde(flatten)]
    pub schema: RawSchema,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    pub schema: Option<RawSchema>,
}

/// The closed set of scheme shapes, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "basic")]
    Basic { description: Option<String> },
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: String,
        description: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        flow: String,
        #[serde(rename = "authorizationUrl")]
        authorization_url: Option<String>,
        #[serde(rename = "tokenUrl")]
        token_url: Option<String>,
        #[serde(default)]
        scopes: IndexMap<String, String>,
        description: Option<String>,
    },
}
