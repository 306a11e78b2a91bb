//! OpenAPI 3.0.x / 3.1.x document shapes.
//!
//! Only the parts the resolver reads are modelled. Maps keep declared order.
//! Response maps and security schemes stay as raw values because they may hold
//! `x-` entries or scheme types this crate does not model; the resolver reads
//! them entry by entry.

use super::types::{ObjectOrReference, RawSchema};
use crate::ir::HttpMethod;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Security requirement: scheme name to required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Introduced in OpenAPI 3.1
    #[serde(default)]
    pub webhooks: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, RawSchema>,
    #[serde(default)]
    pub parameters: IndexMap<String, ObjectOrReference<Parameter>>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, ObjectOrReference<RequestBody>>,
    #[serde(default)]
    pub security_schemes: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerVariable {
    pub default: String,
    #[serde(rename = "enum", default)]
    pub values: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub servers: Option<Vec<Server>>,
    #[serde(default)]
    pub parameters: Vec<ObjectOrReference<Parameter>>,
    pub delete: Option<Operation>,
    pub get: Option<Operation>,
    pub head: Option<Operation>,
    pub options: Option<Operation>,
    pub patch: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub trace: Option<Operation>,
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
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Fill every entry this item leaves unset from `base` (a `$ref` target).
    #[must_use]
    pub fn merged_over(self, base: PathItem) -> PathItem {
        PathItem {
            reference: None,
            summary: self.summary.or(base.summary),
            description: self.description.or(base.description),
            servers: self.servers.or(base.servers),
            parameters: if self.parameters.is_empty() {
                base.parameters
            } else {
                self.parameters
            },
            delete: self.delete.or(base.delete),
            get: self.get.or(base.get),
            head: self.head.or(base.head),
            options: self.options.or(base.options),
            patch: self.patch.or(base.patch),
            post: self.post.or(base.post),
            put: self.put.or(base.put),
            trace: self.trace.or(base.trace),
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
    #[serde(default)]
    pub parameters: Vec<ObjectOrReference<Parameter>>,
    pub request_body: Option<ObjectOrReference<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, Value>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub servers: Option<Vec<Server>>,
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub allow_reserved: Option<bool>,
    pub schema: Option<RawSchema>,
    pub content: Option<IndexMap<String, MediaType>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    pub required: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    pub content: Option<IndexMap<String, MediaType>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<RawSchema>,
}

/// The closed set of scheme shapes, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: String,
        description: Option<String>,
    },
    #[serde(rename = "http")]
    Http {
        scheme: String,
        #[serde(rename = "bearerFormat")]
        bearer_format: Option<String>,
        description: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        flows: OAuthFlows,
        description: Option<String>,
    },
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        #[serde(rename = "openIdConnectUrl")]
        open_id_connect_url: String,
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    pub implicit: Option<OAuthFlow>,
    pub password: Option<OAuthFlow>,
    pub client_credentials: Option<OAuthFlow>,
    pub authorization_code: Option<OAuthFlow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}
