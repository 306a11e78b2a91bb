//! Security scheme map and requirement mapping.
//!
//! The map is built once per document from the declared schemes. Each entry
//! is either an IR scheme or a note that the declared type is not one the IR
//! can express; the latter is reported only when an operation asks for it.

use super::context::Context;
use crate::diagnostics::UNSUPPORTED_SECURITY_SCHEME;
use crate::error::ResolveError;
use crate::ir::{IrOAuthFlow, IrOAuthFlows, IrSecurity};
use crate::spec::{v2, v3, ObjectOrReference};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One declared security scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeEntry {
    Supported(IrSecurity),
    Unsupported { kind: String },
}

/// Declared schemes by name, in declaration order.
pub type SecuritySchemes = IndexMap<String, SchemeEntry>;

fn declared_kind(value: &Value) -> String {
    value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<missing>")
        .to_string()
}

/// Build the scheme map of an OpenAPI 3.x document.
///
/// A `$ref` entry is resolved before its type is read.
pub fn v3_schemes(ctx: &Context<'_>, declared: &IndexMap<String, Value>) -> Result<SecuritySchemes, ResolveError> {
    let mut schemes = SecuritySchemes::with_capacity(declared.len());
    for (name, value) in declared {
        let node = ObjectOrReference::<Value>::deserialize(value).map_err(|source| ResolveError::UnexpectedShape {
            pointer: format!("#/components/securitySchemes/{name}"),
            expected: "security scheme",
            source,
        })?;
        let value = ctx.resolve_object(&node, "security scheme")?;
        let entry = match v3::SecurityScheme::deserialize(&value) {
            Ok(scheme) => SchemeEntry::Supported(v3_scheme(scheme)),
            Err(_) => SchemeEntry::Unsupported {
                kind: declared_kind(&value),
            },
        };
        schemes.insert(name.clone(), entry);
    }
    Ok(schemes)
}

fn v3_scheme(scheme: v3::SecurityScheme) -> IrSecurity {
    match scheme {
        v3::SecurityScheme::ApiKey {
            name,
            location,
            description,
        } => IrSecurity::ApiKey {
            name,
            location,
            description,
        },
        v3::SecurityScheme::Http {
            scheme,
            bearer_format,
            description,
        } => IrSecurity::Http {
            scheme: scheme.to_ascii_lowercase(),
            bearer_format,
            description,
        },
        v3::SecurityScheme::OAuth2 { flows, description } => IrSecurity::OAuth2 {
            flows: IrOAuthFlows {
                implicit: flows.implicit.map(v3_flow),
                password: flows.password.map(v3_flow),
                client_credentials: flows.client_credentials.map(v3_flow),
                authorization_code: flows.authorization_code.map(v3_flow),
            },
            description,
        },
        v3::SecurityScheme::OpenIdConnect {
            open_id_connect_url,
            description,
        } => IrSecurity::OpenIdConnect {
            open_id_connect_url,
            description,
        },
    }
}

fn v3_flow(flow: v3::OAuthFlow) -> IrOAuthFlow {
    IrOAuthFlow {
        authorization_url: flow.authorization_url,
        token_url: flow.token_url,
        refresh_url: flow.refresh_url,
        scopes: flow.scopes,
    }
}

/// Build the scheme map of a Swagger 2.0 document.
#[must_use]
pub fn v2_schemes(declared: &IndexMap<String, Value>) -> SecuritySchemes {
    declared
        .iter()
        .map(|(name, value)| {
            let entry = v2::SecurityScheme::deserialize(value)
                .ok()
                .and_then(v2_scheme)
                .map_or_else(
                    || SchemeEntry::Unsupported {
                        kind: declared_kind(value),
                    },
                    SchemeEntry::Supported,
                );
            (name.clone(), entry)
        })
        .collect()
}

fn v2_scheme(scheme: v2::SecurityScheme) -> Option<IrSecurity> {
    Some(match scheme {
        v2::SecurityScheme::Basic { description } => IrSecurity::Http {
            scheme: "basic".to_string(),
            bearer_format: None,
            description,
        },
        v2::SecurityScheme::ApiKey {
            name,
            location,
            description,
        } => IrSecurity::ApiKey {
            name,
            location,
            description,
        },
        v2::SecurityScheme::OAuth2 {
            flow,
            authorization_url,
            token_url,
            scopes,
            description,
        } => {
            let single = IrOAuthFlow {
                authorization_url,
                token_url,
                refresh_url: None,
                scopes,
            };
            let mut flows = IrOAuthFlows::default();
            match flow.as_str() {
                "implicit" => flows.implicit = Some(single),
                "password" => flows.password = Some(single),
                "application" => flows.client_credentials = Some(single),
                "accessCode" => flows.authorization_code = Some(single),
                _ => return None,
            }
            IrSecurity::OAuth2 { flows, description }
        }
    })
}

/// Map security requirements onto the declared schemes.
///
/// Unknown names are skipped without a diagnostic; unsupported scheme types
/// are skipped with a warning. Each scheme appears at most once.
pub fn security_to_ir(
    ctx: &mut Context<'_>,
    schemes: &SecuritySchemes,
    requirements: &[v3::SecurityRequirement],
) -> Vec<IrSecurity> {
    let mut seen: Vec<&str> = Vec::new();
    let mut security = Vec::new();
    for name in requirements.iter().flat_map(|requirement| requirement.keys()) {
        if seen.contains(&name.as_str()) {
            continue;
        }
        seen.push(name);
        match schemes.get(name) {
            Some(SchemeEntry::Supported(scheme)) => security.push(scheme.clone()),
            Some(SchemeEntry::Unsupported { kind }) => ctx.warn(
                UNSUPPORTED_SECURITY_SCHEME,
                format!("security scheme `{name}` of type `{kind}` is not supported"),
            ),
            None => debug!(scheme = %name, "security requirement names an undeclared scheme"),
        }
    }
    security
}
